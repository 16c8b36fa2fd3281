//! Project discovery and initialization
//!
//! A project is any directory containing `.institrack/`. Commands run from a
//! subdirectory find it by walking up the tree.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Marker directory at the project root
pub const PROJECT_DIR: &str = ".institrack";

/// Data directory used when the config does not name one
pub const DEFAULT_DATA_DIR: &str = ".institrack/data";

const CONFIG_TEMPLATE: &str = "\
# Institrack project configuration
#
# data_dir: where the pending/approved/rejected collections are stored.
#           Relative paths are resolved against the project root.
data_dir: .institrack/data

# store_format: yaml or json
store_format: yaml

# default_role: role used when --role is not given
#               (provider, admin, verifier, super-admin)
# default_role: admin

# log_level: error, warn, info, debug or trace
# log_level: info
";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not an institrack project (no {PROJECT_DIR} found from {})", searched_from.display())]
    NotFound { searched_from: PathBuf },

    #[error("Project already initialized at {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Find the project containing the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd)
    }

    /// Find the project containing `start`
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        start
            .ancestors()
            .find(|dir| dir.join(PROJECT_DIR).is_dir())
            .map(|root| Self {
                root: root.to_path_buf(),
            })
            .ok_or_else(|| ProjectError::NotFound {
                searched_from: start.to_path_buf(),
            })
    }

    /// Create `.institrack/` with a config template and an empty data dir
    pub fn init(root: &Path, force: bool) -> Result<Self, ProjectError> {
        let project = Self {
            root: root.to_path_buf(),
        };
        let config_path = project.config_path();
        if config_path.exists() && !force {
            return Err(ProjectError::AlreadyExists(root.to_path_buf()));
        }

        fs::create_dir_all(project.config_dir())?;
        fs::write(&config_path, CONFIG_TEMPLATE)?;
        fs::create_dir_all(project.default_data_dir())?;
        Ok(project)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir().join("config.yaml")
    }

    pub fn default_data_dir(&self) -> PathBuf {
        self.root.join(DEFAULT_DATA_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_layout() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();
        assert!(project.config_path().is_file());
        assert!(project.default_data_dir().is_dir());

        let contents = fs::read_to_string(project.config_path()).unwrap();
        assert!(contents.contains("store_format: yaml"));
    }

    #[test]
    fn test_init_twice_requires_force() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path(), false).unwrap();
        assert!(matches!(
            Project::init(tmp.path(), false),
            Err(ProjectError::AlreadyExists(_))
        ));
        assert!(Project::init(tmp.path(), true).is_ok());
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path(), false).unwrap();
        let nested = tmp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();

        let project = Project::discover_from(&nested).unwrap();
        assert_eq!(project.root(), tmp.path());
    }

    #[test]
    fn test_discover_outside_project() {
        let tmp = tempdir().unwrap();
        assert!(matches!(
            Project::discover_from(tmp.path()),
            Err(ProjectError::NotFound { .. })
        ));
    }
}
