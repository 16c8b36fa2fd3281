//! Layered configuration
//!
//! Lowest to highest precedence: built-in defaults, the user config
//! (`<config dir>/institrack/config.yaml`), the project config
//! (`.institrack/config.yaml`), then `INSTITRACK_*` environment variables.
//! Command-line flags are applied on top by the CLI.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::project::Project;
use crate::core::store::StoreFormat;
use crate::core::team::Role;

pub const ENV_DATA_DIR: &str = "INSTITRACK_DATA_DIR";
pub const ENV_ROLE: &str = "INSTITRACK_ROLE";
pub const ENV_STORE_FORMAT: &str = "INSTITRACK_STORE_FORMAT";

/// One config file; every key optional so layers can be merged
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigFile {
    pub data_dir: Option<PathBuf>,
    pub store_format: Option<StoreFormat>,
    pub default_role: Option<Role>,
    pub log_level: Option<String>,
}

/// Effective configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Data directory, already resolved against its base directory
    pub data_dir: Option<PathBuf>,
    pub store_format: StoreFormat,
    pub default_role: Option<Role>,
    pub log_level: Option<String>,
    /// Problems found while loading, reported once logging is up
    pub warnings: Vec<String>,
}

impl Config {
    /// Load configuration for the current directory
    pub fn load() -> Self {
        let project = Project::discover().ok();
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_with(
            global_config_path().as_deref(),
            project.as_ref(),
            &cwd,
            |key| std::env::var(key).ok(),
        )
    }

    /// Load from explicit sources
    pub fn load_with(
        global_path: Option<&Path>,
        project: Option<&Project>,
        cwd: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut config = Config::default();

        if let Some(path) = global_path {
            let base = path.parent().unwrap_or(cwd).to_path_buf();
            config.apply_file(path, &base);
        }

        if let Some(project) = project {
            config.data_dir = Some(project.default_data_dir());
            config.apply_file(&project.config_path(), project.root());
        }

        if let Some(dir) = env(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            config.data_dir = Some(resolve(cwd, Path::new(dir.trim())));
        }
        if let Some(value) = env(ENV_STORE_FORMAT) {
            match value.parse() {
                Ok(format) => config.store_format = format,
                Err(e) => config.warnings.push(format!("{}: {}", ENV_STORE_FORMAT, e)),
            }
        }
        if let Some(value) = env(ENV_ROLE).filter(|v| !v.trim().is_empty()) {
            match value.parse() {
                Ok(role) => config.default_role = Some(role),
                Err(e) => config.warnings.push(format!("{}: {}", ENV_ROLE, e)),
            }
        }

        config
    }

    fn apply_file(&mut self, path: &Path, base: &Path) {
        let Ok(content) = std::fs::read_to_string(path) else {
            return;
        };
        let file: ConfigFile =
            match crate::yaml::parse_yaml_optional(&content, &path.display().to_string()) {
                Ok(Some(file)) => file,
                Ok(None) => return,
                Err(e) => {
                    self.warnings
                        .push(format!("Ignoring config {}: {}", path.display(), e));
                    return;
                }
            };

        if let Some(dir) = file.data_dir {
            self.data_dir = Some(resolve(base, &dir));
        }
        if let Some(format) = file.store_format {
            self.store_format = format;
        }
        if file.default_role.is_some() {
            self.default_role = file.default_role;
        }
        if file.log_level.is_some() {
            self.log_level = file.log_level;
        }
    }
}

/// Location of the per-user config file
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "institrack")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
