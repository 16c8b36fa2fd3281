//! File-backed record store
//!
//! One file per collection (`<dir>/<name>.yaml` or `.json`). Every write goes
//! to a temporary file in the same directory which is then renamed over the
//! target, so readers only ever see a complete file.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::{validate_name, RecordStore, StoreError, StoreFormat};

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    format: StoreFormat,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>, format: StoreFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> StoreFormat {
        self.format
    }

    /// Path of the file backing `name`
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", name, self.format.extension()))
    }

    fn encode<T: Serialize>(&self, name: &str, records: &[T]) -> Result<String, StoreError> {
        let encoded = match self.format {
            StoreFormat::Yaml => serde_yml::to_string(records).map_err(|e| e.to_string()),
            StoreFormat::Json => serde_json::to_string_pretty(records)
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .map_err(|e| e.to_string()),
        };
        encoded.map_err(|message| StoreError::Serialize {
            name: name.to_string(),
            message,
        })
    }

    fn decode<T: DeserializeOwned>(
        &self,
        name: &str,
        path: &Path,
        content: &str,
    ) -> Result<Vec<T>, StoreError> {
        if content.trim().is_empty()
            || (self.format == StoreFormat::Yaml && crate::yaml::is_empty_document(content))
        {
            return Ok(Vec::new());
        }
        let parsed = match self.format {
            StoreFormat::Yaml => {
                crate::yaml::parse_yaml(content, &path.display().to_string()).map_err(|e| {
                    match e {
                        crate::yaml::YamlError::Syntax(s) => s.message,
                        other => other.to_string(),
                    }
                })
            }
            StoreFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| StoreError::Parse {
            name: name.to_string(),
            format: self.format,
            message,
        })
    }

    /// Write the encoded collection to a temp file next to its target
    fn stage<T: Serialize>(&self, name: &str, records: &[T]) -> Result<NamedTempFile, StoreError> {
        validate_name(name)?;
        let path = self.path_for(name);
        let write_err = |source| StoreError::Write {
            name: name.to_string(),
            path: path.clone(),
            source,
        };

        let content = self.encode(name, records)?;
        fs::create_dir_all(&self.dir).map_err(write_err)?;
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        Ok(tmp)
    }

    fn publish(&self, name: &str, tmp: NamedTempFile) -> Result<(), StoreError> {
        let path = self.path_for(name);
        tmp.persist(&path).map_err(|e| StoreError::Write {
            name: name.to_string(),
            path,
            source: e.error,
        })?;
        Ok(())
    }
}

impl RecordStore for FileStore {
    fn read_collection<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, StoreError> {
        validate_name(name)?;
        let path = self.path_for(name);
        if !path.exists() {
            tracing::debug!(collection = name, "collection file absent, reading as empty");
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            name: name.to_string(),
            path: path.clone(),
            source,
        })?;
        let records = self.decode(name, &path, &content)?;
        tracing::debug!(collection = name, count = records.len(), "read collection");
        Ok(records)
    }

    fn write_collection<T: Serialize>(
        &mut self,
        name: &str,
        records: &[T],
    ) -> Result<(), StoreError> {
        let tmp = self.stage(name, records)?;
        self.publish(name, tmp)?;
        tracing::debug!(collection = name, count = records.len(), "wrote collection");
        Ok(())
    }

    fn write_collections<T: Serialize>(
        &mut self,
        writes: &[(&str, &[T])],
    ) -> Result<(), StoreError> {
        // Stage every file first; a failure here leaves the store untouched
        let mut staged = Vec::with_capacity(writes.len());
        for (name, records) in writes {
            staged.push((*name, self.stage(name, records)?));
        }

        self.publish_all(staged, |name, tmp| self.publish(name, tmp))?;

        tracing::debug!(collections = writes.len(), "wrote collection batch");
        Ok(())
    }
}

impl FileStore {
    /// Swap staged files into place, restoring earlier targets if one fails
    fn publish_all<'a, F>(
        &self,
        staged: Vec<(&'a str, NamedTempFile)>,
        mut publish: F,
    ) -> Result<(), StoreError>
    where
        F: FnMut(&str, NamedTempFile) -> Result<(), StoreError>,
    {
        // Remember what each target held so a failed rename can be undone
        let mut previous: Vec<(&str, Option<Vec<u8>>)> = Vec::with_capacity(staged.len());
        for (name, _) in &staged {
            let path = self.path_for(name);
            let old = if path.exists() {
                Some(fs::read(&path).map_err(|source| StoreError::Read {
                    name: name.to_string(),
                    path: path.clone(),
                    source,
                })?)
            } else {
                None
            };
            previous.push((*name, old));
        }

        for (i, (name, tmp)) in staged.into_iter().enumerate() {
            if let Err(err) = publish(name, tmp) {
                self.rollback(&previous[..i]);
                return Err(err);
            }
        }
        Ok(())
    }

    fn rollback(&self, published: &[(&str, Option<Vec<u8>>)]) {
        for (name, old) in published {
            let path = self.path_for(name);
            let restored = match old {
                Some(bytes) => fs::write(&path, bytes),
                None => fs::remove_file(&path),
            };
            if let Err(e) = restored {
                tracing::error!(collection = *name, error = %e, "failed to roll back collection");
            }
        }
    }
}
