//! Record store - named collections of serialized records
//!
//! The workflow engine never touches files directly; it is handed a
//! [`RecordStore`] and reads or replaces whole collections through it.
//! A collection that was never written reads back as empty.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// On-disk encoding of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreFormat {
    #[default]
    Yaml,
    Json,
}

impl StoreFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            StoreFormat::Yaml => "yaml",
            StoreFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for StoreFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreFormat::Yaml => write!(f, "yaml"),
            StoreFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for StoreFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yaml" | "yml" => Ok(StoreFormat::Yaml),
            "json" => Ok(StoreFormat::Json),
            _ => Err(format!("Unknown store format: {}", s)),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid collection name '{0}' (use letters, digits, '-' or '_')")]
    InvalidName(String),

    #[error("Failed to read collection '{name}' from {}: {source}", path.display())]
    Read {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write collection '{name}' to {}: {source}", path.display())]
    Write {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Collection '{name}' is not valid {format}: {message}")]
    Parse {
        name: String,
        format: StoreFormat,
        message: String,
    },

    #[error("Failed to serialize collection '{name}': {message}")]
    Serialize { name: String, message: String },
}

/// Keyed persistence of named record collections
pub trait RecordStore {
    /// Stored records for `name`, or an empty list if nothing was stored
    fn read_collection<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, StoreError>;

    /// Replace the whole collection `name`
    fn write_collection<T: Serialize>(&mut self, name: &str, records: &[T])
        -> Result<(), StoreError>;

    /// Replace several collections as one unit
    fn write_collections<T: Serialize>(
        &mut self,
        writes: &[(&str, &[T])],
    ) -> Result<(), StoreError> {
        for (name, records) in writes {
            self.write_collection(name, records)?;
        }
        Ok(())
    }
}

/// Collection names double as file names, so keep them to a safe alphabet
pub(crate) fn validate_name(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}
