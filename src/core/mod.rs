//! Core module - fundamental types and utilities

pub mod config;
pub mod entity;
pub mod identity;
pub mod legacy;
pub mod project;
pub mod store;
pub mod team;
pub mod workflow;

pub use config::Config;
pub use entity::Status;
pub use identity::{IdParseError, KeyId};
pub use legacy::{import, ImportError, ImportReport, LegacyDump, SkippedRecord};
pub use project::{Project, ProjectError};
pub use store::{FileStore, MemoryStore, RecordStore, StoreError, StoreFormat};
pub use team::{Action, Role};
pub use workflow::{CollectionCounts, IntegrityIssue, WorkflowEngine, WorkflowError};
