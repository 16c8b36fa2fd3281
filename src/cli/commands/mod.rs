//! CLI command implementations

pub mod completions;
pub mod import;
pub mod init;
pub mod sub;
pub mod validate;
pub mod workflow;
