//! YAML parsing with error handling

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::yaml::diagnostics::{YamlError, YamlSyntaxError};

/// Parse YAML content into a typed value with nice error messages
pub fn parse_yaml<T: DeserializeOwned>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content)
        .map_err(|e| YamlError::Syntax(YamlSyntaxError::from_serde_error(&e, content, filename)))
}

/// Parse YAML from a file path
pub fn parse_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml(&content, &path.display().to_string())
}

/// Whether `content` holds no YAML nodes at all (blank lines and comments)
pub fn is_empty_document(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}

/// Parse YAML that may legitimately be empty; `None` for an empty document
pub fn parse_yaml_optional<T: DeserializeOwned>(
    content: &str,
    filename: &str,
) -> Result<Option<T>, YamlError> {
    if is_empty_document(content) {
        return Ok(None);
    }
    parse_yaml(content, filename).map(Some)
}
