//! YAML parsing and error handling

pub mod diagnostics;
pub mod parser;

pub use diagnostics::{YamlError, YamlSyntaxError};
pub use parser::{is_empty_document, parse_yaml, parse_yaml_file, parse_yaml_optional};
