//! YAML error types with source spans for miette

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Any failure while loading a YAML document
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A parse error pointing at the offending location
#[derive(Debug, Error, Diagnostic)]
#[error("Invalid YAML in {filename}: {message}")]
#[diagnostic(code(institrack::yaml::syntax))]
pub struct YamlSyntaxError {
    pub message: String,
    pub filename: String,
    pub line: Option<usize>,

    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: Option<SourceSpan>,
}

impl YamlSyntaxError {
    pub fn from_serde_error(err: &serde_yml::Error, content: &str, filename: &str) -> Self {
        let location = err.location();
        let span = location.as_ref().map(|loc| {
            let offset = loc.index().min(content.len());
            SourceSpan::from((offset, 1.min(content.len() - offset)))
        });

        Self {
            message: err.to_string(),
            filename: filename.to_string(),
            line: location.as_ref().map(|loc| loc.line()),
            src: NamedSource::new(filename, content.to_string()),
            span,
        }
    }
}
