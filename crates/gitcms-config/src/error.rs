//! Error types for config loading.

use miette::{Diagnostic, NamedSource, SourceOffset, SourceSpan};
use std::path::PathBuf;

/// Main error type for config loading and emitting.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {}", path.display())]
    #[diagnostic(code(gitcms::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON/YAML text, with source location
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    /// Well-formed document that is not a config (e.g. no `collections`)
    #[error("invalid config: {0}")]
    #[diagnostic(
        code(gitcms::config::shape),
        help("a config needs at least a `collections` list")
    )]
    Shape(#[from] serde_json::Error),

    /// YAML construct with no JSON equivalent (complex keys, aliases)
    #[error("unsupported YAML: {0}")]
    #[diagnostic(code(gitcms::config::yaml))]
    UnsupportedYaml(String),

    /// Failed to write YAML output
    #[error("failed to emit YAML: {0}")]
    #[diagnostic(code(gitcms::config::emit))]
    Emit(String),

    #[error("unsupported config format for {}", path.display())]
    #[diagnostic(
        code(gitcms::config::format),
        help("use a .json, .yml or .yaml file")
    )]
    UnsupportedFormat { path: PathBuf },
}

/// Syntax error with the offending source attached for fancy reports.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(gitcms::config::syntax))]
pub struct SyntaxError {
    message: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    location: SourceSpan,
    line: usize,
    column: usize,
}

impl SyntaxError {
    /// Build from a 1-based line and column into `source`.
    pub fn at(
        name: impl AsRef<str>,
        source: &str,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        let offset = SourceOffset::from_location(source, line.max(1), column.max(1));
        Self {
            message: message.into(),
            src: NamedSource::new(name, source.to_owned()),
            location: SourceSpan::new(offset, 0),
            line,
            column,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn offset(&self) -> usize {
        self.location.offset()
    }
}
