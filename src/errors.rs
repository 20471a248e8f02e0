//! Error types for artifact definition reading, validation and registration.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for artifact definition operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The definition document violates the schema
    #[error("{0}")]
    Format(String),

    /// No source type constructor is registered for the type indicator
    #[error("Unsupported type indicator: {0}.")]
    UnsupportedTypeIndicator(String),

    /// A name, alias or type indicator is already registered
    #[error("{0}")]
    KeyExists(String),

    /// A name, alias or type indicator is not registered
    #[error("{0}")]
    KeyNotFound(String),

    /// Artifact groups reference artifact definitions that are not defined
    #[error("Undefined artifact definitions: {}", .0.join(", "))]
    MissingDependency(Vec<String>),

    #[error("Unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Error::Format(message.into())
    }

    /// Whether the error belongs to the schema-violation (FormatError) kind.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Error::Format(_) | Error::UnsupportedTypeIndicator(_))
    }
}
