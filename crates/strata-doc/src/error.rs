//! Error types for strata-doc

use std::path::PathBuf;

/// Result type for strata-doc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in strata-doc operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse {format} content: {message}")]
    Parse { format: String, message: String },

    #[error("Failed to render {format} content: {message}")]
    Render { format: String, message: String },

    #[error("Error reading file {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Path not found: {path}")]
    PathNotFound { path: String },

    #[error("Cannot set {path}: container {missing} does not exist")]
    MissingContainer { path: String, missing: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn render(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }
}
