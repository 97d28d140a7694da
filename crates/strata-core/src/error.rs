//! Error types for strata-core

use strata_schema::ValidationReport;

/// Result type for strata-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An environment or CLI key that maps to no configuration path
    #[error("No configuration exists for {key}")]
    UnknownPath { key: String },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Configuration validation failed: {report}")]
    Validation { report: ValidationReport },

    /// Export requested without a default document to shape it
    #[error("No default configuration file was given")]
    MissingDefaults,

    #[error("Configuration from {source_name} must be a mapping, found {found}")]
    InvalidLayer { source_name: String, found: String },

    #[error(transparent)]
    Document(#[from] strata_doc::Error),

    #[error(transparent)]
    Schema(#[from] strata_schema::Error),
}
