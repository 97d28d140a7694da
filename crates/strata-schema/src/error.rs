//! Error types for strata-schema

/// Result type for strata-schema operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while compiling a schema document
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Schema '{id}' references itself")]
    SelfReference { id: String },

    #[error("Schema root must be a mapping, found {found}")]
    InvalidRoot { found: String },

    #[error("Schema id at {path} must be a scalar, found {found}")]
    InvalidSchemaId { path: String, found: String },
}
