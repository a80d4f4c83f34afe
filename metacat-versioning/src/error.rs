//! Error types for the versioning engine.

use metacat_storage::StorageError;
use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// A request was rejected before anything was persisted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Two tags of one mutually exclusive classification on one target.
    #[error("tag labels {first} and {second} on {target} are mutually exclusive and can't be assigned together")]
    MutuallyExclusiveTags {
        target: String,
        first: String,
        second: String,
    },

    /// A targeted update named a field that does not exist.
    #[error("invalid field name {0}")]
    InvalidFieldName(String),

    /// Sibling field names must be unique.
    #[error("duplicate field name {name} under {parent}")]
    DuplicateField { parent: String, name: String },

    #[error("entity name must not be empty")]
    EmptyName,

    #[error("{0} has no containing service")]
    MissingService(String),
}

/// Errors that can occur in catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("entity not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}
