//! Core type definitions for metacat.
//!
//! This crate defines the small, dependency-light types shared by every other
//! metacat crate:
//! - Entity identifiers (UUID v7) and id-or-name lookup keys
//! - Fully-qualified name algebra (dotted paths with quoted parts)
//! - Entity version numbers (major.minor)
//! - The actor performing an update (human or bot)

mod actor;
pub mod fqn;
mod ids;
mod version;

pub use actor::{Actor, ActorKind};
pub use ids::{EntityId, EntityKey};
pub use version::EntityVersion;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid version: {0}")]
    InvalidVersion(String),
}
