//! Catalog entity model for metacat.
//!
//! Defines the types the versioning engine reconciles:
//! - [`SchemaEntity`]: a versioned catalog object (topic, search index) owning a field tree
//! - [`Field`]: a node of the recursive field tree
//! - [`TagLabel`]: a classification or glossary tag attached to an entity or field
//! - [`ChangeRecord`] / [`ChangeDescription`]: the audit trail of one update
//!
//! Tags are carried inline on these types in memory, but the persisted entity
//! JSON never contains them: storage keeps them as tag associations keyed by
//! fully-qualified name.

mod change;
mod entity;
mod field;
mod tag;

pub use change::{ChangeDescription, ChangeKind, ChangeRecord};
pub use entity::{EntityKind, SchemaEntity, ServiceRef};
pub use field::{DataType, Field, clone_without_tags, find_path, find_path_mut, set_field_fqn};
pub use tag::{LabelType, TagLabel, TagSource, TagState, merge_tags};

/// True when an optional text attribute holds a non-empty string.
pub fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}
