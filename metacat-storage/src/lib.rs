//! Storage collaborator for metacat.
//!
//! The versioning engine never talks to a database directly; it consumes the
//! narrow [`CatalogStore`] interface. Every method takes `&self` so that one
//! implementation can be handed out for the lifetime of a single transaction.
//!
//! # Architecture
//!
//! - Entities are stored as JSON documents without service reference or tags
//! - Tags live in a tag-usage table keyed by the target's fully-qualified name
//! - The service containing an entity is a relationship row
//! - Every update writes the previous entity JSON to a version history table
//!
//! [`SqliteCatalog`] is the bundled implementation. Its
//! [`transaction`](SqliteCatalog::transaction) method provides the atomic
//! boundary the update pipeline runs in.

mod error;
mod sqlite;

pub use error::{StorageError, StorageResult};
pub use sqlite::SqliteCatalog;

use metacat_model::{EntityKind, SchemaEntity, ServiceRef, TagLabel};
use metacat_types::{EntityId, EntityKey, EntityVersion};

/// Persistence operations the versioning engine depends on.
pub trait CatalogStore {
    /// Loads an entity as persisted: no service reference, no tags.
    fn load_entity(&self, kind: EntityKind, key: &EntityKey) -> StorageResult<Option<SchemaEntity>>;

    /// Writes the entity row. With `update = false` the row must not exist yet.
    fn persist_entity(&self, entity: &SchemaEntity, update: bool) -> StorageResult<()>;

    /// Appends `entity` to its version history under `entity.version`.
    fn store_version(&self, entity: &SchemaEntity) -> StorageResult<()>;

    /// Loads a historical version written by [`store_version`](Self::store_version).
    fn load_version(&self, id: &EntityId, version: EntityVersion) -> StorageResult<Option<SchemaEntity>>;

    /// Records that `service` contains the entity, replacing any previous
    /// container.
    fn add_relationship(&self, service: &ServiceRef, entity_id: &EntityId) -> StorageResult<()>;

    /// The service containing the entity, if any.
    fn container_of(&self, entity_id: &EntityId) -> StorageResult<Option<ServiceRef>>;

    /// Tags associated with a fully-qualified name.
    fn tags_for(&self, target_fqn: &str) -> StorageResult<Vec<TagLabel>>;

    /// Associates a tag with a fully-qualified name. Re-applying is a no-op.
    fn apply_tag(&self, tag: &TagLabel, target_fqn: &str) -> StorageResult<()>;

    /// Removes every tag association of a fully-qualified name. Tag
    /// definitions are not touched.
    fn remove_tags_for(&self, target_fqn: &str) -> StorageResult<()>;
}
