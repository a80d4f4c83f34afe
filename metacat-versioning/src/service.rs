//! Transactional entry point over a SQLite catalog.

use crate::config::CatalogConfig;
use crate::repository::{FieldEdit, PutResult, SchemaEntityRepository, Updated};
use crate::tags::{TagPropagator, TagRegistry};
use crate::updater::Operation;
use crate::{CatalogError, CatalogResult};
use metacat_model::{EntityKind, SchemaEntity, TagLabel};
use metacat_storage::{CatalogStore, SqliteCatalog};
use metacat_types::{Actor, EntityId, EntityKey, EntityVersion};
use std::path::Path;

/// Runs every repository operation inside one SQLite transaction, so the
/// entity row, its tag associations and its version history change together
/// or not at all.
pub struct CatalogService {
    catalog: SqliteCatalog,
    repository: SchemaEntityRepository,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(catalog: SqliteCatalog, config: CatalogConfig) -> Self {
        let propagator = TagPropagator::new(TagRegistry::from_config(&config));
        Self {
            catalog,
            repository: SchemaEntityRepository::new(propagator),
            config,
        }
    }

    pub fn open(path: &Path, config: CatalogConfig) -> CatalogResult<Self> {
        Ok(Self::new(SqliteCatalog::open(path)?, config))
    }

    pub fn open_in_memory(config: CatalogConfig) -> CatalogResult<Self> {
        Ok(Self::new(SqliteCatalog::open_in_memory()?, config))
    }

    /// The underlying database, for reads outside the repository.
    pub fn catalog(&self) -> &SqliteCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Resolves a principal name using the configured bot list.
    pub fn actor(&self, name: &str) -> Actor {
        self.config.actor(name)
    }

    pub fn create(&mut self, entity: SchemaEntity, actor: &Actor) -> CatalogResult<SchemaEntity> {
        let repository = &self.repository;
        self.catalog
            .transaction(|store| repository.create(store, entity, actor))
    }

    pub fn create_or_update(&mut self, entity: SchemaEntity, actor: &Actor) -> CatalogResult<PutResult> {
        let repository = &self.repository;
        self.catalog
            .transaction(|store| repository.create_or_update(store, entity, actor))
    }

    pub fn update(
        &mut self,
        key: &EntityKey,
        entity: SchemaEntity,
        actor: &Actor,
        operation: Operation,
    ) -> CatalogResult<Updated> {
        let repository = &self.repository;
        self.catalog
            .transaction(|store| repository.update(store, key, entity, actor, operation))
    }

    pub fn update_field(
        &mut self,
        kind: EntityKind,
        entity_fqn: &str,
        target: &str,
        edit: FieldEdit,
        actor: &Actor,
    ) -> CatalogResult<Updated> {
        let repository = &self.repository;
        self.catalog.transaction(|store| {
            repository.update_field(store, kind, entity_fqn, target, edit, actor)
        })
    }

    /// Loads an entity with its service and, optionally, its tags.
    pub fn get(&self, kind: EntityKind, key: &EntityKey, include_tags: bool) -> CatalogResult<SchemaEntity> {
        self.repository
            .get(self.catalog.connection(), kind, key, include_tags)
    }

    /// A historical version, as it was persisted.
    pub fn get_version(&self, id: &EntityId, version: EntityVersion) -> CatalogResult<SchemaEntity> {
        self.catalog
            .connection()
            .load_version(id, version)?
            .ok_or_else(|| CatalogError::NotFound(format!("{id} at version {version}")))
    }

    pub fn get_all_tags(&self, kind: EntityKind, key: &EntityKey) -> CatalogResult<Vec<TagLabel>> {
        let entity = self.get(kind, key, true)?;
        Ok(self.repository.get_all_tags(&entity))
    }
}
