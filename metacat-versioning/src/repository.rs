//! Create, load and update schema entities against a [`CatalogStore`].

use crate::tags::TagPropagator;
use crate::updater::{EntityUpdater, Operation, UpdateOutcome};
use crate::{CatalogError, CatalogResult, ValidationError};
use metacat_model::{EntityKind, Field, SchemaEntity, TagLabel, clone_without_tags, find_path_mut, merge_tags, set_field_fqn};
use metacat_storage::CatalogStore;
use metacat_types::{Actor, EntityKey, EntityVersion, fqn};
use std::collections::HashSet;
use tracing::{debug, info};

/// An entity after an update, with what the update did.
#[derive(Debug, Clone, PartialEq)]
pub struct Updated {
    pub entity: SchemaEntity,
    pub outcome: UpdateOutcome,
}

/// Result of a create-or-update.
#[derive(Debug, Clone, PartialEq)]
pub enum PutResult {
    Created(SchemaEntity),
    Updated(Updated),
}

impl PutResult {
    pub fn entity(&self) -> &SchemaEntity {
        match self {
            Self::Created(entity) => entity,
            Self::Updated(updated) => &updated.entity,
        }
    }
}

/// A single-field edit.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Description(String),
    Tags(Vec<TagLabel>),
}

pub struct SchemaEntityRepository {
    propagator: TagPropagator,
}

impl SchemaEntityRepository {
    pub fn new(propagator: TagPropagator) -> Self {
        Self { propagator }
    }

    pub fn propagator(&self) -> &TagPropagator {
        &self.propagator
    }

    /// Computes the entity FQN from its service and name and propagates it
    /// down the field tree.
    pub fn set_fully_qualified_name(&self, entity: &mut SchemaEntity) -> Result<(), ValidationError> {
        let service = entity
            .service
            .as_ref()
            .ok_or_else(|| ValidationError::MissingService(entity.name.clone()))?;
        entity.fully_qualified_name = fqn::add(&service.fully_qualified_name, &entity.name);
        set_field_fqn(&entity.fully_qualified_name, &mut entity.fields);
        Ok(())
    }

    /// Validates an incoming entity and normalizes it for storage: FQNs,
    /// derived tags, tag exclusivity. Touches no storage.
    pub fn prepare(&self, entity: &mut SchemaEntity) -> CatalogResult<()> {
        if entity.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        self.set_fully_qualified_name(entity)?;
        check_unique_names(&entity.fully_qualified_name, &entity.fields)?;

        entity.tags = self.propagator.add_derived_tags(&entity.tags);
        self.propagator
            .check_mutually_exclusive(&entity.fully_qualified_name, &entity.tags)?;
        self.propagator.add_derived_field_tags(&mut entity.fields);
        self.propagator.validate_field_tags(&entity.fields)?;

        debug!("Prepared {} {}", entity.kind, entity.fully_qualified_name);
        Ok(())
    }

    /// Writes the entity row without service reference or tags.
    pub fn store_entity(&self, store: &dyn CatalogStore, entity: &SchemaEntity, update: bool) -> CatalogResult<()> {
        store.persist_entity(&stored_form(entity), update)?;
        Ok(())
    }

    pub fn store_relationships(&self, store: &dyn CatalogStore, entity: &SchemaEntity) -> CatalogResult<()> {
        let service = entity
            .service
            .as_ref()
            .ok_or_else(|| ValidationError::MissingService(entity.name.clone()))?;
        store.add_relationship(service, &entity.id)?;
        Ok(())
    }

    /// Persists the entity's own tags and the tags of its whole field tree.
    pub fn apply_tags(&self, store: &dyn CatalogStore, entity: &SchemaEntity) -> CatalogResult<()> {
        self.propagator
            .apply_tags(store, &entity.tags, &entity.fully_qualified_name)?;
        self.propagator.apply_field_tags(store, &entity.fields)?;
        Ok(())
    }

    /// Reattaches what storage keeps outside the entity row.
    pub fn set_fields(&self, store: &dyn CatalogStore, entity: &mut SchemaEntity, include_tags: bool) -> CatalogResult<()> {
        entity.service = store.container_of(&entity.id)?;
        if include_tags {
            entity.tags = store.tags_for(&entity.fully_qualified_name)?;
            self.propagator.populate_field_tags(store, &mut entity.fields)?;
        }
        Ok(())
    }

    pub fn find(
        &self,
        store: &dyn CatalogStore,
        kind: EntityKind,
        key: &EntityKey,
        include_tags: bool,
    ) -> CatalogResult<Option<SchemaEntity>> {
        let Some(mut entity) = store.load_entity(kind, key)? else {
            return Ok(None);
        };
        self.set_fields(store, &mut entity, include_tags)?;
        Ok(Some(entity))
    }

    pub fn get(
        &self,
        store: &dyn CatalogStore,
        kind: EntityKind,
        key: &EntityKey,
        include_tags: bool,
    ) -> CatalogResult<SchemaEntity> {
        self.find(store, kind, key, include_tags)?
            .ok_or_else(|| CatalogError::NotFound(format!("{kind} {key}")))
    }

    pub fn create(&self, store: &dyn CatalogStore, mut entity: SchemaEntity, actor: &Actor) -> CatalogResult<SchemaEntity> {
        self.prepare(&mut entity)?;
        entity.version = EntityVersion::INITIAL;
        entity.change_description = None;
        entity.updated_by = Some(actor.name.clone());
        entity.updated_at = chrono::Utc::now().timestamp_millis();

        self.store_entity(store, &entity, false)?;
        self.store_relationships(store, &entity)?;
        self.apply_tags(store, &entity)?;
        info!(
            "Created {} {} with {} top-level fields",
            entity.kind,
            entity.fully_qualified_name,
            entity.fields.len()
        );
        Ok(entity)
    }

    /// Reconciles `updated` against the stored entity identified by `key`.
    /// Nothing is written when the update changes nothing.
    pub fn update(
        &self,
        store: &dyn CatalogStore,
        key: &EntityKey,
        mut updated: SchemaEntity,
        actor: &Actor,
        operation: Operation,
    ) -> CatalogResult<Updated> {
        let original = self.get(store, updated.kind, key, true)?;
        updated.id = original.id;
        let moved = match (&updated.service, &original.service) {
            (None, _) => false,
            (Some(incoming), Some(stored)) => incoming.fully_qualified_name != stored.fully_qualified_name,
            (Some(_), None) => true,
        };
        if !moved {
            updated.service = original.service.clone();
        }
        self.prepare(&mut updated)?;

        let outcome = EntityUpdater::new(&original, &mut updated, operation, actor, &self.propagator)
            .update(store)?;
        if outcome.changed() {
            store.store_version(&stored_form(&original))?;
            self.store_entity(store, &updated, true)?;
            if moved {
                self.store_relationships(store, &updated)?;
                info!(
                    "Moved {} {} -> {}",
                    updated.kind, original.fully_qualified_name, updated.fully_qualified_name
                );
            }
        }
        Ok(Updated {
            entity: updated,
            outcome,
        })
    }

    /// Creates the entity, or fully replaces the stored one with the same FQN.
    pub fn create_or_update(&self, store: &dyn CatalogStore, mut entity: SchemaEntity, actor: &Actor) -> CatalogResult<PutResult> {
        self.set_fully_qualified_name(&mut entity)?;
        let key = EntityKey::Name(entity.fully_qualified_name.clone());
        if store.load_entity(entity.kind, &key)?.is_none() {
            return Ok(PutResult::Created(self.create(store, entity, actor)?));
        }
        Ok(PutResult::Updated(self.update(store, &key, entity, actor, Operation::Put)?))
    }

    /// Edits one field, addressed by its local path (`payload` or
    /// `"payload.x"`), and reconciles the result as a patch.
    pub fn update_field(
        &self,
        store: &dyn CatalogStore,
        kind: EntityKind,
        entity_fqn: &str,
        target: &str,
        edit: FieldEdit,
        actor: &Actor,
    ) -> CatalogResult<Updated> {
        let original = self.get(store, kind, &EntityKey::Name(entity_fqn.to_string()), true)?;
        let path = fqn::split(fqn::unquote_name(target));
        let mut updated = original.clone();
        let field = if path.is_empty() {
            None
        } else {
            find_path_mut(&mut updated.fields, &path)
        }
        .ok_or_else(|| ValidationError::InvalidFieldName(target.to_string()))?;

        match edit {
            FieldEdit::Description(description) => field.description = Some(description),
            FieldEdit::Tags(tags) => field.tags = tags,
        }
        self.update(store, &EntityKey::Id(original.id), updated, actor, Operation::Patch)
    }

    /// Entity tags plus every tag in the field tree, deduplicated, in
    /// pre-order.
    pub fn get_all_tags(&self, entity: &SchemaEntity) -> Vec<TagLabel> {
        let mut all = entity.tags.clone();
        for field in &entity.fields {
            field.visit(&mut |f| merge_tags(&mut all, &f.tags));
        }
        all
    }
}

/// The entity as persisted: no service reference, no tags anywhere.
fn stored_form(entity: &SchemaEntity) -> SchemaEntity {
    SchemaEntity {
        service: None,
        tags: Vec::new(),
        fields: clone_without_tags(&entity.fields),
        ..entity.clone()
    }
}

fn check_unique_names(parent: &str, fields: &[Field]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields {
        if !seen.insert(field.name.as_str()) {
            return Err(ValidationError::DuplicateField {
                parent: parent.to_string(),
                name: field.name.clone(),
            });
        }
        check_unique_names(field.fqn(), &field.children)?;
    }
    Ok(())
}
