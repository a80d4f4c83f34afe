//! Applies an incoming entity to its stored counterpart and decides the
//! next version.

use crate::CatalogResult;
use crate::carry_forward::{CarryForward, FieldTreeChanges, carry_text};
use crate::changes::ChangeRecorder;
use crate::matcher;
use crate::tags::TagPropagator;
use metacat_model::{ChangeDescription, ChangeRecord, SchemaEntity, TagLabel};
use metacat_storage::CatalogStore;
use metacat_types::{Actor, EntityVersion};
use serde_json::Value;
use tracing::{debug, info};

/// How the incoming entity relates to the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Full replacement (create-or-update).
    Put,
    /// Incremental edit.
    Patch,
}

/// Result of one update.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub previous_version: EntityVersion,
    pub version: EntityVersion,
    pub major_version_change: bool,
    pub changes: Vec<ChangeRecord>,
    /// FQNs of fields removed from the tree (top-most only).
    pub deleted_fields: Vec<String>,
    /// FQNs of fields added to the tree (top-most only).
    pub added_fields: Vec<String>,
}

impl UpdateOutcome {
    /// False when the update was a no-op and nothing needs persisting.
    pub fn changed(&self) -> bool {
        !self.changes.is_empty()
    }
}

pub struct EntityUpdater<'a> {
    original: &'a SchemaEntity,
    updated: &'a mut SchemaEntity,
    operation: Operation,
    actor: &'a Actor,
    propagator: &'a TagPropagator,
    recorder: ChangeRecorder,
    major_version_change: bool,
    tree: FieldTreeChanges,
}

impl<'a> EntityUpdater<'a> {
    pub fn new(
        original: &'a SchemaEntity,
        updated: &'a mut SchemaEntity,
        operation: Operation,
        actor: &'a Actor,
        propagator: &'a TagPropagator,
    ) -> Self {
        Self {
            original,
            updated,
            operation,
            actor,
            propagator,
            recorder: ChangeRecorder::new(),
            major_version_change: false,
            tree: FieldTreeChanges::default(),
        }
    }

    /// Reconciles the updated entity in place and applies tag side effects
    /// through `store`. Version, change description and audit fields are set
    /// on the updated entity; persisting it is left to the caller.
    pub fn update(mut self, store: &dyn CatalogStore) -> CatalogResult<UpdateOutcome> {
        self.update_internal(store)?;
        self.entity_specific_update(store)?;

        let previous_version = self.original.version;
        let changes = self.recorder.into_records();
        if changes.is_empty() {
            self.updated.version = previous_version;
            self.updated.change_description = self.original.change_description.clone();
            self.updated.updated_by = self.original.updated_by.clone();
            self.updated.updated_at = self.original.updated_at;
            debug!("No changes to {}", self.updated.fully_qualified_name);
        } else {
            self.updated.version = previous_version.next(self.major_version_change);
            self.updated.change_description = Some(ChangeDescription {
                previous_version,
                changes: changes.clone(),
            });
            self.updated.updated_by = Some(self.actor.name.clone());
            self.updated.updated_at = chrono::Utc::now().timestamp_millis();
            info!(
                "Updated {} {} {} -> {} ({} changes, major: {})",
                self.updated.kind,
                self.updated.fully_qualified_name,
                previous_version,
                self.updated.version,
                changes.len(),
                self.major_version_change
            );
        }

        Ok(UpdateOutcome {
            previous_version,
            version: self.updated.version,
            major_version_change: self.major_version_change,
            changes,
            deleted_fields: self.tree.deleted.iter().map(|f| f.fqn().to_string()).collect(),
            added_fields: self.tree.added.iter().map(|f| f.fqn().to_string()).collect(),
        })
    }

    /// Attributes every entity kind shares.
    fn update_internal(&mut self, store: &dyn CatalogStore) -> CatalogResult<()> {
        self.recorder
            .record_change("name", &self.original.name, &self.updated.name)?;
        self.recorder
            .record_change("service", &service_fqn(self.original), &service_fqn(self.updated))?;
        carry_text(
            self.operation,
            self.actor,
            &mut self.recorder,
            "description",
            &self.original.description,
            &mut self.updated.description,
        )?;
        carry_text(
            self.operation,
            self.actor,
            &mut self.recorder,
            "displayName",
            &self.original.display_name,
            &mut self.updated.display_name,
        )?;
        self.update_entity_tags(store)
    }

    fn update_entity_tags(&mut self, store: &dyn CatalogStore) -> CatalogResult<()> {
        let diff = self.recorder.record_list_change(
            "tags",
            &self.original.tags,
            &self.updated.tags,
            TagLabel::same_tag,
        )?;
        let stored_fqn = &self.original.fully_qualified_name;
        let target_fqn = &self.updated.fully_qualified_name;
        if !diff.is_unchanged() || stored_fqn != target_fqn {
            self.propagator
                .sync_tags(store, stored_fqn, target_fqn, &self.updated.tags)?;
        }
        Ok(())
    }

    /// Kind properties and the field tree.
    fn entity_specific_update(&mut self, store: &dyn CatalogStore) -> CatalogResult<()> {
        self.update_properties()?;
        self.update_fields(store)
    }

    fn update_properties(&mut self) -> CatalogResult<()> {
        let list_properties = self.original.kind.list_properties();
        let keys: Vec<&String> = {
            let mut keys: Vec<&String> = self
                .original
                .properties
                .keys()
                .chain(self.updated.properties.keys())
                .collect();
            keys.sort();
            keys.dedup();
            keys
        };

        for key in keys {
            let old = self.original.properties.get(key);
            let new = self.updated.properties.get(key);
            if list_properties.contains(&key.as_str()) {
                let old = list_items(old);
                let new = list_items(new);
                self.recorder
                    .record_list_change(key, &old, &new, |a: &Value, b: &Value| a == b)?;
            } else {
                self.recorder.record_change(key, &old, &new)?;
            }
        }
        Ok(())
    }

    fn update_fields(&mut self, store: &dyn CatalogStore) -> CatalogResult<()> {
        let kind = self.original.kind;
        let matcher = matcher::for_kind(kind);
        let carry = CarryForward {
            operation: self.operation,
            actor: self.actor,
            matcher: &matcher,
        };
        carry.reconcile(
            &mut self.recorder,
            kind.fields_path(),
            &self.original.fields,
            &mut self.updated.fields,
            &mut self.tree,
        )?;

        // A removal at any depth is a major change.
        self.major_version_change |= !self.tree.deleted.is_empty();

        for deleted in &self.tree.deleted {
            self.propagator.purge_field_tags(store, deleted)?;
        }
        for added in &self.tree.added {
            self.propagator
                .apply_field_tags(store, std::slice::from_ref(added))?;
        }
        for sync in &self.tree.tag_syncs {
            self.propagator
                .sync_tags(store, &sync.stored_fqn, &sync.target_fqn, &sync.tags)?;
        }
        Ok(())
    }
}

fn service_fqn(entity: &SchemaEntity) -> Option<&str> {
    entity.service.as_ref().map(|s| s.fully_qualified_name.as_str())
}

fn list_items(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other.clone()],
    }
}
