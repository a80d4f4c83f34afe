use metacat_model::{ChangeKind, DataType, EntityKind, Field, SchemaEntity, ServiceRef, TagLabel, set_field_fqn};
use metacat_storage::{CatalogStore, StorageResult};
use metacat_types::{Actor, EntityId, EntityKey, EntityVersion};
use metacat_versioning::{EntityUpdater, Operation, TagPropagator, TagRegistry};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::cell::RefCell;

/// Store that only records the tag side effects it is asked to perform.
#[derive(Default)]
struct RecordingStore {
    calls: RefCell<Vec<String>>,
}

impl RecordingStore {
    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl CatalogStore for RecordingStore {
    fn load_entity(&self, _kind: EntityKind, _key: &EntityKey) -> StorageResult<Option<SchemaEntity>> {
        Ok(None)
    }

    fn persist_entity(&self, entity: &SchemaEntity, _update: bool) -> StorageResult<()> {
        self.record(format!("persist {}", entity.fully_qualified_name));
        Ok(())
    }

    fn store_version(&self, entity: &SchemaEntity) -> StorageResult<()> {
        self.record(format!("version {}", entity.version));
        Ok(())
    }

    fn load_version(&self, _id: &EntityId, _version: EntityVersion) -> StorageResult<Option<SchemaEntity>> {
        Ok(None)
    }

    fn add_relationship(&self, service: &ServiceRef, _entity_id: &EntityId) -> StorageResult<()> {
        self.record(format!("contains {}", service.fully_qualified_name));
        Ok(())
    }

    fn container_of(&self, _entity_id: &EntityId) -> StorageResult<Option<ServiceRef>> {
        Ok(None)
    }

    fn tags_for(&self, _target_fqn: &str) -> StorageResult<Vec<TagLabel>> {
        Ok(Vec::new())
    }

    fn apply_tag(&self, tag: &TagLabel, target_fqn: &str) -> StorageResult<()> {
        self.record(format!("apply {} {}", tag.tag_fqn, target_fqn));
        Ok(())
    }

    fn remove_tags_for(&self, target_fqn: &str) -> StorageResult<()> {
        self.record(format!("purge {target_fqn}"));
        Ok(())
    }
}

fn topic(fields: Vec<Field>) -> SchemaEntity {
    let mut topic = SchemaEntity::new(EntityKind::Topic, "orders", ServiceRef::new("kafka", "Kafka"))
        .with_fields(fields);
    topic.fully_qualified_name = "kafka.orders".into();
    set_field_fqn("kafka.orders", &mut topic.fields);
    topic
}

fn payload(children: &[&str]) -> Field {
    Field::new("payload", DataType::String).with_children(
        children
            .iter()
            .map(|n| Field::new(*n, DataType::String))
            .collect(),
    )
}

fn propagator() -> TagPropagator {
    TagPropagator::new(TagRegistry::default())
}

// ── Version decision ─────────────────────────────────────────────

#[test]
fn nested_deletion_is_a_major_change() {
    let stored = topic(vec![Field::new("id", DataType::Int), payload(&["x", "y"])]);
    let mut updated = topic(vec![Field::new("id", DataType::Int), payload(&["x", "z"])]);
    updated.id = stored.id;

    let store = RecordingStore::default();
    let outcome = EntityUpdater::new(&stored, &mut updated, Operation::Put, &Actor::human("alice"), &propagator())
        .update(&store)
        .unwrap();

    assert!(outcome.major_version_change);
    assert_eq!(outcome.version, EntityVersion::new(1, 0));
    assert_eq!(outcome.deleted_fields, vec!["kafka.orders.payload.y"]);
    assert_eq!(outcome.added_fields, vec!["kafka.orders.payload.z"]);

    let deletions: Vec<_> = outcome
        .changes
        .iter()
        .filter(|c| c.kind == ChangeKind::Deleted)
        .collect();
    assert_eq!(deletions.len(), 1);
    assert_eq!(deletions[0].path, "messageSchema.schemaFields.payload");
    assert_eq!(deletions[0].old_value, json!([{"name": "y", "dataType": "STRING", "fullyQualifiedName": "kafka.orders.payload.y"}]));

    assert_eq!(store.calls(), vec!["purge kafka.orders.payload.y"]);
    assert_eq!(updated.version, EntityVersion::new(1, 0));
    assert_eq!(updated.updated_by.as_deref(), Some("alice"));
    let description = updated.change_description.unwrap();
    assert_eq!(description.previous_version, EntityVersion::INITIAL);
    assert_eq!(description.fields_added().count(), 1);
}

#[test]
fn edits_and_additions_are_minor() {
    let stored = topic(vec![Field::new("id", DataType::Int)]);
    let mut updated = topic(vec![
        Field::new("id", DataType::Int).with_description("primary key"),
        Field::new("amount", DataType::Double),
    ]);
    let outcome = EntityUpdater::new(&stored, &mut updated, Operation::Patch, &Actor::human("alice"), &propagator())
        .update(&RecordingStore::default())
        .unwrap();

    assert!(!outcome.major_version_change);
    assert_eq!(outcome.version, EntityVersion::new(0, 2));
    assert!(outcome.deleted_fields.is_empty());
}

#[test]
fn unchanged_entity_keeps_version() {
    let stored = topic(vec![Field::new("id", DataType::Int), payload(&["x"])]);
    let mut updated = stored.clone();
    let store = RecordingStore::default();
    let outcome = EntityUpdater::new(&stored, &mut updated, Operation::Put, &Actor::human("alice"), &propagator())
        .update(&store)
        .unwrap();

    assert!(!outcome.changed());
    assert_eq!(updated.version, EntityVersion::INITIAL);
    assert!(updated.change_description.is_none());
    assert!(store.calls().is_empty());
}

#[test]
fn added_subtree_tags_are_applied() {
    let stored = topic(vec![Field::new("id", DataType::Int)]);
    let mut updated = topic(vec![
        Field::new("id", DataType::Int),
        Field::new("payload", DataType::Record)
            .with_tags(vec![TagLabel::classification("Tier.Tier1")])
            .with_children(vec![
                Field::new("card", DataType::String).with_tags(vec![TagLabel::classification("PII.Sensitive")]),
            ]),
    ]);
    let store = RecordingStore::default();
    EntityUpdater::new(&stored, &mut updated, Operation::Put, &Actor::human("alice"), &propagator())
        .update(&store)
        .unwrap();

    assert_eq!(
        store.calls(),
        vec![
            "apply Tier.Tier1 kafka.orders.payload",
            "apply PII.Sensitive kafka.orders.payload.card",
        ]
    );
}

#[test]
fn deleted_subtree_purges_every_descendant() {
    let stored = topic(vec![Field::new("id", DataType::Int), payload(&["x", "y"])]);
    let mut updated = topic(vec![Field::new("id", DataType::Int)]);
    let store = RecordingStore::default();
    EntityUpdater::new(&stored, &mut updated, Operation::Put, &Actor::human("alice"), &propagator())
        .update(&store)
        .unwrap();

    assert_eq!(
        store.calls(),
        vec![
            "purge kafka.orders.payload",
            "purge kafka.orders.payload.x",
            "purge kafka.orders.payload.y",
        ]
    );
}

// ── Entity attributes ────────────────────────────────────────────

#[test]
fn bot_put_keeps_entity_description() {
    let stored = topic(vec![]).with_description("curated");
    let mut updated = topic(vec![]).with_description("scraped");
    let outcome = EntityUpdater::new(&stored, &mut updated, Operation::Put, &Actor::bot("ingestion-bot"), &propagator())
        .update(&RecordingStore::default())
        .unwrap();

    assert!(!outcome.changed());
    assert_eq!(updated.description.as_deref(), Some("curated"));
}

#[test]
fn entity_tag_change_resyncs_entity_tags() {
    let stored = topic(vec![]).with_tags(vec![TagLabel::classification("Tier.Tier2")]);
    let mut updated = topic(vec![]).with_tags(vec![TagLabel::classification("Tier.Tier1")]);
    let store = RecordingStore::default();
    let outcome = EntityUpdater::new(&stored, &mut updated, Operation::Patch, &Actor::human("alice"), &propagator())
        .update(&store)
        .unwrap();

    assert_eq!(outcome.changes.len(), 2);
    assert!(outcome.changes.iter().all(|c| c.path == "tags"));
    assert_eq!(store.calls(), vec!["purge kafka.orders", "apply Tier.Tier1 kafka.orders"]);
}

#[test]
fn scalar_and_list_properties() {
    let stored = topic(vec![])
        .with_property("partitions", json!(3))
        .with_property("cleanupPolicies", json!(["delete"]));
    let mut updated = topic(vec![])
        .with_property("partitions", json!(6))
        .with_property("cleanupPolicies", json!(["delete", "compact"]))
        .with_property("retentionTime", json!(86400.0));
    let outcome = EntityUpdater::new(&stored, &mut updated, Operation::Patch, &Actor::human("alice"), &propagator())
        .update(&RecordingStore::default())
        .unwrap();

    let summary: Vec<(ChangeKind, &str)> = outcome
        .changes
        .iter()
        .map(|c| (c.kind, c.path.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (ChangeKind::Added, "cleanupPolicies"),
            (ChangeKind::Updated, "partitions"),
            (ChangeKind::Added, "retentionTime"),
        ]
    );
    assert_eq!(outcome.changes[0].new_value, json!(["compact"]));
    assert!(!outcome.major_version_change);
}
