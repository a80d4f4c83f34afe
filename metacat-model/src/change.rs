use metacat_types::EntityVersion;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// No previous value.
    Added,
    Updated,
    /// No new value.
    Deleted,
}

/// One audit entry produced while reconciling an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    /// Dotted attribute path, e.g. `messageSchema.schemaFields.payload.description`.
    pub path: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub old_value: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub new_value: Value,
}

impl ChangeRecord {
    /// Classifies an `old -> new` pair. `None` when the values are equal.
    pub fn classify(path: &str, old_value: Value, new_value: Value) -> Option<Self> {
        let kind = match (&old_value, &new_value) {
            (old, new) if old == new => return None,
            (Value::Null, _) => ChangeKind::Added,
            (_, Value::Null) => ChangeKind::Deleted,
            _ => ChangeKind::Updated,
        };
        Some(Self {
            kind,
            path: path.to_string(),
            old_value,
            new_value,
        })
    }
}

/// The changes one update made to an entity, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDescription {
    pub previous_version: EntityVersion,
    #[serde(default)]
    pub changes: Vec<ChangeRecord>,
}

impl ChangeDescription {
    pub fn fields_added(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.of_kind(ChangeKind::Added)
    }

    pub fn fields_updated(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.of_kind(ChangeKind::Updated)
    }

    pub fn fields_deleted(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.of_kind(ChangeKind::Deleted)
    }

    fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &ChangeRecord> {
        self.changes.iter().filter(move |c| c.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
