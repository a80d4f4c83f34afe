use crate::{ChangeDescription, Field, TagLabel};
use metacat_types::{EntityId, EntityVersion};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The kinds of catalog entity that own a field tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Topic,
    SearchIndex,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::SearchIndex => "searchIndex",
        }
    }

    /// Change-record path of the root field list.
    pub fn fields_path(&self) -> &'static str {
        match self {
            Self::Topic => "messageSchema.schemaFields",
            Self::SearchIndex => "fields",
        }
    }

    /// Properties whose values are lists and are audited element-wise.
    pub fn list_properties(&self) -> &'static [&'static str] {
        match self {
            Self::Topic => &["cleanupPolicies"],
            Self::SearchIndex => &[],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to the service (Kafka cluster, Elasticsearch cluster) that
/// contains an entity. The entity FQN is derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRef {
    pub id: EntityId,
    pub fully_qualified_name: String,
    pub service_type: String,
}

impl ServiceRef {
    pub fn new(fully_qualified_name: &str, service_type: &str) -> Self {
        Self {
            id: EntityId::new(),
            fully_qualified_name: fully_qualified_name.into(),
            service_type: service_type.into(),
        }
    }
}

/// A versioned catalog entity owning a field tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub name: String,
    /// Stored as a relationship, not inline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceRef>,
    #[serde(default)]
    pub fully_qualified_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub version: EntityVersion,
    /// Stored as tag associations, not inline.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagLabel>,
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Kind-specific top-level attributes (`partitions`, `retentionTime`,
    /// `messageSchema.schemaText`, `searchIndexSettings`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_description: Option<ChangeDescription>,
}

impl SchemaEntity {
    pub fn new(kind: EntityKind, name: impl Into<String>, service: ServiceRef) -> Self {
        Self {
            id: EntityId::new(),
            kind,
            name: name.into(),
            service: Some(service),
            fully_qualified_name: String::new(),
            description: None,
            display_name: None,
            version: EntityVersion::INITIAL,
            tags: Vec::new(),
            fields: Vec::new(),
            properties: BTreeMap::new(),
            updated_by: None,
            updated_at: 0,
            change_description: None,
        }
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<TagLabel>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_property(mut self, key: &str, value: serde_json::Value) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }

    /// Look up a property by name.
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}
