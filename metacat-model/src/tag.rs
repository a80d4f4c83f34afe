use metacat_types::fqn;
use serde::{Deserialize, Serialize};

/// Where a tag is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TagSource {
    Classification,
    Glossary,
}

/// How a tag came to be attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelType {
    #[default]
    Manual,
    Propagated,
    Automated,
    /// Implied by another tag (a glossary term's related classification tags).
    Derived,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TagState {
    Suggested,
    #[default]
    Confirmed,
}

/// A tag attached to an entity or field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagLabel {
    /// e.g. `PII.Sensitive` or `Business.Customer`.
    #[serde(rename = "tagFQN")]
    pub tag_fqn: String,
    pub source: TagSource,
    #[serde(default)]
    pub label_type: LabelType,
    #[serde(default)]
    pub state: TagState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TagLabel {
    fn with_source(tag_fqn: &str, source: TagSource) -> Self {
        Self {
            tag_fqn: tag_fqn.into(),
            source,
            label_type: LabelType::Manual,
            state: TagState::Confirmed,
            description: None,
        }
    }

    /// Shorthand for a manually applied classification tag.
    pub fn classification(tag_fqn: &str) -> Self {
        Self::with_source(tag_fqn, TagSource::Classification)
    }

    /// Shorthand for a manually applied glossary term.
    pub fn glossary(term_fqn: &str) -> Self {
        Self::with_source(term_fqn, TagSource::Glossary)
    }

    pub fn with_label_type(mut self, label_type: LabelType) -> Self {
        self.label_type = label_type;
        self
    }

    /// The classification (or glossary) this tag belongs to.
    pub fn parent_fqn(&self) -> Option<String> {
        fqn::parent(&self.tag_fqn)
    }

    /// Two labels denote the same tag iff FQN and source agree.
    /// Label type, state and description do not participate.
    pub fn same_tag(&self, other: &TagLabel) -> bool {
        self.tag_fqn == other.tag_fqn && self.source == other.source
    }
}

/// Appends every label of `from` that `into` does not already hold.
pub fn merge_tags(into: &mut Vec<TagLabel>, from: &[TagLabel]) {
    for tag in from {
        if !into.iter().any(|t| t.same_tag(tag)) {
            into.push(tag.clone());
        }
    }
}
