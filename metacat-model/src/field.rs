use crate::TagLabel;
use metacat_types::fqn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A node in an entity's field tree (a topic schema field, a search index
/// field mapping, a nested record member).
///
/// Children are owned by their parent; a field's `fully_qualified_name` is
/// derived from its position and recomputed by [`set_field_fqn`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Unique among siblings.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fully_qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub data_type: DataType,
    /// Human-readable type, e.g. `array<record<id:int>>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type_display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal_position: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagLabel>,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            fully_qualified_name: None,
            description: None,
            data_type,
            data_type_display: None,
            ordinal_position: None,
            children: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_data_type_display(mut self, display: impl Into<String>) -> Self {
        self.data_type_display = Some(display.into());
        self
    }

    pub fn with_ordinal_position(mut self, position: u32) -> Self {
        self.ordinal_position = Some(position);
        self
    }

    pub fn with_children(mut self, children: Vec<Field>) -> Self {
        self.children = children;
        self
    }

    pub fn with_tags(mut self, tags: Vec<TagLabel>) -> Self {
        self.tags = tags;
        self
    }

    /// The FQN if one has been assigned, otherwise the bare name.
    pub fn fqn(&self) -> &str {
        self.fully_qualified_name.as_deref().unwrap_or(&self.name)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Deep copy without tags at any level.
    #[must_use]
    pub fn clone_without_tags(&self) -> Self {
        Self {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            fully_qualified_name: self.fully_qualified_name.clone(),
            description: self.description.clone(),
            data_type: self.data_type,
            data_type_display: self.data_type_display.clone(),
            ordinal_position: self.ordinal_position,
            children: clone_without_tags(&self.children),
            tags: Vec::new(),
        }
    }

    /// Union of this field's tags and the tags of every descendant.
    pub fn all_tags(&self) -> HashSet<TagLabel> {
        let mut tags = HashSet::new();
        self.visit(&mut |f| tags.extend(f.tags.iter().cloned()));
        tags
    }

    /// Pre-order walk over this field and its descendants.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Field)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    /// Pre-order walk with mutable access.
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut Field)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }
}

/// Sets every field's FQN to `parent_fqn` + its name, recursing into children
/// with the field's own new FQN as their parent.
pub fn set_field_fqn(parent_fqn: &str, fields: &mut [Field]) {
    for field in fields {
        let field_fqn = fqn::add(parent_fqn, &field.name);
        set_field_fqn(&field_fqn, &mut field.children);
        field.fully_qualified_name = Some(field_fqn);
    }
}

/// Deep copies a sibling list, dropping tags.
pub fn clone_without_tags(fields: &[Field]) -> Vec<Field> {
    fields.iter().map(Field::clone_without_tags).collect()
}

/// Resolves a field by its local path of names, starting at `fields`.
pub fn find_path<'a, S: AsRef<str>>(fields: &'a [Field], path: &[S]) -> Option<&'a Field> {
    let (first, rest) = path.split_first()?;
    let field = fields.iter().find(|f| f.name == first.as_ref())?;
    if rest.is_empty() {
        Some(field)
    } else {
        find_path(&field.children, rest)
    }
}

/// Mutable variant of [`find_path`].
pub fn find_path_mut<'a, S: AsRef<str>>(fields: &'a mut [Field], path: &[S]) -> Option<&'a mut Field> {
    let (first, rest) = path.split_first()?;
    let field = fields.iter_mut().find(|f| f.name == first.as_ref())?;
    if rest.is_empty() {
        Some(field)
    } else {
        find_path_mut(&mut field.children, rest)
    }
}

/// Data type of a field.
///
/// Covers message-schema types (Avro/Protobuf/JSON Schema) and search index
/// mapping types. Values this build does not know deserialize as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Record,
    Null,
    Boolean,
    Int,
    Long,
    Bytes,
    Float,
    Double,
    Timestamp,
    Date,
    Time,
    String,
    Array,
    Map,
    Enum,
    Union,
    Fixed,
    Text,
    Keyword,
    Object,
    Nested,
    #[serde(other)]
    Unknown,
}
