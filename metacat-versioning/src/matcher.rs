//! Field identity across versions.

use metacat_model::{EntityKind, Field};

/// Decides whether an original field and an updated field, taken from two
/// sibling lists, are the same logical field.
///
/// Implementations must be deterministic. Callers only guarantee name
/// uniqueness within one sibling list, never across the whole tree. A
/// matcher that pairs several updated siblings with one original is a
/// precondition violation; the diff then pairs each original at most once,
/// first match in sibling order wins.
pub trait FieldMatcher {
    fn matches(&self, original: &Field, updated: &Field) -> bool;
}

impl<F> FieldMatcher for F
where
    F: Fn(&Field, &Field) -> bool,
{
    fn matches(&self, original: &Field, updated: &Field) -> bool {
        self(original, updated)
    }
}

/// Built-in matching strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMatch {
    /// Case-insensitive (ASCII) name.
    Name,
    /// Name, and equal data type. A type change is a delete plus an add.
    NameAndType,
    /// Name, data type and ordinal position.
    NameTypeAndPosition,
}

impl FieldMatcher for FieldMatch {
    fn matches(&self, original: &Field, updated: &Field) -> bool {
        let same_name = original.name.eq_ignore_ascii_case(&updated.name);
        match self {
            Self::Name => same_name,
            Self::NameAndType => same_name && original.data_type == updated.data_type,
            Self::NameTypeAndPosition => {
                same_name
                    && original.data_type == updated.data_type
                    && original.ordinal_position == updated.ordinal_position
            }
        }
    }
}

/// The matching strategy each entity kind reconciles its tree with.
pub fn for_kind(kind: EntityKind) -> FieldMatch {
    match kind {
        EntityKind::Topic | EntityKind::SearchIndex => FieldMatch::NameAndType,
    }
}
