//! Sibling-list and tree diffing.

use crate::matcher::FieldMatcher;
use metacat_model::Field;
use metacat_types::fqn;

/// Partition of two sibling lists, by index.
///
/// Every updated index is in exactly one of `added` or `common`; every
/// original index in exactly one of `deleted` or `common`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiblingDiff {
    /// Indices into the updated list with no original counterpart.
    pub added: Vec<usize>,
    /// Indices into the original list with no updated counterpart.
    pub deleted: Vec<usize>,
    /// `(original, updated)` index pairs, in updated order.
    pub common: Vec<(usize, usize)>,
}

impl SiblingDiff {
    /// True when nothing was added or deleted.
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty()
    }
}

/// Partitions `original` and `updated` under `matches`.
///
/// Updated items are visited in order and each pairs with the first original
/// that matches and is not yet paired.
pub fn diff_siblings<T>(original: &[T], updated: &[T], matches: impl Fn(&T, &T) -> bool) -> SiblingDiff {
    let mut paired = vec![false; original.len()];
    let mut diff = SiblingDiff::default();

    for (u, item) in updated.iter().enumerate() {
        let found = original
            .iter()
            .enumerate()
            .find(|(o, candidate)| !paired[*o] && matches(candidate, item))
            .map(|(o, _)| o);
        match found {
            Some(o) => {
                paired[o] = true;
                diff.common.push((o, u));
            }
            None => diff.added.push(u),
        }
    }

    diff.deleted = paired
        .iter()
        .enumerate()
        .filter(|(_, p)| !**p)
        .map(|(o, _)| o)
        .collect();
    diff
}

/// Flat diff of two field trees, as local paths (`payload.x`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    pub added: Vec<String>,
    pub deleted: Vec<String>,
    pub common: Vec<String>,
}

impl TreeDiff {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty()
    }
}

/// Diffs two field trees, recursing into common pairs whose children are
/// non-empty on both sides.
pub fn diff_tree(original: &[Field], updated: &[Field], matcher: &dyn FieldMatcher) -> TreeDiff {
    let mut diff = TreeDiff::default();
    collect_tree_diff("", original, updated, matcher, &mut diff);
    diff
}

fn collect_tree_diff(
    prefix: &str,
    original: &[Field],
    updated: &[Field],
    matcher: &dyn FieldMatcher,
    out: &mut TreeDiff,
) {
    let siblings = diff_siblings(original, updated, |o, u| matcher.matches(o, u));

    out.added
        .extend(siblings.added.iter().map(|&u| fqn::add(prefix, &updated[u].name)));
    out.deleted
        .extend(siblings.deleted.iter().map(|&o| fqn::add(prefix, &original[o].name)));

    for &(o, u) in &siblings.common {
        let path = fqn::add(prefix, &updated[u].name);
        out.common.push(path.clone());
        if original[o].has_children() && updated[u].has_children() {
            collect_tree_diff(&path, &original[o].children, &updated[u].children, matcher, out);
        }
    }
}
