//! Reconciles an incoming field tree against the stored one.
//!
//! The pass is pure with respect to storage: it edits the updated tree in
//! place (carried-forward metadata), records changes, and reports which
//! fields were added or deleted and which tag sets need re-syncing. The
//! updater applies those side effects afterwards.

use crate::CatalogResult;
use crate::changes::ChangeRecorder;
use crate::diff::diff_siblings;
use crate::matcher::FieldMatcher;
use crate::updater::Operation;
use metacat_model::{Field, TagLabel, has_text};
use metacat_types::{Actor, fqn};

/// A field whose tag set changed (or moved to a new FQN).
#[derive(Debug, Clone, PartialEq)]
pub struct TagSync {
    pub stored_fqn: String,
    pub target_fqn: String,
    pub tags: Vec<TagLabel>,
}

/// Outcome of reconciling a field tree.
#[derive(Debug, Default)]
pub struct FieldTreeChanges {
    /// Added fields, after carry-forward.
    pub added: Vec<Field>,
    pub deleted: Vec<Field>,
    pub tag_syncs: Vec<TagSync>,
}

pub struct CarryForward<'a> {
    pub operation: Operation,
    pub actor: &'a Actor,
    pub matcher: &'a dyn FieldMatcher,
}

impl CarryForward<'_> {
    /// Reconciles one sibling level at change path `path`, recursing into
    /// common pairs that both have children. When only one side of a pair
    /// has children, that whole child list is added or deleted.
    pub fn reconcile(
        &self,
        recorder: &mut ChangeRecorder,
        path: &str,
        stored: &[Field],
        updated: &mut [Field],
        out: &mut FieldTreeChanges,
    ) -> CatalogResult<()> {
        let diff = diff_siblings(stored, updated, |o, u| self.matcher.matches(o, u));

        // A field whose type changed is deleted and re-added under the same
        // name; keep the documentation it had.
        for &d in &diff.deleted {
            let deleted = &stored[d];
            let Some(&a) = diff.added.iter().find(|&&a| updated[a].name == deleted.name) else {
                continue;
            };
            let added = &mut updated[a];
            if !has_text(&added.description) && has_text(&deleted.description) {
                added.description = deleted.description.clone();
            }
            if added.tags.is_empty() && !deleted.tags.is_empty() {
                added.tags = deleted.tags.clone();
            }
        }

        recorder.record_list_diff(path, stored, updated, &diff)?;
        out.deleted.extend(diff.deleted.iter().map(|&d| stored[d].clone()));
        out.added.extend(diff.added.iter().map(|&a| updated[a].clone()));

        for &(s, u) in &diff.common {
            let stored_field = &stored[s];
            let updated_field = &mut updated[u];
            let field_path = fqn::add(path, &updated_field.name);

            self.carry_text(
                recorder,
                &fqn::add(&field_path, "description"),
                &stored_field.description,
                &mut updated_field.description,
            )?;
            self.carry_text(
                recorder,
                &fqn::add(&field_path, "dataTypeDisplay"),
                &stored_field.data_type_display,
                &mut updated_field.data_type_display,
            )?;
            self.carry_text(
                recorder,
                &fqn::add(&field_path, "displayName"),
                &stored_field.display_name,
                &mut updated_field.display_name,
            )?;

            let tags = recorder.record_list_change(
                &fqn::add(&field_path, "tags"),
                &stored_field.tags,
                &updated_field.tags,
                TagLabel::same_tag,
            )?;
            if !tags.is_unchanged() || stored_field.fqn() != updated_field.fqn() {
                out.tag_syncs.push(TagSync {
                    stored_fqn: stored_field.fqn().to_string(),
                    target_fqn: updated_field.fqn().to_string(),
                    tags: updated_field.tags.clone(),
                });
            }

            match (stored_field.has_children(), updated_field.has_children()) {
                (true, true) => self.reconcile(
                    recorder,
                    &field_path,
                    &stored_field.children,
                    &mut updated_field.children,
                    out,
                )?,
                (true, false) => {
                    record_subtree(recorder, &field_path, &stored_field.children, &[])?;
                    out.deleted.extend(stored_field.children.iter().cloned());
                }
                (false, true) => {
                    record_subtree(recorder, &field_path, &[], &updated_field.children)?;
                    out.added.extend(updated_field.children.iter().cloned());
                }
                (false, false) => {}
            }
        }
        Ok(())
    }

    fn carry_text(
        &self,
        recorder: &mut ChangeRecorder,
        path: &str,
        stored: &Option<String>,
        updated: &mut Option<String>,
    ) -> CatalogResult<()> {
        carry_text(self.operation, self.actor, recorder, path, stored, updated)
    }
}

/// A child list that appeared or vanished as a whole. One side is empty, so
/// no matching is needed.
fn record_subtree(recorder: &mut ChangeRecorder, path: &str, stored: &[Field], updated: &[Field]) -> CatalogResult<()> {
    recorder.record_list_change(path, stored, updated, |_: &Field, _: &Field| false)?;
    Ok(())
}

/// Applies the bot rule to one optional text attribute: a full replace by a
/// bot never overwrites a non-empty stored value. Otherwise the change is
/// recorded.
pub fn carry_text(
    operation: Operation,
    actor: &Actor,
    recorder: &mut ChangeRecorder,
    path: &str,
    stored: &Option<String>,
    updated: &mut Option<String>,
) -> CatalogResult<()> {
    if operation == Operation::Put && actor.is_bot() && has_text(stored) {
        updated.clone_from(stored);
        return Ok(());
    }
    recorder.record_change(path, stored, &*updated)?;
    Ok(())
}
