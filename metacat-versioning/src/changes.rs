//! Change records for one update: scalar changes and list additions or
//! deletions, keyed by dotted change path.

use crate::CatalogResult;
use crate::diff::{SiblingDiff, diff_siblings};
use metacat_model::ChangeRecord;
use serde::Serialize;
use serde_json::Value;

/// Collects the change records of one update, in discovery order.
#[derive(Debug, Default)]
pub struct ChangeRecorder {
    records: Vec<ChangeRecord>,
}

impl ChangeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `old -> new` at `path` unless both serialize to the same
    /// value. Returns whether a record was added.
    pub fn record_change<T>(&mut self, path: &str, old: &T, new: &T) -> CatalogResult<bool>
    where
        T: Serialize + ?Sized,
    {
        let old = serde_json::to_value(old)?;
        let new = serde_json::to_value(new)?;
        Ok(self.push(ChangeRecord::classify(path, old, new)))
    }

    /// Partitions two lists under `matches` and records the additions and
    /// deletions as one record each.
    pub fn record_list_change<T, F>(
        &mut self,
        path: &str,
        original: &[T],
        updated: &[T],
        matches: F,
    ) -> CatalogResult<SiblingDiff>
    where
        T: Serialize,
        F: Fn(&T, &T) -> bool,
    {
        let diff = diff_siblings(original, updated, matches);
        self.record_list_diff(path, original, updated, &diff)?;
        Ok(diff)
    }

    /// Records an already computed partition.
    pub fn record_list_diff<T: Serialize>(
        &mut self,
        path: &str,
        original: &[T],
        updated: &[T],
        diff: &SiblingDiff,
    ) -> CatalogResult<()> {
        if !diff.added.is_empty() {
            let added: Vec<&T> = diff.added.iter().map(|&u| &updated[u]).collect();
            self.push(ChangeRecord::classify(path, Value::Null, serde_json::to_value(added)?));
        }
        if !diff.deleted.is_empty() {
            let deleted: Vec<&T> = diff.deleted.iter().map(|&o| &original[o]).collect();
            self.push(ChangeRecord::classify(path, serde_json::to_value(deleted)?, Value::Null));
        }
        Ok(())
    }

    fn push(&mut self, record: Option<ChangeRecord>) -> bool {
        match record {
            Some(record) => {
                self.records.push(record);
                true
            }
            None => false,
        }
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<ChangeRecord> {
        self.records
    }
}
