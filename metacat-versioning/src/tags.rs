//! Tag derivation, validation and persistence for entities and field trees.

use crate::ValidationError;
use crate::config::CatalogConfig;
use metacat_model::{Field, LabelType, TagLabel, TagSource, merge_tags};
use metacat_storage::{CatalogStore, StorageResult};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// What the configured classifications and glossary say about tags.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    exclusive: HashSet<String>,
    related: HashMap<String, Vec<String>>,
}

impl TagRegistry {
    pub fn from_config(config: &CatalogConfig) -> Self {
        let exclusive = config
            .classifications
            .iter()
            .filter(|c| c.mutually_exclusive)
            .map(|c| c.name.clone())
            .collect();
        let related = config
            .glossary
            .iter()
            .map(|g| (g.term.clone(), g.related_tags.clone()))
            .collect();
        Self { exclusive, related }
    }

    pub fn is_mutually_exclusive(&self, parent_fqn: &str) -> bool {
        self.exclusive.contains(parent_fqn)
    }

    /// Classification tags implied by a glossary term tag.
    pub fn derived_tags(&self, tag: &TagLabel) -> Vec<TagLabel> {
        if tag.source != TagSource::Glossary {
            return Vec::new();
        }
        self.related
            .get(&tag.tag_fqn)
            .map(|related| {
                related
                    .iter()
                    .map(|fqn| TagLabel::classification(fqn).with_label_type(LabelType::Derived))
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub struct TagPropagator {
    registry: TagRegistry,
}

impl TagPropagator {
    pub fn new(registry: TagRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// `tags` plus every tag they imply, deduplicated and sorted by FQN.
    pub fn add_derived_tags(&self, tags: &[TagLabel]) -> Vec<TagLabel> {
        if tags.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(tags.len());
        merge_tags(&mut out, tags);
        for tag in tags {
            merge_tags(&mut out, &self.registry.derived_tags(tag));
        }
        out.sort_by(|a, b| a.tag_fqn.cmp(&b.tag_fqn));
        out
    }

    /// Replaces each field's tags with their derived superset, recursively.
    pub fn add_derived_field_tags(&self, fields: &mut [Field]) {
        for field in fields {
            field.visit_mut(&mut |f| f.tags = self.add_derived_tags(&f.tags));
        }
    }

    /// Fails when two tags on `target` share a mutually exclusive parent.
    pub fn check_mutually_exclusive(&self, target: &str, tags: &[TagLabel]) -> Result<(), ValidationError> {
        let mut seen: HashMap<String, &TagLabel> = HashMap::new();
        for tag in tags {
            let Some(parent) = tag.parent_fqn() else {
                continue;
            };
            if !self.registry.is_mutually_exclusive(&parent) {
                continue;
            }
            match seen.get(&parent) {
                Some(first) if !first.same_tag(tag) => {
                    return Err(ValidationError::MutuallyExclusiveTags {
                        target: target.to_string(),
                        first: first.tag_fqn.clone(),
                        second: tag.tag_fqn.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    seen.insert(parent, tag);
                }
            }
        }
        Ok(())
    }

    /// Checks mutual exclusivity on every field of the tree.
    pub fn validate_field_tags(&self, fields: &[Field]) -> Result<(), ValidationError> {
        for field in fields {
            self.check_mutually_exclusive(field.fqn(), &field.tags)?;
            self.validate_field_tags(&field.children)?;
        }
        Ok(())
    }

    pub fn apply_tags(&self, store: &dyn CatalogStore, tags: &[TagLabel], target_fqn: &str) -> StorageResult<()> {
        for tag in tags {
            store.apply_tag(tag, target_fqn)?;
        }
        Ok(())
    }

    /// Persists the tags of every field in the tree under the field's FQN.
    pub fn apply_field_tags(&self, store: &dyn CatalogStore, fields: &[Field]) -> StorageResult<()> {
        for field in fields {
            self.apply_tags(store, &field.tags, field.fqn())?;
            self.apply_field_tags(store, &field.children)?;
        }
        Ok(())
    }

    /// Reattaches stored tags to every field of a loaded tree.
    pub fn populate_field_tags(&self, store: &dyn CatalogStore, fields: &mut [Field]) -> StorageResult<()> {
        for field in fields {
            field.tags = store.tags_for(field.fqn())?;
            self.populate_field_tags(store, &mut field.children)?;
        }
        Ok(())
    }

    /// Removes the tag associations of a field and all its descendants.
    pub fn purge_field_tags(&self, store: &dyn CatalogStore, field: &Field) -> StorageResult<()> {
        store.remove_tags_for(field.fqn())?;
        for child in &field.children {
            self.purge_field_tags(store, child)?;
        }
        Ok(())
    }

    /// Replaces the associations stored under `stored_fqn` with `tags` under
    /// `target_fqn`.
    pub fn sync_tags(
        &self,
        store: &dyn CatalogStore,
        stored_fqn: &str,
        target_fqn: &str,
        tags: &[TagLabel],
    ) -> StorageResult<()> {
        store.remove_tags_for(stored_fqn)?;
        if stored_fqn != target_fqn {
            store.remove_tags_for(target_fqn)?;
        }
        self.apply_tags(store, tags, target_fqn)?;
        debug!("Synced {} tags onto {}", tags.len(), target_fqn);
        Ok(())
    }
}
