//! Versioning engine for schema-bearing catalog entities.
//!
//! Topics and search indexes own a recursive tree of fields. When a new
//! version of such an entity arrives, the engine reconciles its tree against
//! the stored one:
//!
//! - [`diff`] pairs fields sibling by sibling using a [`FieldMatcher`]
//! - [`carry_forward`] keeps documentation through renames and type changes
//!   and stops bots from overwriting human edits on full replacement
//! - [`EntityUpdater`] records every change, applies tag side effects and
//!   decides the next version: any field deletion is a major bump, anything
//!   else a minor one
//!
//! [`SchemaEntityRepository`] ties this to a [`metacat_storage::CatalogStore`];
//! [`CatalogService`] runs each operation in a single SQLite transaction.

pub mod carry_forward;
pub mod changes;
pub mod config;
pub mod diff;
mod error;
pub mod matcher;
pub mod repository;
mod service;
pub mod tags;
pub mod updater;

pub use changes::ChangeRecorder;
pub use config::CatalogConfig;
pub use diff::{SiblingDiff, TreeDiff, diff_siblings, diff_tree};
pub use error::{CatalogError, CatalogResult, ValidationError};
pub use matcher::{FieldMatch, FieldMatcher};
pub use repository::{FieldEdit, PutResult, SchemaEntityRepository, Updated};
pub use service::CatalogService;
pub use tags::{TagPropagator, TagRegistry};
pub use updater::{EntityUpdater, Operation, UpdateOutcome};
