use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an update comes from a person or an automated agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    #[default]
    Human,
    /// Ingestion pipelines and other automation. Bot full-replace updates
    /// never overwrite non-empty human-authored text.
    Bot,
}

/// The principal performing an update.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub kind: ActorKind,
}

impl Actor {
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ActorKind::Human,
        }
    }

    pub fn bot(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ActorKind::Bot,
        }
    }

    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.kind == ActorKind::Bot
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
