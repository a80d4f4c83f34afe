//! Catalog configuration, read from a TOML file.
//!
//! ```toml
//! [[classifications]]
//! name = "PII"
//! mutually_exclusive = true
//!
//! [[glossary]]
//! term = "Business.Customer"
//! related_tags = ["PII.Sensitive"]
//!
//! [actors]
//! bots = ["ingestion-bot"]
//! ```

use crate::CatalogResult;
use metacat_types::Actor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// A classification (or glossary) that tags are grouped under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationConfig {
    pub name: String,
    /// At most one tag of this classification per entity or field.
    #[serde(default)]
    pub mutually_exclusive: bool,
}

/// A glossary term and the classification tags it implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryTermConfig {
    pub term: String,
    #[serde(default)]
    pub related_tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Principals treated as automated agents.
    #[serde(default = "default_bots")]
    pub bots: Vec<String>,
}

fn default_bots() -> Vec<String> {
    vec!["ingestion-bot".to_string()]
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            bots: default_bots(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub classifications: Vec<ClassificationConfig>,
    #[serde(default)]
    pub glossary: Vec<GlossaryTermConfig>,
    #[serde(default)]
    pub actors: ActorConfig,
}

impl CatalogConfig {
    /// Parses a config document, failing on malformed input.
    pub fn from_toml_str(contents: &str) -> CatalogResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads config from `path`. A missing file yields the defaults; an
    /// unreadable or malformed file yields the defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No catalog config at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!(
                        "Loaded catalog config from {:?} ({} classifications, {} glossary terms)",
                        path,
                        config.classifications.len(),
                        config.glossary.len()
                    );
                    config
                }
                Err(e) => {
                    warn!("Failed to parse catalog config {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read catalog config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Resolves a principal name to an actor, marking configured bots.
    pub fn actor(&self, name: &str) -> Actor {
        if self.actors.bots.iter().any(|b| b == name) {
            Actor::bot(name)
        } else {
            Actor::human(name)
        }
    }
}
