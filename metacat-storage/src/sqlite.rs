//! SQLite-backed [`CatalogStore`].

use crate::{CatalogStore, StorageError, StorageResult};
use metacat_model::{EntityKind, SchemaEntity, ServiceRef, TagLabel};
use metacat_types::{EntityId, EntityKey, EntityVersion};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use tracing::{debug, info};

const CONTAINS: &str = "contains";

/// Catalog database. Owns the connection; callers run every multi-row write
/// through [`transaction`](Self::transaction).
#[derive(Debug)]
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Opens (or creates) a catalog database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        info!("Opened catalog database at {}", path.display());
        Ok(Self { conn })
    }

    /// Opens an in-memory catalog (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Read access outside a transaction.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Runs `f` inside one transaction. Commits when `f` returns `Ok`; any
    /// error drops the transaction, which rolls every write back.
    pub fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<StorageError>,
    {
        let tx = self.conn.transaction().map_err(StorageError::from)?;
        let value = f(&*tx)?;
        tx.commit().map_err(StorageError::from)?;
        Ok(value)
    }
}

fn init_schema(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS entities (
            id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            fqn TEXT NOT NULL,
            version TEXT NOT NULL,
            json TEXT NOT NULL,
            UNIQUE(kind, fqn)
        );

        CREATE TABLE IF NOT EXISTS entity_versions (
            entity_id TEXT NOT NULL,
            version TEXT NOT NULL,
            json TEXT NOT NULL,
            UNIQUE(entity_id, version)
        );

        CREATE TABLE IF NOT EXISTS tag_usage (
            target_fqn TEXT NOT NULL,
            tag_fqn TEXT NOT NULL,
            source TEXT NOT NULL,
            label TEXT NOT NULL,
            UNIQUE(target_fqn, tag_fqn, source)
        );

        CREATE TABLE IF NOT EXISTS relationships (
            from_id TEXT NOT NULL,
            to_id TEXT NOT NULL,
            relation TEXT NOT NULL,
            from_json TEXT NOT NULL,
            UNIQUE(from_id, to_id, relation)
        );
        ",
    )?;
    Ok(())
}

fn decode_entity(json: String) -> StorageResult<SchemaEntity> {
    Ok(serde_json::from_str(&json)?)
}

impl CatalogStore for Connection {
    fn load_entity(&self, kind: EntityKind, key: &EntityKey) -> StorageResult<Option<SchemaEntity>> {
        let json: Option<String> = match key {
            EntityKey::Id(id) => self
                .query_row(
                    "SELECT json FROM entities WHERE kind = ?1 AND id = ?2",
                    params![kind.as_str(), id.to_string()],
                    |row| row.get(0),
                )
                .optional()?,
            EntityKey::Name(fqn) => self
                .query_row(
                    "SELECT json FROM entities WHERE kind = ?1 AND fqn = ?2",
                    params![kind.as_str(), fqn],
                    |row| row.get(0),
                )
                .optional()?,
        };
        json.map(decode_entity).transpose()
    }

    fn persist_entity(&self, entity: &SchemaEntity, update: bool) -> StorageResult<()> {
        let json = serde_json::to_string(entity)?;
        if update {
            let rows = self.execute(
                "UPDATE entities SET fqn = ?2, version = ?3, json = ?4 WHERE id = ?1",
                params![
                    entity.id.to_string(),
                    entity.fully_qualified_name,
                    entity.version.to_string(),
                    json,
                ],
            )?;
            if rows == 0 {
                return Err(StorageError::InvalidData(format!(
                    "no stored {} with id {}",
                    entity.kind, entity.id
                )));
            }
        } else {
            self.execute(
                "INSERT INTO entities (id, kind, fqn, version, json) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entity.id.to_string(),
                    entity.kind.as_str(),
                    entity.fully_qualified_name,
                    entity.version.to_string(),
                    json,
                ],
            )?;
        }
        debug!(
            "Persisted {} {} at version {}",
            entity.kind, entity.fully_qualified_name, entity.version
        );
        Ok(())
    }

    fn store_version(&self, entity: &SchemaEntity) -> StorageResult<()> {
        self.execute(
            "INSERT OR REPLACE INTO entity_versions (entity_id, version, json) VALUES (?1, ?2, ?3)",
            params![
                entity.id.to_string(),
                entity.version.to_string(),
                serde_json::to_string(entity)?,
            ],
        )?;
        Ok(())
    }

    fn load_version(&self, id: &EntityId, version: EntityVersion) -> StorageResult<Option<SchemaEntity>> {
        let json: Option<String> = self
            .query_row(
                "SELECT json FROM entity_versions WHERE entity_id = ?1 AND version = ?2",
                params![id.to_string(), version.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        json.map(decode_entity).transpose()
    }

    fn add_relationship(&self, service: &ServiceRef, entity_id: &EntityId) -> StorageResult<()> {
        // An entity has exactly one container.
        self.execute(
            "DELETE FROM relationships WHERE to_id = ?1 AND relation = ?2",
            params![entity_id.to_string(), CONTAINS],
        )?;
        self.execute(
            "INSERT OR REPLACE INTO relationships (from_id, to_id, relation, from_json) VALUES (?1, ?2, ?3, ?4)",
            params![
                service.id.to_string(),
                entity_id.to_string(),
                CONTAINS,
                serde_json::to_string(service)?,
            ],
        )?;
        Ok(())
    }

    fn container_of(&self, entity_id: &EntityId) -> StorageResult<Option<ServiceRef>> {
        let json: Option<String> = self
            .query_row(
                "SELECT from_json FROM relationships WHERE to_id = ?1 AND relation = ?2",
                params![entity_id.to_string(), CONTAINS],
                |row| row.get(0),
            )
            .optional()?;
        Ok(json.map(|j| serde_json::from_str(&j)).transpose()?)
    }

    fn tags_for(&self, target_fqn: &str) -> StorageResult<Vec<TagLabel>> {
        let mut stmt = self.prepare(
            "SELECT label FROM tag_usage WHERE target_fqn = ?1 ORDER BY tag_fqn, source",
        )?;
        let rows = stmt.query_map(params![target_fqn], |row| row.get::<_, String>(0))?;

        let mut tags = Vec::new();
        for row in rows {
            tags.push(serde_json::from_str(&row?)?);
        }
        Ok(tags)
    }

    fn apply_tag(&self, tag: &TagLabel, target_fqn: &str) -> StorageResult<()> {
        let source = serde_json::to_value(tag.source)?;
        let source = source
            .as_str()
            .ok_or_else(|| StorageError::InvalidData(format!("tag source of {}", tag.tag_fqn)))?
            .to_string();
        self.execute(
            "INSERT OR REPLACE INTO tag_usage (target_fqn, tag_fqn, source, label) VALUES (?1, ?2, ?3, ?4)",
            params![target_fqn, tag.tag_fqn, source, serde_json::to_string(tag)?],
        )?;
        Ok(())
    }

    fn remove_tags_for(&self, target_fqn: &str) -> StorageResult<()> {
        let removed = self.execute(
            "DELETE FROM tag_usage WHERE target_fqn = ?1",
            params![target_fqn],
        )?;
        if removed > 0 {
            debug!("Removed {} tag associations for {}", removed, target_fqn);
        }
        Ok(())
    }
}
