//! SQLite dedup store implementation
//!
//! One shared rusqlite connection guarded by a mutex: the operator
//! command path and the feed event path can both reach the store, and
//! serializing writes through a single lock keeps readers from ever
//! observing a partially written record.

use crate::error::Result;
use crate::storage::ClassificationStore;
use crate::types::{Classification, Identity};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cards (
    identity BLOB PRIMARY KEY,
    classification INTEGER NOT NULL
)";

/// SQLite-backed dedup store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at `path` and ensure the schema
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening card store at {}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute(SCHEMA, [])?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl ClassificationStore for SqliteStore {
    async fn lookup(&self, identity: &Identity) -> Result<Option<Classification>> {
        let conn = self.conn.lock().await;
        let code: Option<i64> = conn
            .query_row(
                "SELECT classification FROM cards WHERE identity = ?1",
                params![identity.as_bytes()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(code.and_then(Classification::from_code))
    }

    async fn upsert(&self, identity: &Identity, classification: Classification) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO cards (identity, classification) VALUES (?1, ?2)",
            params![identity.as_bytes(), classification.code()],
        )?;

        debug!("Persisted {} for {}", classification, identity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_absent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = Identity::of("never seen");
        assert_eq!(store.lookup(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_upsert_and_lookup() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = Identity::of("a card");

        store.upsert(&id, Classification::Missed).await.unwrap();
        assert_eq!(
            store.lookup(&id).await.unwrap(),
            Some(Classification::Missed)
        );
    }

    #[tokio::test]
    async fn test_upsert_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = Identity::of("a card");

        store.upsert(&id, Classification::Missed).await.unwrap();
        store.upsert(&id, Classification::Missed).await.unwrap();
        assert_eq!(
            store.lookup(&id).await.unwrap(),
            Some(Classification::Missed)
        );
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = Identity::of("a card");

        store.upsert(&id, Classification::Missed).await.unwrap();
        store.upsert(&id, Classification::Liking).await.unwrap();
        assert_eq!(
            store.lookup(&id).await.unwrap(),
            Some(Classification::Liking)
        );
    }
}
