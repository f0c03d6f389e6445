use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod config;
pub mod db;

pub use db::{Column, Database, InMemoryDB};

/// Cloneable handle over an opened database.
///
/// Values are JSON-serialized text regardless of transport shape; the typed
/// helpers below are the only codec the annotation workload needs.
#[derive(Clone)]
pub struct Store {
    db: Arc<dyn Database>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    pub fn open<T: Database>(config: &config::StoreConfig) -> eyre::Result<Self> {
        let db = T::open(config)?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Volatile store for tests and the client's session-only fallback.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            db: Arc::new(InMemoryDB::default()),
        }
    }

    /// Wrap an already-constructed database.
    pub fn from_database(db: impl Database) -> Self {
        Self { db: Arc::new(db) }
    }

    pub fn has(&self, col: Column, key: &[u8]) -> eyre::Result<bool> {
        self.db.has(col, key)
    }

    pub fn get(&self, col: Column, key: &[u8]) -> eyre::Result<Option<Box<[u8]>>> {
        self.db.get(col, key)
    }

    pub fn put(&self, col: Column, key: &[u8], value: &[u8]) -> eyre::Result<()> {
        self.db.put(col, key, value)
    }

    pub fn delete(&self, col: Column, key: &[u8]) -> eyre::Result<()> {
        self.db.delete(col, key)
    }

    /// All entries in `col` whose key starts with `prefix`, in key order.
    pub fn scan_prefix(
        &self,
        col: Column,
        prefix: &[u8],
    ) -> eyre::Result<Vec<(Box<[u8]>, Box<[u8]>)>> {
        self.db.scan_prefix(col, prefix)
    }

    pub fn get_json<T: DeserializeOwned>(&self, col: Column, key: &[u8]) -> eyre::Result<Option<T>> {
        let Some(raw) = self.db.get(col, key)? else {
            return Ok(None);
        };

        Ok(Some(serde_json::from_slice(&raw)?))
    }

    pub fn put_json<T: Serialize>(&self, col: Column, key: &[u8], value: &T) -> eyre::Result<()> {
        let raw = serde_json::to_vec(value)?;

        self.db.put(col, key, &raw)
    }
}
