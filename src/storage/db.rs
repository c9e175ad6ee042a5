//! Database persistence layer using Sled
//!
//! [`Database`] exposes get/put/del, atomic batches and prefix iteration over
//! byte keys and values. [`DbRegistry`] opens each database file once per
//! process; the node builds one at startup and hands it to every consumer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::StorageError;
use crate::config::{Config, Network, StorageConfig};

/// Database wrapper
#[derive(Debug, Clone)]
pub struct Database {
    db: sled::Db,
}

/// Writes applied together by [`Database::batch`]
#[derive(Debug, Default)]
pub struct WriteBatch {
    inner: sled::Batch,
    len: usize,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.inner.insert(key, value);
        self.len += 1;
    }

    pub fn del(&mut self, key: &[u8]) {
        self.inner.remove(key);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Database {
    /// Open or create the database at `path`
    pub fn open<P: AsRef<Path>>(path: P, options: &StorageConfig) -> Result<Self, StorageError> {
        let db = sled::Config::new()
            .path(path.as_ref())
            .cache_capacity(options.cache_size)
            .flush_every_ms(options.flush_every_ms)
            .open()?;
        tracing::info!(path = %path.as_ref().display(), "database opened");
        Ok(Self { db })
    }

    /// In-memory database removed when the last handle drops
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.db.get(key)?.map(|value| value.to_vec()))
    }

    pub fn contains(&self, key: &[u8]) -> Result<bool, StorageError> {
        Ok(self.db.contains_key(key)?)
    }

    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.db.insert(key, value)?;
        Ok(())
    }

    /// Remove a key, reporting whether it existed
    pub fn del(&self, key: &[u8]) -> Result<bool, StorageError> {
        Ok(self.db.remove(key)?.is_some())
    }

    /// Apply all writes atomically
    pub fn batch(&self, batch: WriteBatch) -> Result<(), StorageError> {
        self.db.apply_batch(batch.inner)?;
        Ok(())
    }

    /// Key/value pairs whose key starts with `prefix`, in key order
    pub fn iter(
        &self,
        prefix: &[u8],
    ) -> impl Iterator<Item = Result<(Vec<u8>, Vec<u8>), StorageError>> {
        self.db.scan_prefix(prefix).map(|item| -> Result<_, StorageError> {
            let (key, value) = item?;
            Ok((key.to_vec(), value.to_vec()))
        })
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

/// Process-wide set of open databases, keyed by file path
#[derive(Debug)]
pub struct DbRegistry {
    network: Network,
    options: StorageConfig,
    open: Mutex<HashMap<PathBuf, Database>>,
}

impl DbRegistry {
    pub fn new(config: &Config) -> Self {
        Self {
            network: config.network,
            options: config.storage.clone(),
            open: Mutex::new(HashMap::new()),
        }
    }

    /// File backing the database called `name`: `<prefix>/<name>-<network>.db`
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.options
            .prefix
            .join(format!("{}-{}.db", name, self.network))
    }

    /// Open `name`, or return the handle opened earlier
    pub fn open(&self, name: &str) -> Result<Database, StorageError> {
        let path = self.path_for(name);
        let mut open = self.open.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(db) = open.get(&path) {
            return Ok(db.clone());
        }

        std::fs::create_dir_all(&self.options.prefix)?;
        let db = Database::open(&path, &self.options)?;
        open.insert(path, db.clone());
        Ok(db)
    }

    /// Flush and forget `name`; the file closes once every handle is dropped
    pub fn close(&self, name: &str) -> Result<bool, StorageError> {
        let path = self.path_for(name);
        let removed = self
            .open
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&path);

        match removed {
            Some(db) => {
                db.flush()?;
                tracing::info!(path = %path.display(), "database closed");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.open
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&self.path_for(name))
    }
}
