//! Sled-backed durable document store
//!
//! Embedded single-process persistence: one sled tree per collection,
//! documents stored as JSON bytes, flushed after every upsert so an
//! acknowledged write survives a crash.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use super::DocumentStore;
use crate::error::{StoreError, StoreResult};

/// Durable document store over an embedded sled database.
#[derive(Debug, Clone)]
pub struct SledDocumentStore {
    db: sled::Db,
}

impl SledDocumentStore {
    /// Open or create the database at `path`.
    ///
    /// # Errors
    /// Returns an error when the database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    fn tree(&self, collection: &str) -> StoreResult<sled::Tree> {
        Ok(self.db.open_tree(collection)?)
    }
}

#[async_trait]
impl DocumentStore for SledDocumentStore {
    async fn connect(&self) -> StoreResult<()> {
        // opening already established the handle; probe that it answers
        self.db.size_on_disk().map_err(StoreError::from)?;
        Ok(())
    }

    async fn find_one(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let tree = self.tree(collection)?;
        match tree.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, collection: &str, id: &str, doc: &Value) -> StoreResult<()> {
        let tree = self.tree(collection)?;
        let bytes = serde_json::to_vec(doc)?;
        tree.insert(id.as_bytes(), bytes)?;
        tree.flush_async().await?;
        Ok(())
    }
}
