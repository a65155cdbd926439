//! In-memory backends
//!
//! Process-local implementations of both store traits, used by the test
//! harness and as a standalone single-process deployment. Cache entries
//! carry a deadline and are dropped lazily on access, so TTL semantics hold
//! without a background sweeper. The insert-if-absent and
//! compare-and-delete primitives are atomic through the map's entry API.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;

use super::{CacheStore, DocumentStore};
use crate::error::{StoreError, StoreResult};

/// Durable-store stand-in holding documents in memory.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    connected: AtomicBool,
    documents: DashMap<(String, String), Value>,
}

impl MemoryDocumentStore {
    /// Empty store, not yet connected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents across all collections.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    fn ensure_connected(&self) -> StoreResult<()> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::NotConnected)
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn connect(&self) -> StoreResult<()> {
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    async fn find_one(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        self.ensure_connected()?;
        Ok(self
            .documents
            .get(&(collection.to_owned(), id.to_owned()))
            .map(|doc| doc.clone()))
    }

    async fn upsert(&self, collection: &str, id: &str, doc: &Value) -> StoreResult<()> {
        self.ensure_connected()?;
        self.documents
            .insert((collection.to_owned(), id.to_owned()), doc.clone());
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: &str, ttl: Duration) -> Self {
        Self {
            value: value.to_owned(),
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Cache-store stand-in holding expiring keys in memory.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    connected: AtomicBool,
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCacheStore {
    /// Empty cache, not yet connected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_connected(&self) -> StoreResult<()> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::NotConnected)
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn connect(&self) -> StoreResult<()> {
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.ensure_connected()?;
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(Instant::now()) {
                return Ok(Some(entry.value.clone()));
            }
        }
        self.entries
            .remove_if(key, |_, entry| entry.is_expired(Instant::now()));
        Ok(None)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.ensure_connected()?;
        self.entries
            .insert(key.to_owned(), CacheEntry::new(value, ttl));
        Ok(())
    }

    async fn set_nx_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool> {
        self.ensure_connected()?;
        match self.entries.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(Instant::now()) {
                    occupied.insert(CacheEntry::new(value, ttl));
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CacheEntry::new(value, ttl));
                Ok(true)
            }
        }
    }

    async fn del(&self, key: &str) -> StoreResult<()> {
        self.ensure_connected()?;
        self.entries.remove(key);
        Ok(())
    }

    async fn del_if_eq(&self, key: &str, expected: &str) -> StoreResult<bool> {
        self.ensure_connected()?;
        let removed = self
            .entries
            .remove_if(key, |_, entry| {
                !entry.is_expired(Instant::now()) && entry.value == expected
            })
            .is_some();
        Ok(removed)
    }
}
