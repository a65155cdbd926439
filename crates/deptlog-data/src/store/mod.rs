//! Backend store seams
//!
//! Two narrow async traits separate the data layer from its backends:
//! - [`DocumentStore`]: durable documents keyed by collection and id
//! - [`CacheStore`]: volatile keys with per-key TTLs, plus the two atomic
//!   primitives (`set_nx_ex`, `del_if_eq`) the lock manager is built on
//!
//! All record, lock and lifecycle logic is written purely against these
//! traits; a networked backend shared across processes plugs in here without
//! touching anything above.

pub mod memory;
pub mod sled;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreResult;

/// Durable document store, one JSON document per (collection, id).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Establish the backend connection. Idempotent once successful.
    async fn connect(&self) -> StoreResult<()>;

    /// Load one document, `None` when absent.
    async fn find_one(&self, collection: &str, id: &str) -> StoreResult<Option<Value>>;

    /// Create or replace one whole document atomically.
    async fn upsert(&self, collection: &str, id: &str, doc: &Value) -> StoreResult<()>;
}

/// Volatile key-value cache with per-key expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Establish the backend connection. Idempotent once successful.
    async fn connect(&self) -> StoreResult<()>;

    /// Read a key, `None` when absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a key with a TTL, replacing any existing value.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Atomically write a key with a TTL only when it is absent (or
    /// expired). Returns true when this call created the key.
    async fn set_nx_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool>;

    /// Drop a key. Absent keys are a no-op.
    async fn del(&self, key: &str) -> StoreResult<()>;

    /// Atomically drop a key only while it still holds `expected`.
    /// Returns true when the key was removed by this call.
    async fn del_if_eq(&self, key: &str, expected: &str) -> StoreResult<bool>;
}

pub use self::memory::{MemoryCacheStore, MemoryDocumentStore};
pub use self::sled::SledDocumentStore;
