//! Testing utilities for the deptlog workspace
//!
//! Shared fixtures, in-memory provider setup, failure-injecting store
//! doubles and a recording fault reporter.

#![allow(missing_docs)]

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use deptlog_data::patch::{ActivityAnnouncePatch, AwardChannelPatch};
use deptlog_data::report::ErrorReporter;
use deptlog_data::store::{CacheStore, DocumentStore, MemoryCacheStore, MemoryDocumentStore};
use deptlog_data::{DataConfig, DataProvider, Environment, LockConfig, StoreError, StoreResult};
use deptlog_record::{GuildId, GuildRecord};

static LOGGING: Lazy<()> = Lazy::new(|| {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
});

pub fn init_test_logging() {
    Lazy::force(&LOGGING);
}

pub fn create_legacy_guild_doc(id: &str) -> Value {
    json!({
        "_id": id,
        "blacklist": { "status": false },
        "recentCommands": [],
        "config": {
            "ranks": ["Cadet", "Sergeant", "Lieutenant"],
            "commandRoles": ["2001", "2002"],
            "departmentCommandRoles": ["3001"],
            "departmentRole": "4001",
            "administrativeLeaveRole": "4002",
            "loaRole": "4003",
            "suspendedRole": "4004",
            "probationRole": "4005",
            "autoRole": true,
            "showAvatarOnActionMessages": false,
            "adminLeaveDM": true,
            "logChannel": "9001",
            "departmentIconURL": "https://icons.example/legacy.png",
            "adminLeaveContact": "IA_HC",
            "dischargeDisplay": "display"
        }
    })
}

pub fn create_guild_record(id: &str) -> GuildRecord {
    let mut record = GuildRecord::template(GuildId::new(id));
    record.mark_patched(AwardChannelPatch::NAME);
    record.mark_patched(ActivityAnnouncePatch::NAME);
    record
}

pub fn create_fast_lock_config() -> LockConfig {
    LockConfig::default()
        .with_retry_count(2)
        .with_retry_delay(Duration::from_millis(5))
        .with_retry_jitter(Duration::from_millis(2))
}

pub async fn setup_memory_provider() -> (
    Arc<DataProvider>,
    Arc<MemoryDocumentStore>,
    Arc<MemoryCacheStore>,
) {
    let documents = Arc::new(MemoryDocumentStore::new());
    let cache = Arc::new(MemoryCacheStore::new());
    let config = DataConfig::default().with_environment(Environment::Development);

    let provider = Arc::new(DataProvider::new(
        Arc::clone(&documents) as Arc<dyn DocumentStore>,
        Arc::clone(&cache) as Arc<dyn CacheStore>,
        config,
    ));
    provider.connect().await.unwrap();

    (provider, documents, cache)
}

pub async fn setup_reporting_provider(
    documents: Arc<dyn DocumentStore>,
    cache: Arc<dyn CacheStore>,
) -> (Arc<DataProvider>, Arc<RecordingReporter>) {
    let config = DataConfig::default().with_environment(Environment::Development);
    let reporter = Arc::new(RecordingReporter::default());

    let provider = Arc::new(DataProvider::with_reporter(
        documents,
        cache,
        config,
        Arc::clone(&reporter) as Arc<dyn ErrorReporter>,
    ));
    provider.connect().await.unwrap();

    (provider, reporter)
}

/// Captures every reported fault as `(context, message)` pairs.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<(String, String)>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<(String, String)> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, context: &str, error: &StoreError) {
        self.events
            .lock()
            .unwrap()
            .push((context.to_owned(), error.to_string()));
    }
}

fn injected_fault(kind: io::ErrorKind) -> StoreError {
    StoreError::unavailable(io::Error::new(kind, "injected fault"))
}

/// Document store whose reads and writes always fail once connected.
#[derive(Debug, Clone, Copy)]
pub struct FailingDocumentStore {
    kind: io::ErrorKind,
}

impl FailingDocumentStore {
    pub fn new() -> Self {
        Self {
            kind: io::ErrorKind::ConnectionRefused,
        }
    }

    pub fn transient() -> Self {
        Self {
            kind: io::ErrorKind::ConnectionReset,
        }
    }
}

impl Default for FailingDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for FailingDocumentStore {
    async fn connect(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_one(&self, _collection: &str, _id: &str) -> StoreResult<Option<Value>> {
        Err(injected_fault(self.kind))
    }

    async fn upsert(&self, _collection: &str, _id: &str, _doc: &Value) -> StoreResult<()> {
        Err(injected_fault(self.kind))
    }
}

/// Cache store whose every operation fails once connected.
#[derive(Debug, Clone, Copy)]
pub struct FailingCacheStore {
    kind: io::ErrorKind,
}

impl FailingCacheStore {
    pub fn new() -> Self {
        Self {
            kind: io::ErrorKind::ConnectionRefused,
        }
    }

    pub fn transient() -> Self {
        Self {
            kind: io::ErrorKind::ConnectionReset,
        }
    }
}

impl Default for FailingCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for FailingCacheStore {
    async fn connect(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(injected_fault(self.kind))
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> StoreResult<()> {
        Err(injected_fault(self.kind))
    }

    async fn set_nx_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> StoreResult<bool> {
        Err(injected_fault(self.kind))
    }

    async fn del(&self, _key: &str) -> StoreResult<()> {
        Err(injected_fault(self.kind))
    }

    async fn del_if_eq(&self, _key: &str, _expected: &str) -> StoreResult<bool> {
        Err(injected_fault(self.kind))
    }
}
