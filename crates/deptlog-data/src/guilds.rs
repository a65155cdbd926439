//! Guild record store
//!
//! Read-through/write-through access to guild records:
//! - `fetch` is cache-first with a durable fallback; every load path
//!   normalizes (migrate if legacy, default-merge, patch, stamp the id)
//!   before anything is returned
//! - `update` writes the durable store and the cache together and only
//!   reports success when both acknowledged
//!
//! Malformed payloads are never fetch errors: a bad cache entry falls back
//! to the durable store (and is dropped), a bad durable document defaults to
//! the template. Only durable-store I/O faults fail a fetch.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use deptlog_record::{GuildId, GuildRecord};

use crate::error::{DataResult, StoreError};
use crate::keys::Keyspace;
use crate::migrate;
use crate::patch::PatchPipeline;
use crate::report::{self, ErrorReporter};
use crate::store::{CacheStore, DocumentStore};

/// Cached, migrated, patched access to guild records.
pub struct GuildStore {
    documents: Arc<dyn DocumentStore>,
    cache: Arc<dyn CacheStore>,
    keyspace: Keyspace,
    pipeline: PatchPipeline,
    reporter: Arc<dyn ErrorReporter>,
    cache_ttl: Duration,
}

impl GuildStore {
    /// Store over the given backends, running the standard patch pipeline.
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        cache: Arc<dyn CacheStore>,
        keyspace: Keyspace,
        reporter: Arc<dyn ErrorReporter>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            documents,
            cache,
            keyspace,
            pipeline: PatchPipeline::standard(),
            reporter,
            cache_ttl,
        }
    }

    /// Replace the patch pipeline (tests and tooling).
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: PatchPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Load one guild's record, cache first.
    ///
    /// An unseen guild receives the default template tagged with its id;
    /// nothing is persisted until the first `update`. The returned record
    /// always has the current version, a fully populated config and every
    /// standard patch applied.
    ///
    /// # Errors
    /// Only durable-store faults fail a fetch; cache faults and malformed
    /// payloads fall through to the durable store or the template.
    pub async fn fetch(&self, id: &GuildId) -> DataResult<GuildRecord> {
        let key = self.keyspace.guild_cache_key(id);

        match self.cache.get(&key).await {
            Ok(Some(payload)) => {
                if let Some(record) = self.decode_cached(&payload, id) {
                    return Ok(record);
                }
                // bad entry: drop it and let the durable store answer
                if let Err(error) = self.cache.del(&key).await {
                    warn!(guild = %id, %error, "failed to drop malformed cache entry");
                }
            }
            Ok(None) => {}
            Err(error) => {
                report::report_fault(self.reporter.as_ref(), "guilds.fetch.cache", &error);
            }
        }

        let doc = match self
            .documents
            .find_one(self.keyspace.guilds_collection(), id.as_str())
            .await
        {
            Ok(doc) => doc,
            Err(error) => {
                report::report_fault(self.reporter.as_ref(), "guilds.fetch.documents", &error);
                return Err(error.into());
            }
        };

        match doc {
            None => {
                debug!(guild = %id, "no stored record, synthesizing template");
                let mut record = GuildRecord::template(id.clone());
                self.pipeline.run(&mut record);
                Ok(record)
            }
            Some(doc) => {
                let record = match self.normalize(&doc, id) {
                    Some(record) => record,
                    None => {
                        warn!(guild = %id, "undecodable stored record, defaulting to template");
                        let mut record = GuildRecord::template(id.clone());
                        self.pipeline.run(&mut record);
                        return Ok(record);
                    }
                };
                self.populate_cache(&key, id, &record).await;
                Ok(record)
            }
        }
    }

    /// Write one guild's record to the durable store and the cache.
    ///
    /// The two writes run together and both must acknowledge; there is no
    /// rollback of the surviving write when the other fails — the next
    /// `fetch` reconciles, preferring the cache while its entry lives.
    ///
    /// # Errors
    /// The first failing write, after reporting every failure.
    pub async fn update(&self, id: &GuildId, record: &GuildRecord) -> DataResult<()> {
        let key = self.keyspace.guild_cache_key(id);

        let mut doc = record.clone();
        doc.id = id.clone();
        let value = serde_json::to_value(&doc).map_err(StoreError::from)?;
        let payload = value.to_string();

        let (durable, cached) = tokio::join!(
            self.documents
                .upsert(self.keyspace.guilds_collection(), id.as_str(), &value),
            self.cache.set_ex(&key, &payload, self.cache_ttl),
        );

        let mut first = None;
        if let Err(error) = durable {
            report::report_fault(self.reporter.as_ref(), "guilds.update.documents", &error);
            first = Some(error);
        }
        if let Err(error) = cached {
            report::report_fault(self.reporter.as_ref(), "guilds.update.cache", &error);
            first = first.or(Some(error));
        }

        match first {
            Some(error) => Err(error.into()),
            None => {
                debug!(guild = %id, "guild record updated");
                Ok(())
            }
        }
    }

    /// Parse and normalize a cached payload; `None` marks it malformed.
    fn decode_cached(&self, payload: &str, id: &GuildId) -> Option<GuildRecord> {
        let doc: Value = match serde_json::from_str(payload) {
            Ok(doc) => doc,
            Err(error) => {
                warn!(guild = %id, %error, "cache entry is not JSON");
                return None;
            }
        };
        self.normalize(&doc, id)
    }

    /// Migrate/default-merge/patch a raw document and stamp the requested
    /// id; `None` when the document cannot be decoded.
    fn normalize(&self, doc: &Value, id: &GuildId) -> Option<GuildRecord> {
        if !doc.is_object() {
            warn!(guild = %id, "record is not a JSON object");
            return None;
        }
        let mut record = if migrate::needs_migration(doc) {
            migrate::migrate(doc)
        } else {
            match GuildRecord::from_partial(doc) {
                Ok(record) => record,
                Err(error) => {
                    warn!(guild = %id, %error, "record failed to decode");
                    return None;
                }
            }
        };
        record.id = id.clone();
        self.pipeline.run(&mut record);
        Some(record)
    }

    /// Best effort: a failed populate never fails the fetch that loaded the
    /// record from durable storage.
    async fn populate_cache(&self, key: &str, id: &GuildId, record: &GuildRecord) {
        let payload = match serde_json::to_string(record) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(guild = %id, %error, "failed to encode record for caching");
                return;
            }
        };
        if let Err(error) = self.cache.set_ex(key, &payload, self.cache_ttl).await {
            report::report_fault(self.reporter.as_ref(), "guilds.fetch.populate", &error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Environment;
    use crate::patch::{ActivityAnnouncePatch, AwardChannelPatch};
    use crate::report::TracingReporter;
    use crate::store::{MemoryCacheStore, MemoryDocumentStore};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const HOUR: Duration = Duration::from_secs(3600);

    struct Harness {
        documents: Arc<MemoryDocumentStore>,
        cache: Arc<MemoryCacheStore>,
        keyspace: Keyspace,
        store: GuildStore,
    }

    async fn harness() -> Harness {
        let documents = Arc::new(MemoryDocumentStore::new());
        let cache = Arc::new(MemoryCacheStore::new());
        documents.connect().await.unwrap();
        cache.connect().await.unwrap();

        let keyspace = Keyspace::new(Environment::Development);
        let store = GuildStore::new(
            Arc::clone(&documents) as Arc<dyn DocumentStore>,
            Arc::clone(&cache) as Arc<dyn CacheStore>,
            keyspace.clone(),
            Arc::new(TracingReporter),
            HOUR,
        );

        Harness {
            documents,
            cache,
            keyspace,
            store,
        }
    }

    fn patched_template(id: &str) -> GuildRecord {
        let mut record = GuildRecord::template(GuildId::new(id));
        record.mark_patched(AwardChannelPatch::NAME);
        record.mark_patched(ActivityAnnouncePatch::NAME);
        record
    }

    #[tokio::test]
    async fn unseen_guild_gets_template_without_persisting() {
        let h = harness().await;
        let id = GuildId::new("42");

        let record = h.store.fetch(&id).await.unwrap();

        assert_eq!(record, patched_template("42"));
        assert_eq!(h.documents.document_count(), 0);
        // the synthesized template is not cached either
        assert_eq!(
            h.cache.get(&h.keyspace.guild_cache_key(&id)).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn update_then_fetch_round_trips_via_cache() {
        let h = harness().await;
        let id = GuildId::new("42");

        let mut record = patched_template("42");
        record.config.auto_role = true;
        record.config.replace_awards(vec!["Medal".into()]);
        h.store.update(&id, &record).await.unwrap();

        // tamper with the durable copy; a fresh cache entry must win
        h.documents
            .upsert("guilds", "42", &json!({"version": 2, "id": "42"}))
            .await
            .unwrap();

        let fetched = h.store.fetch(&id).await.unwrap();
        assert_eq!(fetched, record);
    }

    #[tokio::test]
    async fn durable_record_is_cached_on_fetch() {
        let h = harness().await;
        let id = GuildId::new("42");

        let mut record = patched_template("42");
        record.config.group_id = 77;
        h.documents
            .upsert("guilds", "42", &serde_json::to_value(&record).unwrap())
            .await
            .unwrap();

        let fetched = h.store.fetch(&id).await.unwrap();
        assert_eq!(fetched.config.group_id, 77);

        let cached = h
            .cache
            .get(&h.keyspace.guild_cache_key(&id))
            .await
            .unwrap()
            .expect("fetch should populate the cache");
        let reparsed: GuildRecord = serde_json::from_str(&cached).unwrap();
        assert_eq!(reparsed, fetched);
    }

    #[tokio::test]
    async fn legacy_durable_record_is_migrated() {
        let h = harness().await;
        let id = GuildId::new("42");

        h.documents
            .upsert(
                "guilds",
                "42",
                &json!({
                    "_id": "42",
                    "blacklist": {"status": false},
                    "config": {"administrativeLeaveRole": "123"}
                }),
            )
            .await
            .unwrap();

        let record = h.store.fetch(&id).await.unwrap();
        assert_eq!(record.version, deptlog_record::SCHEMA_VERSION);
        assert_eq!(record.config.roles.admin_leave, "123");
        assert_eq!(record.id.as_str(), "42");
        assert!(record.has_patch(AwardChannelPatch::NAME));
    }

    #[tokio::test]
    async fn legacy_cache_hit_is_migrated_but_not_rewritten() {
        let h = harness().await;
        let id = GuildId::new("42");
        let key = h.keyspace.guild_cache_key(&id);

        let legacy = json!({"config": {"autoRole": true}}).to_string();
        h.cache.set_ex(&key, &legacy, HOUR).await.unwrap();

        let record = h.store.fetch(&id).await.unwrap();
        assert!(record.config.auto_role);
        assert_eq!(record.version, deptlog_record::SCHEMA_VERSION);

        // hits do not refresh or rewrite the entry; only update does
        assert_eq!(h.cache.get(&key).await.unwrap(), Some(legacy));
    }

    #[tokio::test]
    async fn malformed_cache_entry_falls_back_and_repairs() {
        let h = harness().await;
        let id = GuildId::new("42");
        let key = h.keyspace.guild_cache_key(&id);

        let mut record = patched_template("42");
        record.config.department_icon = "https://icons.example/x.png".into();
        h.documents
            .upsert("guilds", "42", &serde_json::to_value(&record).unwrap())
            .await
            .unwrap();

        h.cache.set_ex(&key, "{definitely not json", HOUR).await.unwrap();

        let fetched = h.store.fetch(&id).await.unwrap();
        assert_eq!(fetched, record);

        let repaired = h.cache.get(&key).await.unwrap().expect("repaired entry");
        let reparsed: GuildRecord = serde_json::from_str(&repaired).unwrap();
        assert_eq!(reparsed, record);
    }

    #[tokio::test]
    async fn non_object_cache_entry_falls_back() {
        let h = harness().await;
        let id = GuildId::new("42");
        let key = h.keyspace.guild_cache_key(&id);

        h.cache.set_ex(&key, "[1,2,3]", HOUR).await.unwrap();

        let record = h.store.fetch(&id).await.unwrap();
        assert_eq!(record, patched_template("42"));
    }

    #[tokio::test]
    async fn undecodable_durable_record_defaults() {
        let h = harness().await;
        let id = GuildId::new("42");

        h.documents
            .upsert("guilds", "42", &json!({"version": 2, "config": {"ranks": 13}}))
            .await
            .unwrap();

        let record = h.store.fetch(&id).await.unwrap();
        assert_eq!(record, patched_template("42"));
    }

    #[tokio::test]
    async fn update_stamps_the_requested_id() {
        let h = harness().await;
        let id = GuildId::new("42");

        let record = patched_template("misfiled");
        h.store.update(&id, &record).await.unwrap();

        let fetched = h.store.fetch(&id).await.unwrap();
        assert_eq!(fetched.id.as_str(), "42");
    }
}
