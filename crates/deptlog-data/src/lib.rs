//! deptlog Data - Guild configuration data layer
//!
//! Cache-first persistence for guild records with schema upkeep built into
//! every read:
//! - `DataProvider` connects the cache and durable backends once and hands
//!   out the stores built over them
//! - `GuildStore` serves reads through the cache, migrates legacy documents,
//!   applies the patch pipeline and dual-writes updates
//! - `LockManager` takes expiring all-or-nothing advisory locks in the cache
//!   keyspace so concurrent mutations of one guild serialize
//! - swappable `DocumentStore`/`CacheStore` backends: in-memory for tests,
//!   sled for single-node deployments
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use deptlog_data::{DataConfig, DataProvider};
//! use deptlog_data::store::{MemoryCacheStore, MemoryDocumentStore};
//! use deptlog_record::GuildId;
//!
//! let provider = Arc::new(DataProvider::new(
//!     Arc::new(MemoryDocumentStore::new()),
//!     Arc::new(MemoryCacheStore::new()),
//!     DataConfig::default(),
//! ));
//! provider.connect().await?;
//!
//! let record = provider.guilds().fetch(&GuildId::new("100200300")).await?;
//! assert!(record.blacklist.is_clear());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod error;
pub mod guilds;
pub mod keys;
pub mod lock;
pub mod migrate;
pub mod patch;
pub mod provider;
pub mod report;
pub mod store;

// Re-exports for convenience
pub use config::DataConfig;
pub use error::{DataError, DataResult, LockError, LockResult, StoreError, StoreResult};
pub use guilds::GuildStore;
pub use keys::{Environment, Keyspace};
pub use lock::{LockConfig, LockHandle, LockManager};
pub use patch::{DataPatch, PatchPipeline};
pub use provider::DataProvider;
pub use report::{ErrorReporter, TracingReporter};
pub use store::{CacheStore, DocumentStore};

/// Prelude module for common data-layer imports
pub mod prelude {
    //! Common imports for working with the data layer
    pub use crate::{
        CacheStore, DataConfig, DataError, DataProvider, DataResult, DocumentStore, Environment,
        GuildStore, LockError, LockManager, StoreError,
    };
    pub use deptlog_record::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
