//! deptlog Record - Guild configuration data model
//!
//! The typed shape of a guild's stored configuration:
//! - `GuildRecord` with the current schema version, applied-patch tags and
//!   the two-shape blacklist marker
//! - `GuildConfig` and its nested sections, every field defaultable so
//!   partial documents always deserialize
//! - The versioned default template and the template merge used to
//!   normalize raw store documents
//!
//! # Example
//!
//! ```rust
//! use deptlog_record::{GuildId, GuildRecord};
//!
//! let record = GuildRecord::template(GuildId::new("100200300"));
//! assert_eq!(record.version, deptlog_record::SCHEMA_VERSION);
//! assert!(record.blacklist.is_clear());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod blacklist;
pub mod config;
pub mod error;
pub mod record;

// Re-exports for convenience
pub use blacklist::Blacklist;
pub use config::{
    ChannelConfig, ContactMethod, DmConfig, EmbedOptions, GuildConfig, RoleConfig,
};
pub use error::RecordError;
pub use record::{GuildId, GuildRecord, SCHEMA_VERSION};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with guild records
    pub use crate::{Blacklist, ContactMethod, GuildConfig, GuildId, GuildRecord, SCHEMA_VERSION};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
