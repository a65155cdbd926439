//! deptlog Core - Guild configuration service layer
//!
//! The operations the command surface calls:
//! - `ConfigService` runs every configuration change through the
//!   fetch/lock/apply/update/release protocol and reports the prior state
//! - `CooldownTracker` bounds how often one user may repeat an action
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use deptlog_core::ConfigService;
//! use deptlog_record::GuildId;
//!
//! let service = ConfigService::new(Arc::clone(&provider));
//! let mutation = service.set_auto_role(&GuildId::new("100200300"), true).await?;
//! println!("was: {}", mutation.previous.config.auto_role);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod cooldown;
pub mod service;

// Re-exports for convenience
pub use cooldown::{Cooldown, CooldownTracker};
pub use service::{ConfigService, Mutation, MutationError, MutationResult};

/// Prelude module for common service-layer imports
pub mod prelude {
    //! Common imports for the service layer
    pub use crate::{ConfigService, Cooldown, CooldownTracker, Mutation, MutationError};
    pub use deptlog_data::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
