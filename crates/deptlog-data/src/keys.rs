//! Store naming
//!
//! One owner for every collection name, cache key and lock key, so the
//! production and development deployments can never collide through a
//! hand-built string somewhere else.

use deptlog_record::GuildId;

/// Deployment environment, selecting the keyspace name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Live deployment.
    #[default]
    Production,
    /// Development/staging deployment, fully separated keys.
    Development,
}

/// Builder of collection names, cache keys and lock keys.
#[derive(Debug, Clone)]
pub struct Keyspace {
    name: &'static str,
}

impl Keyspace {
    /// Keyspace for the given environment.
    #[must_use]
    pub fn new(env: Environment) -> Self {
        let name = match env {
            Environment::Production => "deptlog",
            Environment::Development => "deptlog-dev",
        };
        Self { name }
    }

    /// The keyspace name ("deptlog" or "deptlog-dev").
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.name
    }

    /// Collection holding guild records.
    #[inline]
    #[must_use]
    pub fn guilds_collection(&self) -> &'static str {
        "guilds"
    }

    /// Cache key of one guild's record.
    #[must_use]
    pub fn guild_cache_key(&self, id: &GuildId) -> String {
        format!("{}:guilds:{}", self.name, id)
    }

    /// Namespace prefixing every lock key.
    #[must_use]
    pub fn lock_namespace(&self) -> String {
        format!("locks/{}", self.name)
    }

    /// Cache key of one held lock.
    #[must_use]
    pub fn lock_key(&self, resource: &str) -> String {
        format!("locks/{}:{}", self.name, resource)
    }

    /// Lock resource serializing configuration mutations for one guild.
    #[must_use]
    pub fn config_resource(id: &GuildId) -> String {
        format!("config:{id}")
    }
}

impl Default for Keyspace {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}
