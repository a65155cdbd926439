//! The guild record and its versioned template
//!
//! A record is stored as one JSON document per guild. Deserialization doubles
//! as the template merge: every container carries a serde default, so a
//! partial document comes back with template values filled in at every level
//! and unknown keys ignored. `from_partial` is the only sanctioned way to
//! turn a raw store document into a typed record.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blacklist::Blacklist;
use crate::config::GuildConfig;
use crate::error::RecordError;

/// Current guild record schema version.
///
/// Documents without a `version` field (or with an older one) are legacy and
/// must pass through migration before use.
pub const SCHEMA_VERSION: u32 = 2;

/// Identifier of a guild (tenant). Primary key in every store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuildId(String);

impl GuildId {
    /// Wrap a raw guild id.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GuildId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for GuildId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for GuildId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One guild's stored configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildRecord {
    /// Owning guild id.
    pub id: GuildId,
    /// Schema version of this record; [`SCHEMA_VERSION`] after normalization.
    pub version: u32,
    /// Names of data patches already applied to this record.
    pub patches: BTreeSet<String>,
    /// Blacklist marker.
    pub blacklist: Blacklist,
    /// The guild's configuration.
    pub config: GuildConfig,
}

impl Default for GuildRecord {
    fn default() -> Self {
        Self {
            id: GuildId::new(""),
            version: SCHEMA_VERSION,
            patches: BTreeSet::new(),
            blacklist: Blacklist::Clear,
            config: GuildConfig::default(),
        }
    }
}

impl GuildRecord {
    /// The default template, tagged with the owning guild id.
    ///
    /// This is what an unseen guild receives on first fetch; it is never
    /// persisted until the guild actually changes something.
    #[must_use]
    pub fn template(id: GuildId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Normalize a raw store document into a typed record.
    ///
    /// Missing fields at any depth take their template values; unknown keys
    /// are dropped. The caller supplies the authoritative id afterwards
    /// (documents have carried the id under different keys over time).
    ///
    /// # Errors
    /// Returns an error when the document is not a JSON object or a present
    /// field has the wrong type.
    pub fn from_partial(doc: &Value) -> Result<Self, RecordError> {
        if !doc.is_object() {
            return Err(RecordError::NotAnObject);
        }
        Ok(serde_json::from_value(doc.clone())?)
    }

    /// Whether the named data patch has been applied.
    #[inline]
    #[must_use]
    pub fn has_patch(&self, name: &str) -> bool {
        self.patches.contains(name)
    }

    /// Record the named data patch as applied.
    #[inline]
    pub fn mark_patched(&mut self, name: impl Into<String>) {
        self.patches.insert(name.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContactMethod;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn template_carries_id_and_version() {
        let record = GuildRecord::template(GuildId::new("42"));
        assert_eq!(record.id.as_str(), "42");
        assert_eq!(record.version, SCHEMA_VERSION);
        assert!(record.patches.is_empty());
        assert!(record.blacklist.is_clear());
        assert_eq!(record.config, GuildConfig::default());
    }

    #[test]
    fn from_partial_fills_missing_sections() {
        let doc = json!({
            "id": "42",
            "version": 2,
            "config": {
                "auto_role": true,
                "roles": { "department": "9000" }
            }
        });

        let record = GuildRecord::from_partial(&doc).unwrap();

        assert!(record.config.auto_role);
        assert_eq!(record.config.roles.department, "9000");
        // untouched sections come from the template
        assert_eq!(record.config.embed.title, "Department Action");
        assert_eq!(record.config.contact, ContactMethod::IaHc);
        assert!(record.blacklist.is_clear());
    }

    #[test]
    fn from_partial_ignores_unknown_keys() {
        let doc = json!({
            "id": "42",
            "version": 2,
            "_legacy_marker": true,
            "config": { "group_id": 7 }
        });

        let record = GuildRecord::from_partial(&doc).unwrap();
        assert_eq!(record.config.group_id, 7);
    }

    #[test]
    fn from_partial_rejects_non_object() {
        assert!(GuildRecord::from_partial(&json!("nope")).is_err());
        assert!(GuildRecord::from_partial(&json!([1, 2])).is_err());
    }

    #[test]
    fn from_partial_rejects_type_mismatch() {
        let doc = json!({"id": "42", "config": {"ranks": 13}});
        assert!(GuildRecord::from_partial(&doc).is_err());
    }

    #[test]
    fn record_round_trips() {
        let mut record = GuildRecord::template(GuildId::new("42"));
        record.blacklist = Blacklist::reason_for("spam");
        record.mark_patched("award_channel");
        record.config.replace_awards(vec!["Medal".into()]);

        let wire = serde_json::to_value(&record).unwrap();
        assert_eq!(wire["blacklist"], json!("spam"));

        let back = GuildRecord::from_partial(&wire).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn patch_bookkeeping() {
        let mut record = GuildRecord::template(GuildId::new("42"));
        assert!(!record.has_patch("award_channel"));
        record.mark_patched("award_channel");
        assert!(record.has_patch("award_channel"));
        // marking twice is a set insert, not an error
        record.mark_patched("award_channel");
        assert_eq!(record.patches.len(), 1);
    }
}
