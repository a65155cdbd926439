//! Nested guild configuration sections
//!
//! Every field carries a serde default so documents written by any past
//! schema revision deserialize without errors. List-valued fields hold no
//! duplicates; the mutation helpers here are the only sanctioned way to
//! edit them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Where members are told to direct questions about an action taken
/// against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContactMethod {
    /// Internal affairs only.
    #[serde(rename = "IA")]
    InternalAffairs,
    /// High command only.
    #[serde(rename = "HC")]
    HighCommand,
    /// Internal affairs or high command.
    #[default]
    #[serde(rename = "IA_HC")]
    IaHc,
    /// Direct message to the issuing supervisor.
    #[serde(rename = "DM")]
    DirectMessage,
}

impl ContactMethod {
    /// Wire representation of this contact method.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InternalAffairs => "IA",
            Self::HighCommand => "HC",
            Self::IaHc => "IA_HC",
            Self::DirectMessage => "DM",
        }
    }

    /// Parse a wire value; `None` for anything unrecognized.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "IA" => Some(Self::InternalAffairs),
            "HC" => Some(Self::HighCommand),
            "IA_HC" => Some(Self::IaHc),
            "DM" => Some(Self::DirectMessage),
            _ => None,
        }
    }
}

impl fmt::Display for ContactMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation options for action log embeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedOptions {
    /// Title line of every action embed.
    pub title: String,
    /// Whether discharges are displayed as such (false renders them as
    /// terminations).
    pub discharge_display: bool,
    /// Whether the subject's avatar is attached to action messages.
    pub show_avatar: bool,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            title: "Department Action".to_owned(),
            discharge_display: true,
            show_avatar: false,
        }
    }
}

/// Role bindings. Many-of fields are duplicate-free id lists; one-of fields
/// hold a single role id, empty when unset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleConfig {
    /// Roles permitted to run command-level actions.
    pub command: Vec<String>,
    /// Roles permitted to run high-command actions.
    pub high_command: Vec<String>,
    /// Role marking department membership.
    pub department: String,
    /// Role applied during administrative leave.
    pub admin_leave: String,
    /// Role applied during a suspension.
    pub suspended: String,
    /// Role applied during probation.
    pub probation: String,
    /// Role applied during a leave of absence.
    pub loa: String,
}

impl RoleConfig {
    /// Replace the command role list, dropping duplicates.
    pub fn set_command(&mut self, roles: Vec<String>) {
        self.command = dedup_exact(roles);
    }

    /// Replace the high-command role list, dropping duplicates.
    pub fn set_high_command(&mut self, roles: Vec<String>) {
        self.high_command = dedup_exact(roles);
    }
}

/// Channel bindings, one channel id per purpose, empty when unset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Where issued actions are logged.
    pub action: String,
    /// Where action requests await approval.
    pub action_request: String,
    /// Where activity logs are posted.
    pub activity_log: String,
    /// Where activity notices are announced.
    pub activity_announce: String,
    /// Where awards are announced.
    pub award: String,
    /// Where leaves of absence are posted.
    pub loa: String,
}

/// Direct-message templates sent alongside certain actions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DmConfig {
    /// Message sent when a member is placed on administrative leave.
    pub admin_leave: String,
}

/// Per-guild configuration, fully populated on every fetched record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildConfig {
    /// Module names the guild has switched off.
    pub disabled_modules: Vec<String>,
    /// Command names the guild has switched off.
    pub disabled_commands: Vec<String>,
    /// Rank names, matching the bound group's rank names exactly.
    pub ranks: Vec<String>,
    /// Award names grantable by the award commands.
    pub awards: Vec<String>,
    /// Bound external group id, 0 when unbound.
    pub group_id: u64,
    /// Whether executor profiles are resolved when logging actions.
    pub fetch_executor: bool,
    /// Whether the department role is granted automatically.
    pub auto_role: bool,
    /// Contact instruction appended to suspension-class actions.
    pub contact: ContactMethod,
    /// Department icon URL, empty when unset.
    pub department_icon: String,
    /// Embed presentation options.
    pub embed: EmbedOptions,
    /// Role bindings.
    pub roles: RoleConfig,
    /// Channel bindings.
    pub channels: ChannelConfig,
    /// Direct-message templates.
    pub dms: DmConfig,
    /// Opaque per-guild secrets (webhook URLs and similar).
    pub secrets: BTreeMap<String, String>,
}

impl GuildConfig {
    /// Add awards, skipping names already present. Returns how many were
    /// actually added.
    pub fn add_awards<I>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let mut added = 0;
        for name in names {
            if !self.awards.contains(&name) {
                self.awards.push(name);
                added += 1;
            }
        }
        added
    }

    /// Remove awards by case-insensitive name match. Returns how many were
    /// actually removed.
    pub fn remove_awards<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.awards.len();
        for name in names {
            let lowered = name.as_ref().to_lowercase();
            self.awards.retain(|award| award.to_lowercase() != lowered);
        }
        before - self.awards.len()
    }

    /// Replace the award list wholesale, dropping duplicates.
    pub fn replace_awards(&mut self, names: Vec<String>) {
        self.awards = dedup_exact(names);
    }

    /// Replace the rank list wholesale, dropping duplicates.
    pub fn replace_ranks(&mut self, names: Vec<String>) {
        self.ranks = dedup_exact(names);
    }
}

/// Drop exact duplicates, first occurrence wins, order preserved.
fn dedup_exact(values: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embed_defaults() {
        let embed = EmbedOptions::default();
        assert_eq!(embed.title, "Department Action");
        assert!(embed.discharge_display);
        assert!(!embed.show_avatar);
    }

    #[test]
    fn partial_embed_keeps_defaults() {
        let embed: EmbedOptions = serde_json::from_value(json!({"show_avatar": true})).unwrap();
        assert_eq!(embed.title, "Department Action");
        assert!(embed.discharge_display);
        assert!(embed.show_avatar);
    }

    #[test]
    fn contact_wire_values_round_trip() {
        for contact in [
            ContactMethod::InternalAffairs,
            ContactMethod::HighCommand,
            ContactMethod::IaHc,
            ContactMethod::DirectMessage,
        ] {
            let wire = serde_json::to_value(contact).unwrap();
            assert_eq!(wire, json!(contact.as_str()));
            let back: ContactMethod = serde_json::from_value(wire).unwrap();
            assert_eq!(back, contact);
            assert_eq!(ContactMethod::parse(contact.as_str()), Some(contact));
        }
        assert_eq!(ContactMethod::parse("PIGEON"), None);
    }

    #[test]
    fn add_awards_skips_existing() {
        let mut config = GuildConfig::default();
        config.replace_awards(vec!["Medal of Honor".into(), "Purple Heart".into()]);

        let added = config.add_awards(vec!["Purple Heart".into(), "Long Service".into()]);

        assert_eq!(added, 1);
        assert_eq!(
            config.awards,
            vec!["Medal of Honor", "Purple Heart", "Long Service"]
        );
    }

    #[test]
    fn remove_awards_is_case_insensitive() {
        let mut config = GuildConfig::default();
        config.replace_awards(vec!["Medal of Honor".into(), "Purple Heart".into()]);

        let removed = config.remove_awards(["medal of honor"]);

        assert_eq!(removed, 1);
        assert_eq!(config.awards, vec!["Purple Heart"]);
    }

    #[test]
    fn replace_awards_deduplicates() {
        let mut config = GuildConfig::default();
        config.replace_awards(vec!["A".into(), "B".into(), "A".into()]);
        assert_eq!(config.awards, vec!["A", "B"]);
    }

    #[test]
    fn role_setters_deduplicate() {
        let mut roles = RoleConfig::default();
        roles.set_command(vec!["1".into(), "2".into(), "1".into()]);
        assert_eq!(roles.command, vec!["1", "2"]);
    }

    #[test]
    fn empty_object_fills_every_section() {
        let config: GuildConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, GuildConfig::default());
        assert_eq!(config.contact, ContactMethod::IaHc);
    }
}
