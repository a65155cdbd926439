//! Legacy schema migration
//!
//! The original deployment stored version-less documents with a flat
//! camelCase `config` and an object-shaped blacklist. [`migrate`] maps that
//! shape onto a fresh current-schema template. The carry list is fixed:
//! fields outside it revert to template defaults, and missing legacy
//! sub-fields read as falsy/empty rather than failing.

use deptlog_record::{Blacklist, ContactMethod, GuildRecord, SCHEMA_VERSION};
use serde_json::Value;

/// Whether a raw document must pass through [`migrate`] before use.
///
/// True when `version` is absent, not an integer, or older than
/// [`SCHEMA_VERSION`].
#[must_use]
pub fn needs_migration(doc: &Value) -> bool {
    match doc.get("version").and_then(Value::as_u64) {
        Some(version) => version < u64::from(SCHEMA_VERSION),
        None => true,
    }
}

/// Map a legacy document onto a fresh current-schema record.
///
/// Pure: the input is never mutated. The output record has the current
/// version, no applied patches and an empty id; the caller stamps the
/// authoritative id afterwards.
#[must_use]
pub fn migrate(doc: &Value) -> GuildRecord {
    let mut record = GuildRecord::default();

    // blacklist was `{status, reason}`; only a truthy status means barred
    if let Some(blacklist) = doc.get("blacklist") {
        let status = blacklist
            .get("status")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if status {
            let reason = blacklist
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or_default();
            record.blacklist = Blacklist::reason_for(reason);
        }
    }

    if let Some(cfg) = doc.get("config") {
        if let Some(contact) = cfg
            .get("adminLeaveContact")
            .and_then(Value::as_str)
            .and_then(ContactMethod::parse)
        {
            record.config.contact = contact;
        }
        record.config.department_icon = str_field(cfg, "departmentIconURL");
        record.config.embed.discharge_display =
            cfg.get("dischargeDisplay").and_then(Value::as_str) != Some("terminate");
        record.config.embed.show_avatar = bool_field(cfg, "showAvatarOnActionMessages");
        record.config.auto_role = bool_field(cfg, "autoRole");

        // the single legacy log channel held `false` when unset
        record.config.channels.action = str_field(cfg, "logChannel");

        record.config.roles.set_command(str_list(cfg, "commandRoles"));
        record
            .config
            .roles
            .set_high_command(str_list(cfg, "departmentCommandRoles"));
        record.config.roles.department = str_field(cfg, "departmentRole");
        record.config.roles.admin_leave = str_field(cfg, "administrativeLeaveRole");
        record.config.roles.suspended = str_field(cfg, "suspendedRole");
        record.config.roles.loa = str_field(cfg, "loaRole");
        record.config.roles.probation = str_field(cfg, "probationRole");
    }

    record
}

fn str_field(obj: &Value, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

fn bool_field(obj: &Value, key: &str) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn str_list(obj: &Value, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
