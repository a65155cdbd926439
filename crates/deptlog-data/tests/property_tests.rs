use proptest::prelude::*;
use serde_json::{json, Value};

use deptlog_data::migrate::{migrate, needs_migration};
use deptlog_data::PatchPipeline;
use deptlog_record::{GuildId, GuildRecord, SCHEMA_VERSION};

fn legacy_doc() -> impl Strategy<Value = Value> {
    (
        proptest::option::of(any::<bool>()),
        proptest::option::of("[A-Za-z ]{0,12}"),
        proptest::option::of(any::<bool>()),
        proptest::option::of("[0-9]{1,8}"),
        proptest::collection::vec("[0-9]{1,8}", 0..4),
        proptest::option::of(prop_oneof![
            Just("IA"),
            Just("HC"),
            Just("IA_HC"),
            Just("DM"),
            Just("CARRIER_PIGEON"),
        ]),
        proptest::option::of(prop_oneof![Just("terminate"), Just("display")]),
    )
        .prop_map(
            |(status, reason, auto_role, log_channel, command_roles, contact, discharge)| {
                let mut config = serde_json::Map::new();
                if let Some(v) = auto_role {
                    config.insert("autoRole".into(), json!(v));
                }
                if let Some(v) = log_channel {
                    config.insert("logChannel".into(), json!(v));
                }
                config.insert("commandRoles".into(), json!(command_roles));
                if let Some(v) = contact {
                    config.insert("adminLeaveContact".into(), json!(v));
                }
                if let Some(v) = discharge {
                    config.insert("dischargeDisplay".into(), json!(v));
                }

                let mut doc = serde_json::Map::new();
                if let Some(status) = status {
                    let mut blacklist = serde_json::Map::new();
                    blacklist.insert("status".into(), json!(status));
                    if let Some(reason) = reason {
                        blacklist.insert("reason".into(), json!(reason));
                    }
                    doc.insert("blacklist".into(), Value::Object(blacklist));
                }
                doc.insert("config".into(), Value::Object(config));
                Value::Object(doc)
            },
        )
}

fn record() -> impl Strategy<Value = GuildRecord> {
    (
        "[0-9]{1,10}",
        any::<bool>(),
        "[a-z0-9]{0,8}",
        proptest::collection::btree_set(
            prop_oneof![
                Just("award_channel".to_owned()),
                Just("activity_announce_channel".to_owned()),
                Just("retired_patch".to_owned()),
            ],
            0..3,
        ),
    )
        .prop_map(|(id, auto_role, award, patches)| {
            let mut record = GuildRecord::template(GuildId::new(id));
            record.config.auto_role = auto_role;
            record.config.channels.award = award;
            record.patches = patches;
            record
        })
}

proptest! {
    #[test]
    fn prop_migration_is_total_and_versioned(doc in legacy_doc()) {
        prop_assert!(needs_migration(&doc));

        let migrated = migrate(&doc);
        prop_assert_eq!(migrated.version, SCHEMA_VERSION);
        prop_assert!(migrated.patches.is_empty());
        prop_assert_eq!(migrated.id.as_str(), "");
    }

    // a migrated record must survive the cache encoding used on write-back
    #[test]
    fn prop_migrated_records_survive_cache_encoding(doc in legacy_doc()) {
        let migrated = migrate(&doc);
        let encoded = serde_json::to_value(&migrated).unwrap();
        let decoded = GuildRecord::from_partial(&encoded).unwrap();
        prop_assert_eq!(decoded, migrated);
    }

    #[test]
    fn prop_pipeline_run_is_idempotent(record in record()) {
        let pipeline = PatchPipeline::standard();

        let mut once = record;
        pipeline.run(&mut once);
        let mut twice = once.clone();
        pipeline.run(&mut twice);

        prop_assert_eq!(twice, once);
    }
}
