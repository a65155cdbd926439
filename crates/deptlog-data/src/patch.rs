//! Data patch pipeline
//!
//! Patches are small per-record upgrades applied after migration and
//! defaulting, each tagged into `record.patches` so it runs at most once per
//! record across any number of cache/store round trips. Registration is
//! explicit: [`PatchPipeline::standard`] is the whole list, sorted by
//! priority at construction (stable, so equal priorities keep registration
//! order). The pipeline runs the full list on every load; each patch guards
//! on its own name.

use deptlog_record::GuildRecord;

/// One idempotent per-record upgrade step.
///
/// Implementations must check [`GuildRecord::has_patch`] for their own name
/// before acting and call [`GuildRecord::mark_patched`] with the same name
/// after acting; the single `name()` value drives both sides.
pub trait DataPatch: Send + Sync + std::fmt::Debug {
    /// Stable name recorded on the record once applied.
    fn name(&self) -> &'static str;

    /// Sort key; lower runs first. Default is 1.
    fn priority(&self) -> i32 {
        1
    }

    /// Apply the patch to the record, guarded by its own name.
    fn apply(&self, record: &mut GuildRecord);
}

/// Backfill of the award announcement channel for records created before
/// the field existed.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwardChannelPatch;

impl AwardChannelPatch {
    /// Name recorded on patched records.
    pub const NAME: &'static str = "award_channel";
}

impl DataPatch for AwardChannelPatch {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        0
    }

    fn apply(&self, record: &mut GuildRecord) {
        if record.has_patch(Self::NAME) {
            return;
        }
        record.config.channels.award = String::new();
        record.mark_patched(Self::NAME);
    }
}

/// Backfill of the activity announcement channel, added one schema tweak
/// after the award channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityAnnouncePatch;

impl ActivityAnnouncePatch {
    /// Name recorded on patched records.
    pub const NAME: &'static str = "activity_announce_channel";
}

impl DataPatch for ActivityAnnouncePatch {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, record: &mut GuildRecord) {
        if record.has_patch(Self::NAME) {
            return;
        }
        record.config.channels.activity_announce = String::new();
        record.mark_patched(Self::NAME);
    }
}

/// Ordered collection of registered patches.
#[derive(Debug)]
pub struct PatchPipeline {
    patches: Vec<Box<dyn DataPatch>>,
}

impl PatchPipeline {
    /// Pipeline with no patches.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            patches: Vec::new(),
        }
    }

    /// Every currently shipped patch.
    #[must_use]
    pub fn standard() -> Self {
        Self::with_patches(vec![
            Box::new(AwardChannelPatch),
            Box::new(ActivityAnnouncePatch),
        ])
    }

    /// Pipeline over an explicit patch set, sorted by priority.
    #[must_use]
    pub fn with_patches(mut patches: Vec<Box<dyn DataPatch>>) -> Self {
        patches.sort_by_key(|patch| patch.priority());
        Self { patches }
    }

    /// Apply every patch to the record in priority order.
    pub fn run(&self, record: &mut GuildRecord) {
        for patch in &self.patches {
            patch.apply(record);
        }
    }

    /// Registered patch names in run order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.patches.iter().map(|patch| patch.name()).collect()
    }

    /// Number of registered patches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// Whether the pipeline has no patches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}

impl Default for PatchPipeline {
    /// The standard pipeline; what production code wants by default.
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deptlog_record::GuildId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct CountingPatch {
        applied: Arc<AtomicUsize>,
    }

    impl DataPatch for CountingPatch {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn apply(&self, record: &mut GuildRecord) {
            if record.has_patch(self.name()) {
                return;
            }
            self.applied.fetch_add(1, Ordering::SeqCst);
            record.mark_patched(self.name());
        }
    }

    #[test]
    fn standard_runs_in_priority_order() {
        let pipeline = PatchPipeline::standard();
        assert_eq!(
            pipeline.names(),
            vec![AwardChannelPatch::NAME, ActivityAnnouncePatch::NAME]
        );
    }

    #[test]
    fn run_tags_every_patch() {
        let pipeline = PatchPipeline::standard();
        let mut record = GuildRecord::template(GuildId::new("42"));

        pipeline.run(&mut record);

        assert!(record.has_patch(AwardChannelPatch::NAME));
        assert!(record.has_patch(ActivityAnnouncePatch::NAME));
        assert_eq!(record.patches.len(), pipeline.len());
    }

    #[test]
    fn run_twice_equals_run_once() {
        let pipeline = PatchPipeline::standard();
        let mut record = GuildRecord::template(GuildId::new("42"));

        pipeline.run(&mut record);
        let once = record.clone();
        pipeline.run(&mut record);

        assert_eq!(record, once);
    }

    #[test]
    fn guard_prevents_reapplication() {
        let applied = Arc::new(AtomicUsize::new(0));
        let pipeline = PatchPipeline::with_patches(vec![Box::new(CountingPatch {
            applied: Arc::clone(&applied),
        })]);

        let mut record = GuildRecord::template(GuildId::new("42"));
        pipeline.run(&mut record);
        pipeline.run(&mut record);
        pipeline.run(&mut record);

        assert_eq!(applied.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn tagged_records_are_skipped() {
        let applied = Arc::new(AtomicUsize::new(0));
        let pipeline = PatchPipeline::with_patches(vec![Box::new(CountingPatch {
            applied: Arc::clone(&applied),
        })]);

        let mut record = GuildRecord::template(GuildId::new("42"));
        record.mark_patched("counting");
        pipeline.run(&mut record);

        assert_eq!(applied.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn priority_sort_is_stable() {
        #[derive(Debug)]
        struct Named(&'static str, i32);

        impl DataPatch for Named {
            fn name(&self) -> &'static str {
                self.0
            }
            fn priority(&self) -> i32 {
                self.1
            }
            fn apply(&self, record: &mut GuildRecord) {
                if record.has_patch(self.name()) {
                    return;
                }
                record.mark_patched(self.name());
            }
        }

        let pipeline = PatchPipeline::with_patches(vec![
            Box::new(Named("late", 5)),
            Box::new(Named("first-of-tie", 1)),
            Box::new(Named("second-of-tie", 1)),
            Box::new(Named("earliest", 0)),
        ]);

        assert_eq!(
            pipeline.names(),
            vec!["earliest", "first-of-tie", "second-of-tie", "late"]
        );
    }
}
