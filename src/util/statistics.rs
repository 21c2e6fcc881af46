use crate::scheduler::WorkBucketStage;
use enum_map::EnumMap;
use itertools::Itertools;
use std::time::Duration;

/// What one collection did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectionStats {
    /// Stack frames walked by the root scanner.
    pub frames: usize,
    pub root_slots: usize,
    /// Blocks below the high-water mark when the collection started.
    pub blocks: usize,
    pub live_blocks: usize,
    pub live_words: usize,
    /// Root slots rewritten to a destination.
    pub updated_roots: usize,
    /// Payload words rewritten to a destination.
    pub updated_fields: usize,
    /// Words between the new and the old high-water mark.
    pub reclaimed_words: usize,
    pub phase_times: EnumMap<WorkBucketStage, Duration>,
}

impl CollectionStats {
    pub fn total_time(&self) -> Duration {
        self.phase_times.values().sum()
    }
}

/// Totals over the lifetime of a plan.
#[derive(Clone, Debug, Default)]
pub struct Stats {
    gc_count: usize,
    total_reclaimed_words: usize,
    total_time: Duration,
    last: Option<CollectionStats>,
}

impl Stats {
    pub fn record(&mut self, collection: &CollectionStats) {
        self.gc_count += 1;
        self.total_reclaimed_words += collection.reclaimed_words;
        self.total_time += collection.total_time();
        self.last = Some(*collection);
    }

    pub fn gc_count(&self) -> usize {
        self.gc_count
    }

    pub fn total_reclaimed_words(&self) -> usize {
        self.total_reclaimed_words
    }

    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    pub fn last(&self) -> Option<&CollectionStats> {
        self.last.as_ref()
    }

    pub fn print_last(&self) {
        let Some(last) = self.last.as_ref() else {
            return;
        };
        info!(
            "GC #{}: {} of {} blocks live ({} words), {} words reclaimed, {} roots in {} frames, {:?}",
            self.gc_count,
            last.live_blocks,
            last.blocks,
            last.live_words,
            last.reclaimed_words,
            last.root_slots,
            last.frames,
            last.total_time()
        );
        debug!(
            "  {}",
            last.phase_times
                .iter()
                .map(|(stage, time)| format!("{}: {:?}", stage, time))
                .join(", ")
        );
    }
}
