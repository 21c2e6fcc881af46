use super::gc_work::{
    CalculateForwardingAddress, Compact, MarkRoots, Prepare, Release, ScanStackRoots, TransitiveClosure,
    UpdateReferences,
};
use crate::policy::markcompactspace::MarkCompactSpace;
use crate::scheduler::{GCWorkScheduler, GCWorker, WorkBucketStage};
use crate::util::options::Options;
use crate::util::statistics::{CollectionStats, Stats};
use crate::util::Address;
use crate::vm::MutatorStack;

/// A stop-the-world sliding mark-compact collector for one mutator.
///
/// The plan owns no memory. Each collection is handed the frozen mutator stack and the
/// heap arena, and returns the new allocation cursor.
#[derive(Default)]
pub struct MarkCompact {
    options: Options,
    stats: Stats,
}

impl MarkCompact {
    pub fn new(options: Options) -> Self {
        MarkCompact {
            options,
            stats: Stats::default(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Put the packets of one collection into their buckets.
    pub fn schedule_collection(&self, scheduler: &mut GCWorkScheduler) {
        scheduler.work_buckets[WorkBucketStage::Prepare].add(Prepare);
        scheduler.work_buckets[WorkBucketStage::Prepare].add(ScanStackRoots);
        scheduler.work_buckets[WorkBucketStage::Closure].add(MarkRoots);
        scheduler.work_buckets[WorkBucketStage::Closure].add(TransitiveClosure);
        scheduler.work_buckets[WorkBucketStage::CalculateForwarding].add(CalculateForwardingAddress);
        // roots and interior pointers must both see every destination before anything moves
        scheduler.work_buckets[WorkBucketStage::RefForwarding].add(UpdateReferences);
        scheduler.work_buckets[WorkBucketStage::Compact].add(Compact);
        scheduler.work_buckets[WorkBucketStage::Release].add(Release);
    }

    /// Collect `space`, treating every slot of the frames reachable from `first_frame`
    /// as a root. Roots that refer to live blocks are rewritten to their new addresses.
    /// Returns the new high-water mark of the heap.
    pub fn collect(&mut self, stack: &mut MutatorStack, first_frame: Address, space: &mut MarkCompactSpace) -> Address {
        self.collect_with_stats(stack, first_frame, space).0
    }

    /// [`collect`](Self::collect), also returning what the collection did.
    pub fn collect_with_stats(
        &mut self,
        stack: &mut MutatorStack,
        first_frame: Address,
        space: &mut MarkCompactSpace,
    ) -> (Address, CollectionStats) {
        let old_cursor = space.cursor();
        let mut scheduler = GCWorkScheduler::new();
        self.schedule_collection(&mut scheduler);

        let mut worker = GCWorker::new(stack, space, first_frame, &self.options);
        scheduler.run(&mut worker);
        debug_assert!(scheduler.all_buckets_empty());

        let new_cursor = worker.new_cursor.unwrap_or(old_cursor);
        let collection = worker.stats;
        self.stats.record(&collection);
        self.stats.print_last();
        (new_cursor, collection)
    }
}
