use super::work_bucket::{WorkBucket, WorkBucketStage};
use super::worker::GCWorker;
use enum_map::EnumMap;
use std::time::Instant;

/// Runs the buckets of a collection in stage order.
#[derive(Default)]
pub struct GCWorkScheduler {
    pub work_buckets: EnumMap<WorkBucketStage, WorkBucket>,
}

impl GCWorkScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain every bucket, stage by stage.
    pub fn run(&mut self, worker: &mut GCWorker) {
        for (stage, bucket) in self.work_buckets.iter_mut() {
            let start = Instant::now();
            let mut packets = 0;
            while let Some(mut work) = bucket.poll() {
                trace!("[{}] {}", stage, work.name());
                work.do_work(worker);
                packets += 1;
            }
            let elapsed = start.elapsed();
            worker.stats.phase_times[stage] += elapsed;
            trace!("[{}] finished {} packets in {:?}", stage, packets, elapsed);
        }
    }

    /// Are all buckets drained?
    pub fn all_buckets_empty(&self) -> bool {
        self.work_buckets.values().all(|bucket| bucket.is_empty())
    }
}
