//! Work packets and the stop-the-world scheduler that runs them.
//!
//! A collection is a fixed sequence of stages. The plan puts work packets into the
//! bucket of each stage, and the scheduler drains the buckets one after the other on
//! the mutator's own thread. A stage only starts once every packet of the previous
//! stage has finished.

mod scheduler;
mod work;
mod work_bucket;
mod worker;

pub use scheduler::GCWorkScheduler;
pub use work::GCWork;
pub use work_bucket::{WorkBucket, WorkBucketStage};
pub use worker::GCWorker;
