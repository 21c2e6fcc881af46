use super::work::GCWork;
use enum_map::Enum;
use std::collections::VecDeque;
use strum_macros::{Display, EnumIter};

/// The stages of a collection, in the order they run.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Enum, EnumIter, Display)]
pub enum WorkBucketStage {
    /// Record block starts, find the roots.
    Prepare,
    /// Compute the transitive closure from the roots.
    Closure,
    /// Assign every live block its destination.
    CalculateForwarding,
    /// Rewrite roots and interior pointers to the destinations.
    RefForwarding,
    /// Move live blocks to their destinations.
    Compact,
    /// Check and report on the compacted heap.
    Release,
}

/// The pending packets of one stage.
#[derive(Default)]
pub struct WorkBucket {
    queue: VecDeque<Box<dyn GCWork>>,
}

impl WorkBucket {
    pub fn add<W: GCWork + 'static>(&mut self, work: W) {
        self.queue.push_back(Box::new(work));
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub(super) fn poll(&mut self) -> Option<Box<dyn GCWork>> {
        self.queue.pop_front()
    }
}
