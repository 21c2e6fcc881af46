//! Memory policies.
//!
//! There is one space, and it is collected by sliding compaction.

/// Layout of a heap block: header word, GC slot, payload.
pub mod block;
pub mod markcompactspace;
