//! Plan: sliding mark-compact
pub(super) mod gc_work;
pub(super) mod global;

pub use self::global::MarkCompact;
