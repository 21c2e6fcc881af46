//! The collection plan.
//!
//! A plan decides which work packets make up a collection and in which
//! [`WorkBucketStage`](crate::scheduler::WorkBucketStage) they run. The heap phases
//! themselves live in the space ([`crate::policy::markcompactspace`]).

pub mod markcompact;

pub use self::markcompact::MarkCompact;
