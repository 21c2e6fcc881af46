//! A sliding mark-compact collector for a tagged-word heap.
//!
//! Compiled programs keep every value in one machine word. The low bits of the word tell
//! numbers, booleans, pointers to heap blocks and function references apart. Allocation
//! bumps a pointer through a single heap arena; when it would pass the end, the program
//! calls into this crate, which:
//!
//! 1. finds the roots by walking the saved-frame-pointer chain of the program's stack
//!    ([`vm::scan_stack_roots`]),
//! 2. marks every block reachable from them,
//! 3. assigns each live block a destination and rewrites roots and interior pointers,
//! 4. slides the live blocks down and hands back the new allocation pointer.
//!
//! The phases live in [`policy::markcompactspace`]; [`plan::MarkCompact`] runs them as
//! work packets. Rust callers use [`memory_manager`]; compiled programs use the
//! `extern "C"` functions in [`api`].

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub mod api;
pub mod memory_manager;
pub mod plan;
pub mod policy;
pub mod scheduler;
pub mod util;
pub mod vm;

pub use crate::memory_manager::{AllocationError, GcContext};
pub use crate::plan::MarkCompact;
pub use crate::policy::markcompactspace::MarkCompactSpace;
pub use crate::vm::MutatorStack;
