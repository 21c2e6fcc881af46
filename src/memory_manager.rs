//! Mutator-to-collector interface: safe Rust APIs.
//!
//! The runtime owns its heap and its stack. Whenever it calls into the collector it
//! lends both as word slices, together with the addresses they live at. The unsafe
//! step of turning raw runtime pointers into those slices happens in [`crate::api`].

use crate::plan::MarkCompact;
use crate::policy::markcompactspace::MarkCompactSpace;
use crate::util::constants::BYTES_IN_WORD;
use crate::util::conversions;
use crate::util::sanity::{self, SanityError};
use crate::util::Address;
use crate::vm::{scan_stack_roots, MutatorStack};
use std::fmt;

/// Why an allocation could not be satisfied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AllocationError {
    /// The heap was empty and the request still does not fit.
    TooLargeForHeap { words_needed: usize, heap_words: usize },
    /// A collection did not free enough room.
    OutOfMemory { words_needed: usize, words_free: usize },
}

impl AllocationError {
    /// The status the runtime exits with.
    pub fn exit_code(&self) -> i32 {
        match self {
            AllocationError::TooLargeForHeap { .. } => 10,
            AllocationError::OutOfMemory { .. } => 9,
        }
    }
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AllocationError::TooLargeForHeap {
                words_needed,
                heap_words,
            } => write!(
                f,
                "Allocation of {} words too large for {}-word heap",
                words_needed, heap_words
            ),
            AllocationError::OutOfMemory {
                words_needed,
                words_free,
            } => write!(
                f,
                "Out of memory: needed {} words, but only {} remain after collection",
                words_needed, words_free
            ),
        }
    }
}

impl std::error::Error for AllocationError {}

/// Initialize the logger. A runtime that installs its own logger should do so first.
pub fn init_logger() {
    match crate::util::logger::try_init() {
        Ok(_) => debug!("tagheap initialized the logger."),
        Err(_) => debug!("tagheap failed to initialize the logger. Possibly a logger has been initialized by user."),
    }
}

/// Run a full collection. `space.cursor()` is the high-water mark. Returns the new one,
/// which `space` has adopted as well.
pub fn gc(plan: &mut MarkCompact, stack: &mut MutatorStack, first_frame: Address, space: &mut MarkCompactSpace) -> Address {
    plan.collect(stack, first_frame, space)
}

/// Make room for an allocation of `bytes_needed` bytes that did not fit below the heap
/// end. `space.cursor()` must be the allocation pointer the runtime stopped at.
///
/// Returns the allocation pointer to continue from, which leaves at least
/// `bytes_needed` bytes before the heap end.
pub fn try_gc(
    plan: &mut MarkCompact,
    stack: &mut MutatorStack,
    first_frame: Address,
    space: &mut MarkCompactSpace,
    bytes_needed: usize,
) -> Result<Address, AllocationError> {
    let words_needed = conversions::bytes_to_words_up(bytes_needed);
    let heap_words = space.words().len();
    if space.cursor() == space.start() {
        return Err(AllocationError::TooLargeForHeap {
            words_needed,
            heap_words,
        });
    }

    let new_cursor = gc(plan, stack, first_frame, space);
    let words_free = conversions::words_between(new_cursor, space.end());
    if words_needed > words_free {
        return Err(AllocationError::OutOfMemory {
            words_needed,
            words_free,
        });
    }
    Ok(new_cursor)
}

/// Check the heap and the roots of an idle mutator: every pointer that refers into the
/// heap refers to a block below the cursor, and no block carries collector state.
/// Every slot of the scanned frames is taken to be precise here, so a stale pointer-tagged
/// local that names heap memory is reported.
pub fn verify(stack: &MutatorStack, first_frame: Address, max_frames: usize, space: &mut MarkCompactSpace) -> Result<(), SanityError> {
    let mut roots = vec![];
    scan_stack_roots(stack, first_frame, max_frames, &mut |slot: Address| roots.push(slot));
    sanity::verify_heap(stack, &roots, space)
}

/// Where the runtime's heap and stack live. Recorded once at startup.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GcContext {
    pub heap_start: Address,
    pub heap_end: Address,
    /// The stack-bottom sentinel: the saved frame pointer that ends the frame chain.
    pub stack_bottom: Address,
}

impl GcContext {
    pub fn new(heap_start: Address, heap_words: usize, stack_bottom: Address) -> Self {
        GcContext {
            heap_start,
            heap_end: heap_start.shift_words(heap_words),
            stack_bottom,
        }
    }

    pub fn heap_words(&self) -> usize {
        conversions::words_between(self.heap_start, self.heap_end)
    }

    /// The number of stack words between `stack_top` and the stack bottom.
    pub fn stack_words(&self, stack_top: Address) -> usize {
        if stack_top > self.stack_bottom {
            warn!("Stack top {} is below the stack bottom {}.", stack_top, self.stack_bottom);
            return 0;
        }
        (self.stack_bottom - stack_top) / BYTES_IN_WORD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_util::fixtures::{MockHeap, MockStack, MockStackBuilder};
    use crate::util::test_util::TestRegion;

    #[test]
    fn try_gc_on_empty_heap_is_too_large() {
        let mut heap = MockHeap::new(TestRegion::HEAP.start, 8);
        let mut stack = MockStack::new(MockStackBuilder::new(TestRegion::STACK.start).frame(&[]));
        let first_frame = stack.first_frame;
        let mut plan = MarkCompact::default();
        let result = try_gc(&mut plan, &mut stack.view(), first_frame, &mut heap.space(), 80);
        let err = result.unwrap_err();
        assert_eq!(
            err,
            AllocationError::TooLargeForHeap {
                words_needed: 10,
                heap_words: 8
            }
        );
        assert_eq!(err.exit_code(), 10);
        assert_eq!(plan.stats().gc_count(), 0);
    }

    #[test]
    fn try_gc_out_of_memory() {
        let mut heap = MockHeap::new(TestRegion::HEAP.start, 8);
        let a = heap.pair(0, 0);
        let mut stack = MockStack::new(MockStackBuilder::new(TestRegion::STACK.start).frame(&[a]));
        let first_frame = stack.first_frame;
        let mut plan = MarkCompact::default();
        let result = try_gc(&mut plan, &mut stack.view(), first_frame, &mut heap.space(), 5 * BYTES_IN_WORD);
        let err = result.unwrap_err();
        assert_eq!(
            err,
            AllocationError::OutOfMemory {
                words_needed: 5,
                words_free: 4
            }
        );
        assert_eq!(err.exit_code(), 9);
        assert_eq!(
            err.to_string(),
            "Out of memory: needed 5 words, but only 4 remain after collection"
        );
    }

    #[test]
    fn try_gc_makes_room() {
        let mut heap = MockHeap::new(TestRegion::HEAP.start, 8);
        let _dead = heap.pair(0, 0);
        let a = heap.pair(0, 0);
        let mut stack = MockStack::new(MockStackBuilder::new(TestRegion::STACK.start).frame(&[a]));
        let first_frame = stack.first_frame;
        let mut plan = MarkCompact::default();
        let cursor = try_gc(&mut plan, &mut stack.view(), first_frame, &mut heap.space(), 4 * BYTES_IN_WORD);
        assert_eq!(cursor, Ok(TestRegion::HEAP.start.shift_words(4)));
        heap.set_cursor(TestRegion::HEAP.start.shift_words(4));
        let view = stack.view();
        assert_eq!(verify(&view, first_frame, usize::MAX, &mut heap.space()), Ok(()));
    }

    #[test]
    fn context_sizes() {
        let context = GcContext::new(TestRegion::HEAP.start, 16, TestRegion::STACK.start.shift_words(10));
        assert_eq!(context.heap_words(), 16);
        assert_eq!(context.heap_end, TestRegion::HEAP.start.shift_words(16));
        assert_eq!(context.stack_words(TestRegion::STACK.start), 10);
        assert_eq!(context.stack_words(TestRegion::STACK.start.shift_words(11)), 0);
    }
}
