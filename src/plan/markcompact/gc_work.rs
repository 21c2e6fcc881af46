use crate::scheduler::GCWork;
use crate::scheduler::GCWorker;
use crate::util::Address;
use crate::vm::scan_stack_roots;

/// Build the block-start table of the space.
pub struct Prepare;

impl GCWork for Prepare {
    fn do_work(&mut self, worker: &mut GCWorker) {
        if worker.options.heap_dump {
            worker.space.dump("Before GC");
        }
        worker.space.prepare();
        worker.stats.blocks = worker.space.blocks().count();
    }
}

/// Walk the frame chain and record every root slot.
pub struct ScanStackRoots;

impl GCWork for ScanStackRoots {
    fn do_work(&mut self, worker: &mut GCWorker) {
        let mut roots = vec![];
        let frames = scan_stack_roots(
            worker.stack,
            worker.first_frame,
            worker.options.max_stack_frames,
            &mut |slot: Address| roots.push(slot),
        );
        debug!("Found {} root slots in {} frames", roots.len(), frames);
        worker.stats.frames = frames;
        worker.stats.root_slots = roots.len();
        worker.roots = roots;
    }
}

/// Mark every block reachable from the roots.
pub struct MarkRoots;

impl GCWork for MarkRoots {
    fn do_work(&mut self, worker: &mut GCWorker) {
        let mut queue = std::mem::take(&mut worker.mark_queue);
        let mut traced = vec![];
        for slot in &worker.roots {
            // roots come from the scan of this very stack
            let Some(word) = worker.stack.load(*slot) else {
                continue;
            };
            if let Some(block) = worker.space.block_of(word) {
                worker.space.trace_mark_object(block, &mut queue);
                traced.push(*slot);
            }
        }
        trace!("{} of {} root slots refer to blocks", traced.len(), worker.roots.len());
        worker.mark_queue = queue;
        worker.traced_roots = traced;
    }
}

/// Drain the mark queue.
pub struct TransitiveClosure;

impl GCWork for TransitiveClosure {
    fn do_work(&mut self, worker: &mut GCWorker) {
        let scanned = worker.space.process_mark_queue(&mut worker.mark_queue);
        trace!("Scanned {} live blocks", scanned);
    }
}

/// Give every live block its destination, in address order.
pub struct CalculateForwardingAddress;

impl GCWork for CalculateForwardingAddress {
    fn do_work(&mut self, worker: &mut GCWorker) {
        let summary = worker.space.calculate_forwarding_pointer();
        worker.stats.live_blocks = summary.live_blocks;
        worker.stats.live_words = summary.live_words;
    }
}

/// Point the roots and the payload of live blocks at the destinations.
pub struct UpdateReferences;

impl GCWork for UpdateReferences {
    fn do_work(&mut self, worker: &mut GCWorker) {
        let mut updated_roots = 0;
        for slot in &worker.traced_roots {
            let Some(word) = worker.stack.load(*slot) else {
                continue;
            };
            let forwarded = worker.space.forward_word(word);
            if forwarded != word && worker.stack.store(*slot, forwarded) {
                updated_roots += 1;
            }
        }
        worker.stats.updated_roots = updated_roots;
        worker.stats.updated_fields = worker.space.update_interior_references();
    }
}

/// Slide live blocks down to their destinations and treat the freed tail.
pub struct Compact;

impl GCWork for Compact {
    fn do_work(&mut self, worker: &mut GCWorker) {
        let old_cursor = worker.space.cursor();
        let new_cursor = worker.space.compact(worker.options.dead_space);
        worker.stats.reclaimed_words = crate::util::conversions::words_between(new_cursor, old_cursor);
        worker.new_cursor = Some(new_cursor);
    }
}

/// Check the compacted heap.
pub struct Release;

impl GCWork for Release {
    fn do_work(&mut self, worker: &mut GCWorker) {
        if worker.options.heap_dump {
            worker.space.dump("After GC");
        }
        if cfg!(feature = "sanity") || worker.options.verify_heap {
            if let Err(e) = crate::util::sanity::verify_heap(worker.stack, &worker.traced_roots, worker.space) {
                panic!("Heap verification failed after GC: {}", e);
            }
            debug!("Heap verification passed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::block::GcSlot;
    use crate::scheduler::GCWorker;
    use crate::util::options::Options;
    use crate::util::test_util::fixtures::{MockHeap, MockStack, MockStackBuilder};
    use crate::util::test_util::TestRegion;
    use crate::vm::value::{encode_number, tag_pointer};

    #[test]
    fn packets_in_stage_order() {
        let mut heap = MockHeap::new(TestRegion::HEAP.start, 16);
        let _dead = heap.pair(0, 0);
        let live = heap.pair(encode_number(3), 0);
        let mut stack = MockStack::new(MockStackBuilder::new(TestRegion::STACK.start).frame(&[live]));
        let first_frame = stack.first_frame;
        let options = Options::default();
        let mut view = stack.view();
        let mut space = heap.space();
        let mut worker = GCWorker::new(&mut view, &mut space, first_frame, &options);

        Prepare.do_work(&mut worker);
        assert_eq!(worker.stats.blocks, 2);

        ScanStackRoots.do_work(&mut worker);
        assert_eq!(worker.roots, vec![TestRegion::STACK.start]);
        assert_eq!(worker.stats.frames, 1);

        MarkRoots.do_work(&mut worker);
        assert_eq!(worker.mark_queue, vec![4]);
        assert_eq!(worker.traced_roots, vec![TestRegion::STACK.start]);
        TransitiveClosure.do_work(&mut worker);
        assert!(worker.mark_queue.is_empty());
        assert_eq!(worker.space.gc_slot(4), GcSlot::Live);

        CalculateForwardingAddress.do_work(&mut worker);
        assert_eq!(worker.stats.live_words, 4);

        UpdateReferences.do_work(&mut worker);
        assert_eq!(worker.stats.updated_roots, 1);
        assert_eq!(worker.stats.updated_fields, 0);

        Compact.do_work(&mut worker);
        assert_eq!(worker.new_cursor, Some(TestRegion::HEAP.start.shift_words(4)));
        assert_eq!(worker.stats.reclaimed_words, 4);

        Release.do_work(&mut worker);
        drop(worker);
        drop(space);
        drop(view);
        assert_eq!(stack.local(0), tag_pointer(TestRegion::HEAP.start));
        assert_eq!(heap.words[2], encode_number(3));
    }

    #[test]
    fn stale_root_words_are_neither_traced_nor_verified() {
        let mut heap = MockHeap::new(TestRegion::HEAP.start, 16);
        let live = heap.pair(encode_number(1), 0);
        let _dead = heap.pair(0, 0);
        // past the cursor but inside the heap, and the middle of the live pair
        let past_cursor = tag_pointer(TestRegion::HEAP.start.shift_words(12));
        let interior = live + 8;
        let mut stack =
            MockStack::new(MockStackBuilder::new(TestRegion::STACK.start).frame(&[past_cursor, interior, live]));
        let first_frame = stack.first_frame;
        let mut options = Options::default();
        options.verify_heap = true;
        let mut view = stack.view();
        let mut space = heap.space();
        let mut worker = GCWorker::new(&mut view, &mut space, first_frame, &options);

        Prepare.do_work(&mut worker);
        ScanStackRoots.do_work(&mut worker);
        assert_eq!(worker.roots.len(), 3);
        MarkRoots.do_work(&mut worker);
        assert_eq!(worker.traced_roots, vec![TestRegion::STACK.start.shift_words(2)]);
        TransitiveClosure.do_work(&mut worker);
        CalculateForwardingAddress.do_work(&mut worker);
        UpdateReferences.do_work(&mut worker);
        assert_eq!(worker.stats.updated_roots, 0);
        Compact.do_work(&mut worker);
        Release.do_work(&mut worker);
        drop(worker);
        drop(space);
        drop(view);
        assert_eq!(stack.local(0), past_cursor);
        assert_eq!(stack.local(1), interior);
        assert_eq!(stack.local(2), live);
    }
}
