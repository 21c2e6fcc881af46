use crate::policy::block::{BlockHeader, GcSlot, GC_SLOT_OFFSET, PAYLOAD_OFFSET};
use crate::util::constants::{Word, BYTES_IN_WORD, POISON_WORD};
use crate::util::conversions;
use crate::util::linear_scan::{BlockCursor, BlockIterator};
use crate::util::options::DeadSpaceTreatment;
use crate::util::Address;
use crate::vm::value::{tag_pointer, untag_pointer, Value};

/// The heap arena: a fixed run of words starting at `start`, of which `[start, cursor)`
/// holds blocks written by the mutator.
///
/// The space implements the three heap phases of a collection. Each phase leaves its
/// result in the blocks' GC slots for the next one:
///
/// 1. [`trace_mark_object`](Self::trace_mark_object) and
///    [`process_mark_queue`](Self::process_mark_queue) flag every reachable block `Live`.
/// 2. [`calculate_forwarding_pointer`](Self::calculate_forwarding_pointer) replaces `Live`
///    with the block's destination, then [`forward_word`](Self::forward_word) and
///    [`update_interior_references`](Self::update_interior_references) rewrite pointers.
/// 3. [`compact`](Self::compact) slides the live blocks down to their destinations.
pub struct MarkCompactSpace<'a> {
    start: Address,
    words: &'a mut [Word],
    /// Word index of the high-water mark.
    cursor: usize,
    /// One entry per word below the cursor, set where a block starts. Built by `prepare`.
    block_starts: Vec<bool>,
}

/// Result of the forwarding address calculation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ForwardingSummary {
    pub live_blocks: usize,
    pub live_words: usize,
}

impl<'a> MarkCompactSpace<'a> {
    /// View `words` as the heap arena starting at `start`. `cursor` is the high-water
    /// mark: everything below it must be blocks.
    pub fn new(start: Address, words: &'a mut [Word], cursor: Address) -> Self {
        debug_assert!(conversions::is_word_aligned(start), "unaligned heap start {}", start);
        let end = start.shift_words(words.len());
        let clamped = cursor.max(start).min(end).align_down(BYTES_IN_WORD);
        if clamped != cursor {
            warn!(
                "Heap cursor {} is outside the heap [{}, {}). Using {}.",
                cursor, start, end, clamped
            );
        }
        MarkCompactSpace {
            start,
            words,
            cursor: conversions::words_between(start, clamped),
            block_starts: vec![],
        }
    }

    pub fn start(&self) -> Address {
        self.start
    }

    pub fn end(&self) -> Address {
        self.start.shift_words(self.words.len())
    }

    /// The high-water mark.
    pub fn cursor(&self) -> Address {
        self.start.shift_words(self.cursor)
    }

    pub fn words(&self) -> &[Word] {
        &*self.words
    }

    pub fn address_of(&self, index: usize) -> Address {
        self.start.shift_words(index)
    }

    fn index_of(&self, addr: Address) -> usize {
        conversions::words_between(self.start, addr)
    }

    /// All blocks below the high-water mark, in address order.
    pub fn blocks(&self) -> BlockIterator<'_> {
        BlockIterator::new(&*self.words, 0, self.cursor)
    }

    pub fn header(&self, block: usize) -> BlockHeader {
        match BlockHeader::decode(self.words[block]) {
            Some(header) => header,
            None => unreachable!("word {} is not a block start", block),
        }
    }

    pub fn gc_slot(&self, block: usize) -> GcSlot {
        GcSlot::from_word(self.words[block + GC_SLOT_OFFSET])
    }

    fn set_gc_slot(&mut self, block: usize, slot: GcSlot) {
        self.words[block + GC_SLOT_OFFSET] = slot.to_word();
    }

    /// Record where blocks start. Must be called before the first phase of a collection.
    pub fn prepare(&mut self) {
        let mut block_starts = vec![false; self.cursor];
        for (block, _) in BlockIterator::new(&*self.words, 0, self.cursor) {
            block_starts[block] = true;
        }
        self.block_starts = block_starts;
    }

    /// The block a word refers to, if it looks like a pointer into this heap.
    ///
    /// The word must carry the pointer tag, and the address must be word aligned, below
    /// the high-water mark, and the start of a block. Anything else (numbers, booleans,
    /// functions, and pointer-tagged words naming other memory) is not followed. Stack
    /// slots are scanned conservatively, so a number that happens to pass this test is
    /// treated as a pointer.
    pub fn block_of(&self, word: Word) -> Option<usize> {
        debug_assert!(
            self.cursor == 0 || !self.block_starts.is_empty(),
            "space is not prepared"
        );
        let addr = untag_pointer(word)?;
        if addr < self.start || addr >= self.cursor() || !conversions::is_word_aligned(addr) {
            return None;
        }
        let block = self.index_of(addr);
        if self.block_starts[block] {
            Some(block)
        } else {
            None
        }
    }

    /// Flag a block live. Returns true and queues the block for scanning if it was not
    /// live before.
    pub fn trace_mark_object(&mut self, block: usize, queue: &mut Vec<usize>) -> bool {
        if self.gc_slot(block).is_marked() {
            return false;
        }
        self.set_gc_slot(block, GcSlot::Live);
        queue.push(block);
        true
    }

    /// [`trace_mark_object`](Self::trace_mark_object) the block `word` refers to, if any.
    pub fn trace_mark_word(&mut self, word: Word, queue: &mut Vec<usize>) -> bool {
        match self.block_of(word) {
            Some(block) => self.trace_mark_object(block, queue),
            None => false,
        }
    }

    /// Scan the payload of queued blocks, marking and queueing what they refer to, until
    /// the queue is empty. Returns the number of blocks scanned.
    pub fn process_mark_queue(&mut self, queue: &mut Vec<usize>) -> usize {
        let mut scanned = 0;
        while let Some(block) = queue.pop() {
            let size = self.header(block).size_in_words();
            for i in block + PAYLOAD_OFFSET..block + size {
                let word = self.words[i];
                self.trace_mark_word(word, queue);
            }
            scanned += 1;
        }
        scanned
    }

    /// Assign each live block its destination: the next free word of a compacted heap
    /// that keeps live blocks in address order. Dead blocks are not touched.
    pub fn calculate_forwarding_pointer(&mut self) -> ForwardingSummary {
        let mut to = 0;
        let mut live_blocks = 0;
        let mut blocks = BlockCursor::new(0, self.cursor);
        while let Some((block, header)) = blocks.next_block(&*self.words) {
            match self.gc_slot(block) {
                GcSlot::Unmarked => {}
                slot => {
                    debug_assert_eq!(slot, GcSlot::Live, "block {} forwarded twice", block);
                    let dest = self.address_of(to);
                    self.set_gc_slot(block, GcSlot::ForwardedTo(dest));
                    to += header.size_in_words();
                    live_blocks += 1;
                }
            }
        }
        ForwardingSummary {
            live_blocks,
            live_words: to,
        }
    }

    /// The value `word` should hold once compaction is done: the destination of the block
    /// it refers to, or the word itself if it refers to no forwarded block.
    pub fn forward_word(&self, word: Word) -> Word {
        match self.block_of(word).map(|block| self.gc_slot(block)) {
            Some(GcSlot::ForwardedTo(dest)) => tag_pointer(dest),
            _ => word,
        }
    }

    /// Rewrite every pointer in the payload of every live block to its destination.
    /// Only valid once forwarding addresses exist for the whole heap. Returns the number
    /// of rewritten words.
    pub fn update_interior_references(&mut self) -> usize {
        let mut updated = 0;
        let mut blocks = BlockCursor::new(0, self.cursor);
        while let Some((block, header)) = blocks.next_block(&*self.words) {
            if !self.gc_slot(block).is_marked() {
                continue;
            }
            for i in block + PAYLOAD_OFFSET..block + header.size_in_words() {
                let word = self.words[i];
                let forwarded = self.forward_word(word);
                if forwarded != word {
                    self.words[i] = forwarded;
                    updated += 1;
                }
            }
        }
        updated
    }

    /// Move every live block to its destination and reset its GC slot. Words between the
    /// new and the old high-water mark are treated according to `dead_space`. Returns the
    /// new high-water mark, which is where the mutator continues allocating.
    pub fn compact(&mut self, dead_space: DeadSpaceTreatment) -> Address {
        let mut to = 0;
        let mut blocks = BlockCursor::new(0, self.cursor);
        while let Some((block, header)) = blocks.next_block(&*self.words) {
            let GcSlot::ForwardedTo(dest) = self.gc_slot(block) else {
                continue;
            };
            let dest = self.index_of(dest);
            debug_assert_eq!(dest, to, "block {} is not forwarded in address order", block);
            let size = header.size_in_words();
            // destinations never lie above the source, and everything below the source
            // has already been moved
            if dest != block {
                self.words.copy_within(block..block + size, dest);
            }
            self.set_gc_slot(dest, GcSlot::Unmarked);
            to = dest + size;
        }

        let old_cursor = self.cursor;
        match dead_space {
            DeadSpaceTreatment::Poison => self.words[to..old_cursor].fill(POISON_WORD),
            DeadSpaceTreatment::Zero => self.words[to..old_cursor].fill(0),
            DeadSpaceTreatment::Keep => {}
        }
        self.cursor = to;
        self.block_starts.clear();
        debug!(
            "Compacted heap: cursor {} -> {}, reclaimed {} words",
            self.address_of(old_cursor),
            self.cursor(),
            old_cursor - to
        );
        self.cursor()
    }

    /// Dump every allocated word at trace level.
    pub fn dump(&self, label: &str) {
        if !log_enabled!(log::Level::Trace) {
            return;
        }
        trace!("{}: heap [{}, {}), cursor {}", label, self.start(), self.end(), self.cursor());
        for line in self.dump_lines() {
            trace!("  {}", line);
        }
    }

    /// One line per allocated word: index, address, raw word and decoded value.
    pub fn dump_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.words[..self.cursor]
            .iter()
            .enumerate()
            .map(|(i, word)| format!("{}/{}: {:#x} ({:?})", i, self.address_of(i), word, Value::decode(*word)))
    }
}
