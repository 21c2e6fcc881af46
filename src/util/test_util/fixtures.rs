// Not every test uses every helper.
#![allow(dead_code)]

use super::frames::lay_out_frames;
use crate::policy::block::{BlockHeader, GC_SLOT_OFFSET, PAYLOAD_OFFSET};
use crate::policy::markcompactspace::MarkCompactSpace;
use crate::util::constants::Word;
use crate::util::Address;
use crate::vm::value::{tag_pointer, untag_pointer};
use crate::vm::MutatorStack;

/// A heap buffer that allocates blocks the way the mutator's generated code does:
/// bump the cursor, write the header, zero the GC slot, write the payload.
pub struct MockHeap {
    pub start: Address,
    pub words: Vec<Word>,
    cursor: usize,
}

impl MockHeap {
    pub fn new(start: Address, capacity: usize) -> Self {
        MockHeap {
            start,
            words: vec![0; capacity],
            cursor: 0,
        }
    }

    /// Wrap words that were laid out by hand. The whole buffer counts as allocated.
    pub fn from_words(start: Address, words: Vec<Word>) -> Self {
        let cursor = words.len();
        MockHeap {
            start,
            words,
            cursor,
        }
    }

    pub fn cursor(&self) -> Address {
        self.start.shift_words(self.cursor)
    }

    /// Word index of the next allocation.
    pub fn cursor_index(&self) -> usize {
        self.cursor
    }

    /// The tagged pointer to the block at word `index`.
    pub fn pointer_to(&self, index: usize) -> Word {
        tag_pointer(self.start.shift_words(index))
    }

    /// The word index of the block a tagged pointer refers to.
    pub fn index_of(&self, pointer: Word) -> usize {
        let block = untag_pointer(pointer).expect("not a pointer");
        (block - self.start) / crate::util::constants::BYTES_IN_WORD
    }

    fn alloc(&mut self, header: BlockHeader, fields: &[Word]) -> Word {
        let index = self.cursor;
        let size = header.size_in_words();
        assert!(index + size <= self.words.len(), "mock heap is full");
        self.words[index] = header.to_word();
        self.words[index + GC_SLOT_OFFSET] = 0;
        self.words[index + PAYLOAD_OFFSET..index + size].copy_from_slice(fields);
        self.cursor += size;
        self.pointer_to(index)
    }

    pub fn pair(&mut self, first: Word, second: Word) -> Word {
        self.alloc(BlockHeader::pair(), &[first, second])
    }

    pub fn tuple(&mut self, fields: &[Word]) -> Word {
        self.alloc(BlockHeader::tuple(fields.len()), fields)
    }

    /// Read a payload field of a block.
    pub fn field(&self, pointer: Word, i: usize) -> Word {
        self.words[self.index_of(pointer) + PAYLOAD_OFFSET + i]
    }

    pub fn set_field(&mut self, pointer: Word, i: usize, value: Word) {
        let index = self.index_of(pointer);
        self.words[index + PAYLOAD_OFFSET + i] = value;
    }

    pub fn space(&mut self) -> MarkCompactSpace<'_> {
        let cursor = self.cursor();
        MarkCompactSpace::new(self.start, &mut self.words, cursor)
    }

    /// Adopt the cursor a collection returned.
    pub fn set_cursor(&mut self, cursor: Address) {
        self.cursor = (cursor - self.start) / crate::util::constants::BYTES_IN_WORD;
    }
}

/// Lays out a stack the way the mutator's calling convention does. Frames are added
/// innermost first.
pub struct MockStackBuilder {
    top: Address,
    frames: Vec<Vec<Word>>,
}

impl MockStackBuilder {
    pub fn new(top: Address) -> Self {
        MockStackBuilder {
            top,
            frames: vec![],
        }
    }

    pub fn frame(mut self, locals: &[Word]) -> Self {
        self.frames.push(locals.to_vec());
        self
    }

    /// The stack words and the innermost frame pointer.
    pub fn build(self) -> (Vec<Word>, Address) {
        let layout = lay_out_frames(self.top.as_usize(), &self.frames);
        (layout.words, Address::from_usize(layout.first_frame))
    }
}

/// A built stack together with its first frame.
pub struct MockStack {
    pub top: Address,
    pub words: Vec<Word>,
    pub first_frame: Address,
}

impl MockStack {
    pub fn new(builder: MockStackBuilder) -> Self {
        let top = builder.top;
        let (words, first_frame) = builder.build();
        MockStack {
            top,
            words,
            first_frame,
        }
    }

    pub fn view(&mut self) -> MutatorStack<'_> {
        MutatorStack::new(self.top, &mut self.words)
    }

    /// The word of the `n`th local of the innermost frame.
    pub fn local(&self, n: usize) -> Word {
        self.words[n]
    }
}
