// Not every test uses every helper.
#![allow(dead_code)]

use tagheap::policy::block::{BlockHeader, PAYLOAD_OFFSET};
use tagheap::util::constants::{Word, BYTES_IN_WORD};
use tagheap::util::Address;
use tagheap::vm::value::tag_pointer;
use tagheap::{MarkCompactSpace, MutatorStack};

pub const HEAP_START: Address = Address::from_usize(0x1000_0000);
pub const STACK_TOP: Address = Address::from_usize(0x7000_0000);

/// A heap buffer filled by bumping a cursor, as compiled code does.
pub struct Heap {
    pub words: Vec<Word>,
    pub cursor: usize,
}

impl Heap {
    pub fn new(capacity: usize) -> Self {
        Heap {
            words: vec![0; capacity],
            cursor: 0,
        }
    }

    pub fn address(&self, index: usize) -> Address {
        HEAP_START.shift_words(index)
    }

    pub fn pointer(&self, index: usize) -> Word {
        tag_pointer(self.address(index))
    }

    pub fn alloc(&mut self, header: BlockHeader, fields: &[Word]) -> usize {
        let index = self.cursor;
        self.words[index] = header.to_word();
        self.words[index + 1] = 0;
        self.words[index + PAYLOAD_OFFSET..index + header.size_in_words()].copy_from_slice(fields);
        self.cursor += header.size_in_words();
        index
    }

    pub fn space(&mut self) -> MarkCompactSpace<'_> {
        let cursor = self.address(self.cursor);
        MarkCompactSpace::new(HEAP_START, &mut self.words, cursor)
    }

    pub fn set_cursor(&mut self, cursor: Address) {
        self.cursor = (cursor - HEAP_START) / BYTES_IN_WORD;
    }
}

#[path = "../../src/util/test_util/frames.rs"]
mod frames;

/// A stack of frames, innermost first, laid out as compiled code lays it out.
pub struct Stack {
    pub words: Vec<Word>,
    pub first_frame: Address,
    /// Word index of the first local of each frame.
    pub frame_starts: Vec<usize>,
}

impl Stack {
    pub fn new(frames: &[Vec<Word>]) -> Self {
        let layout = frames::lay_out_frames(STACK_TOP.as_usize(), frames);
        Stack {
            words: layout.words,
            first_frame: Address::from_usize(layout.first_frame),
            frame_starts: layout.frame_starts,
        }
    }

    pub fn view(&mut self) -> MutatorStack<'_> {
        MutatorStack::new(STACK_TOP, &mut self.words)
    }

    /// The `n`th local of frame `frame`.
    pub fn local(&self, frame: usize, n: usize) -> Word {
        self.words[self.frame_starts[frame] + n]
    }
}
