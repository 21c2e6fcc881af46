//! The mutator side of the collector: how its values are tagged, and how its stack is
//! laid out and scanned.

pub mod scanning;
pub mod value;

pub use self::scanning::{scan_stack_roots, RootSlotVisitor};

use crate::util::constants::{Word, BYTES_IN_WORD};
use crate::util::conversions;
use crate::util::Address;

/// A word view of the mutator's stack between the stack pointer (`top`, lowest address)
/// and the stack-bottom sentinel (exclusive). Root slots are addresses inside this range.
pub struct MutatorStack<'a> {
    top: Address,
    words: &'a mut [Word],
}

impl<'a> MutatorStack<'a> {
    /// View `words` as the stack slots starting at `top`.
    pub fn new(top: Address, words: &'a mut [Word]) -> Self {
        debug_assert!(conversions::is_word_aligned(top), "unaligned stack top {}", top);
        MutatorStack { top, words }
    }

    /// The current stack pointer.
    pub fn top(&self) -> Address {
        self.top
    }

    /// The stack-bottom sentinel. It is never read.
    pub fn bottom(&self) -> Address {
        self.top.shift_words(self.words.len())
    }

    pub fn contains(&self, slot: Address) -> bool {
        slot >= self.top && slot < self.bottom() && conversions::is_word_aligned(slot)
    }

    fn index_of(&self, slot: Address) -> Option<usize> {
        if self.contains(slot) {
            Some((slot - self.top) / BYTES_IN_WORD)
        } else {
            None
        }
    }

    /// Read a stack slot. `None` if the slot is outside the stack.
    pub fn load(&self, slot: Address) -> Option<Word> {
        self.index_of(slot).map(|i| self.words[i])
    }

    /// Overwrite a stack slot. Returns false if the slot is outside the stack.
    pub fn store(&mut self, slot: Address, value: Word) -> bool {
        match self.index_of(slot) {
            Some(i) => {
                self.words[i] = value;
                true
            }
            None => false,
        }
    }
}
