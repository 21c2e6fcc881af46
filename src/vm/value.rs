//! The tagged value representation shared by the mutator and the collector.
//!
//! Every stack slot and heap cell holds one machine word. Its low bits tell what it is:
//!
//! | pattern                 | meaning                                       |
//! |-------------------------|-----------------------------------------------|
//! | `xxx0`                  | number, payload is the word shifted right by 1 |
//! | [`TRUE`] / [`FALSE`]    | boolean sentinels                              |
//! | `x001`                  | heap pointer, block address is `word - 1`      |
//! | `x101`                  | function or closure, opaque to the collector   |
//!
//! Any other pattern is invalid and is never dereferenced.

use crate::util::constants::{Word, LOG_TAG_BITS};
use crate::util::Address;

/// Mask selecting the three tag bits.
pub const TAG_MASK: Word = (1 << LOG_TAG_BITS) - 1;
/// Mask selecting the number tag bit.
pub const NUMBER_TAG_MASK: Word = 0b1;
/// Tag of a heap pointer.
pub const POINTER_TAG: Word = 0b001;
/// Tag of a function or closure value.
pub const FUNCTION_TAG: Word = 0b101;
/// The boolean `true` sentinel.
pub const TRUE: Word = Word::MAX;
/// The boolean `false` sentinel.
pub const FALSE: Word = Word::MAX >> 1;

/// A decoded word.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Number(isize),
    Boolean(bool),
    /// Address of the referenced block's header.
    Pointer(Address),
    /// The raw word of a function value. The collector never looks inside it.
    Function(Word),
    Invalid(Word),
}

impl Value {
    pub fn decode(word: Word) -> Value {
        if word & NUMBER_TAG_MASK == 0 {
            Value::Number((word as isize) >> 1)
        } else if word == TRUE {
            Value::Boolean(true)
        } else if word == FALSE {
            Value::Boolean(false)
        } else if word & TAG_MASK == POINTER_TAG {
            Value::Pointer(Address::from_usize(word - POINTER_TAG))
        } else if word & TAG_MASK == FUNCTION_TAG {
            Value::Function(word)
        } else {
            Value::Invalid(word)
        }
    }

    pub fn encode(self) -> Word {
        match self {
            Value::Number(n) => encode_number(n),
            Value::Boolean(true) => TRUE,
            Value::Boolean(false) => FALSE,
            Value::Pointer(addr) => tag_pointer(addr),
            Value::Function(word) | Value::Invalid(word) => word,
        }
    }
}

/// Encode a number. The top bit of `n` is lost, as in the mutator's own arithmetic.
pub const fn encode_number(n: isize) -> Word {
    (n << 1) as Word
}

/// Tag a block address as a heap pointer.
pub fn tag_pointer(block: Address) -> Word {
    debug_assert!(
        block & TAG_MASK == 0,
        "block address {} collides with the tag bits",
        block
    );
    block | POINTER_TAG
}

/// Does the word carry the heap pointer tag? This says nothing about whether the
/// address it names is inside the heap.
pub const fn has_pointer_tag(word: Word) -> bool {
    word & TAG_MASK == POINTER_TAG
}

/// The block address of a pointer-tagged word.
pub fn untag_pointer(word: Word) -> Option<Address> {
    if has_pointer_tag(word) {
        Some(Address::from_usize(word - POINTER_TAG))
    } else {
        None
    }
}
