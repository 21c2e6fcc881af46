//! Layout of a heap block.
//!
//! ```text
//! word 0        header   kind (bits 0..3), mutator flag (bit 3), payload count (bits 4..)
//! word 1        GC slot  0 = unmarked, 1 = live, dest | 1 = forwarded to dest
//! word 2..2+n   payload  tagged values
//! ```

use crate::util::constants::Word;
use crate::util::Address;
use crate::vm::value::{tag_pointer, untag_pointer};
use strum_macros::{Display, FromRepr};

/// Offset of the GC slot from the block start, in words.
pub const GC_SLOT_OFFSET: usize = 1;
/// Offset of the first payload word from the block start, in words.
pub const PAYLOAD_OFFSET: usize = 2;
/// Words in a block that are not payload.
pub const BLOCK_OVERHEAD_WORDS: usize = PAYLOAD_OFFSET;

const HEADER_KIND_MASK: Word = 0b111;
/// Owned by the mutator (its printer marks blocks it is visiting). The collector
/// copies it along with the rest of the header and never interprets it.
pub const HEADER_MUTATOR_FLAG: Word = 0b1000;
const LOG_HEADER_COUNT_SHIFT: usize = 4;

/// Number of payload words in a pair.
pub const PAIR_FIELDS: usize = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, FromRepr)]
#[repr(usize)]
pub enum BlockKind {
    /// A two-field pair. Its header carries no count.
    Pair = 1,
    /// A tuple whose payload count is stored in the header.
    Tuple = 2,
}

/// A decoded block header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockHeader(Word);

impl BlockHeader {
    /// Decode a header word. `None` if the kind bits name no block kind.
    pub fn decode(word: Word) -> Option<BlockHeader> {
        BlockKind::from_repr(word & HEADER_KIND_MASK).map(|_| BlockHeader(word))
    }

    pub const fn pair() -> BlockHeader {
        BlockHeader(BlockKind::Pair as Word)
    }

    pub const fn tuple(count: usize) -> BlockHeader {
        BlockHeader((count << LOG_HEADER_COUNT_SHIFT) | BlockKind::Tuple as Word)
    }

    pub fn kind(self) -> BlockKind {
        match BlockKind::from_repr(self.0 & HEADER_KIND_MASK) {
            Some(kind) => kind,
            None => unreachable!("header {:#x} was validated on decode", self.0),
        }
    }

    /// Number of payload words.
    pub fn count(self) -> usize {
        match self.kind() {
            BlockKind::Pair => PAIR_FIELDS,
            BlockKind::Tuple => self.0 >> LOG_HEADER_COUNT_SHIFT,
        }
    }

    /// Size of the whole block, header and GC slot included, in words.
    pub fn size_in_words(self) -> usize {
        BLOCK_OVERHEAD_WORDS + self.count()
    }

    pub const fn to_word(self) -> Word {
        self.0
    }
}

const GC_SLOT_UNMARKED: Word = 0;
const GC_SLOT_LIVE: Word = 1;

/// The reserved per-block GC word.
///
/// Mark moves a reachable block from `Unmarked` to `Live`. Forwarding replaces `Live`
/// with the block's destination. Compaction resets the moved block to `Unmarked`, which
/// is also how the mutator allocates it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GcSlot {
    Unmarked,
    Live,
    ForwardedTo(Address),
}

impl GcSlot {
    pub fn from_word(word: Word) -> GcSlot {
        match word {
            GC_SLOT_UNMARKED => GcSlot::Unmarked,
            GC_SLOT_LIVE => GcSlot::Live,
            _ => match untag_pointer(word) {
                Some(dest) => GcSlot::ForwardedTo(dest),
                None => {
                    debug_assert!(false, "corrupt GC slot {:#x}", word);
                    GcSlot::Unmarked
                }
            },
        }
    }

    pub fn to_word(self) -> Word {
        match self {
            GcSlot::Unmarked => GC_SLOT_UNMARKED,
            GcSlot::Live => GC_SLOT_LIVE,
            GcSlot::ForwardedTo(dest) => tag_pointer(dest),
        }
    }

    /// Was the block reached by the last mark?
    pub fn is_marked(self) -> bool {
        self != GcSlot::Unmarked
    }
}
