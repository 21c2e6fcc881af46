use static_assertions::const_assert;

/// log2 of the number of bytes in a word
pub const LOG_BYTES_IN_WORD: u8 = 3;
/// The number of bytes in a word
pub const BYTES_IN_WORD: usize = 1 << LOG_BYTES_IN_WORD;

/// A machine word as seen by the mutator: every stack slot and heap cell holds one.
pub type Word = usize;

/// Number of low bits used by the value tags.
pub const LOG_TAG_BITS: usize = 3;

// Block addresses must keep the three tag bits free. Every block starts on a word
// boundary, so a word must span at least 2^3 bytes.
const_assert!(BYTES_IN_WORD >= 1 << LOG_TAG_BITS);

/// Fill pattern for heap words that no longer belong to a live block. It decodes as a
/// number, never as a pointer, and stands out in heap dumps.
pub const POISON_WORD: Word = 0x0cab_005e;

/// The default number of stack frames the root scanner walks before it gives up on a
/// (presumably corrupt) frame chain.
pub const DEFAULT_MAX_STACK_FRAMES: usize = 1 << 20;
