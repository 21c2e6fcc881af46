//! Heap verification after a collection.
//!
//! Payload words are checked strictly: a pointer-tagged word that names heap memory must
//! name a block start below the cursor. Root slots are checked the same way, so callers
//! pass only the slots they expect to hold real pointers. After a collection those are
//! the slots the collector followed; stale stack words it left alone are not passed.

use crate::policy::block::{GcSlot, PAYLOAD_OFFSET};
use crate::policy::markcompactspace::MarkCompactSpace;
use crate::util::constants::Word;
use crate::util::Address;
use crate::vm::value::untag_pointer;
use crate::vm::MutatorStack;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SanityError {
    /// A block below the high-water mark still carries collector state in its GC slot.
    StaleGcSlot { block: Address, slot: GcSlot },
    /// The blocks do not tile `[start, cursor)`.
    BrokenBlockChain { parsed_up_to: Address, cursor: Address },
    /// A root slot or payload word refers into the heap but not to a block start below
    /// the high-water mark.
    DanglingPointer { location: Address, value: Word },
}

impl fmt::Display for SanityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SanityError::StaleGcSlot { block, slot } => {
                write!(f, "block {} has GC slot {:?} after collection", block, slot)
            }
            SanityError::BrokenBlockChain {
                parsed_up_to,
                cursor,
            } => write!(
                f,
                "heap blocks end at {}, but the heap cursor is {}",
                parsed_up_to, cursor
            ),
            SanityError::DanglingPointer { location, value } => {
                write!(f, "{} holds dangling heap pointer {:#x}", location, value)
            }
        }
    }
}

impl std::error::Error for SanityError {}

/// Check that the heap below the cursor is a chain of idle blocks, and that every root
/// and every payload word that refers into the heap refers to one of them.
pub fn verify_heap(
    stack: &MutatorStack,
    roots: &[Address],
    space: &mut MarkCompactSpace,
) -> Result<(), SanityError> {
    space.prepare();

    let mut parsed = 0;
    for (block, header) in space.blocks() {
        let slot = space.gc_slot(block);
        if slot != GcSlot::Unmarked {
            return Err(SanityError::StaleGcSlot {
                block: space.address_of(block),
                slot,
            });
        }
        for i in block + PAYLOAD_OFFSET..block + header.size_in_words() {
            check_reference(space, space.address_of(i), space.words()[i])?;
        }
        parsed = block + header.size_in_words();
    }
    if space.address_of(parsed) != space.cursor() {
        return Err(SanityError::BrokenBlockChain {
            parsed_up_to: space.address_of(parsed),
            cursor: space.cursor(),
        });
    }

    for slot in roots {
        if let Some(value) = stack.load(*slot) {
            check_reference(space, *slot, value)?;
        }
    }
    Ok(())
}

fn check_reference(space: &MarkCompactSpace, location: Address, value: Word) -> Result<(), SanityError> {
    let Some(target) = untag_pointer(value) else {
        return Ok(());
    };
    let in_heap = target >= space.start() && target < space.end();
    if in_heap && space.block_of(value).is_none() {
        return Err(SanityError::DanglingPointer { location, value });
    }
    Ok(())
}
