use crate::util::conversions;
use crate::util::Address;
use crate::vm::MutatorStack;

/// Callback trait of the stack scanner: called once per root slot, in increasing address order.
pub trait RootSlotVisitor {
    /// Call this function for each root slot.
    fn visit_root_slot(&mut self, slot: Address);
}

/// This lets us use closures as RootSlotVisitor.
impl<F: FnMut(Address)> RootSlotVisitor for F {
    fn visit_root_slot(&mut self, slot: Address) {
        self(slot)
    }
}

/// The two words at a frame pointer: the caller's saved frame pointer and the return address.
const FRAME_LINKAGE_WORDS: usize = 2;

/// Walk the saved-frame-pointer chain from `first_frame` towards the stack bottom and
/// report every local and temporary slot as a root slot.
///
/// For each frame, the slots between the scan cursor (initially the stack top) and the
/// frame pointer are roots. The saved frame pointer and the return address at the frame
/// pointer are skipped, and the walk continues from the saved frame pointer. It stops at
/// the stack bottom, which is never read.
///
/// The chain is expected to be strictly increasing. A link that goes backwards, leaves
/// the stack or is misaligned ends the walk with a warning, as does exceeding
/// `max_frames`. Slots already reported stay reported.
///
/// Returns the number of frames walked.
pub fn scan_stack_roots<V: RootSlotVisitor>(
    stack: &MutatorStack,
    first_frame: Address,
    max_frames: usize,
    visitor: &mut V,
) -> usize {
    let bottom = stack.bottom();
    let mut cursor = stack.top();
    let mut frame = first_frame;
    let mut frames = 0;

    while frame < bottom {
        if frame < cursor || !conversions::is_word_aligned(frame) {
            warn!(
                "Frame pointer {} is not inside the unscanned stack [{}, {}). Stop scanning.",
                frame, cursor, bottom
            );
            break;
        }
        if frames == max_frames {
            warn!("Walked {} frames without reaching the stack bottom. Stop scanning.", frames);
            break;
        }
        let linkage_end = frame.shift_words(FRAME_LINKAGE_WORDS);
        if linkage_end > bottom {
            warn!("Frame {} overlaps the stack bottom {}. Stop scanning.", frame, bottom);
            break;
        }

        let mut slot = cursor;
        while slot < frame {
            visitor.visit_root_slot(slot);
            slot = slot.shift_words(1);
        }

        // the frame is inside the stack, so this always succeeds
        let Some(link) = stack.load(frame) else {
            break;
        };
        let next = Address::from_usize(link);
        trace!("Frame {}: {} root slots, caller frame {}", frame, conversions::words_between(cursor, frame), next);
        frames += 1;
        if next <= frame {
            warn!("Frame chain goes backwards at {} (saved frame pointer {}). Stop scanning.", frame, next);
            break;
        }
        cursor = linkage_end;
        frame = next;
    }
    frames
}
