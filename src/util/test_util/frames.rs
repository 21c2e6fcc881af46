//! The mutator's stack layout. Only names `usize`, so that the integration tests can
//! include this file as well.

pub const RETURN_ADDRESS: usize = 0x0ada_dad0;

const BYTES_IN_SLOT: usize = std::mem::size_of::<usize>();

pub struct FrameLayout {
    pub words: Vec<usize>,
    /// Address of the innermost saved frame pointer, or the bottom for no frames.
    pub first_frame: usize,
    /// Word index of the first local of each frame.
    pub frame_starts: Vec<usize>,
}

/// Lay out `frames`, innermost first, from `top` upwards. Each frame is its locals
/// followed by the saved frame pointer and the return address; the last saved frame
/// pointer is the stack bottom.
pub fn lay_out_frames(top: usize, frames: &[Vec<usize>]) -> FrameLayout {
    let mut words = vec![];
    let mut links = vec![];
    let mut frame_starts = vec![];
    for locals in frames {
        frame_starts.push(words.len());
        words.extend_from_slice(locals);
        links.push(words.len());
        words.push(0);
        words.push(RETURN_ADDRESS);
    }
    let bottom = top + words.len() * BYTES_IN_SLOT;
    for (i, link) in links.iter().enumerate() {
        words[*link] = match links.get(i + 1) {
            Some(caller) => top + caller * BYTES_IN_SLOT,
            None => bottom,
        };
    }
    let first_frame = match links.first() {
        Some(link) => top + link * BYTES_IN_SLOT,
        None => bottom,
    };
    FrameLayout {
        words,
        first_frame,
        frame_starts,
    }
}
