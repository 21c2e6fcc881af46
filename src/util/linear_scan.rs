use crate::policy::block::BlockHeader;
use crate::util::constants::Word;

/// Walks the blocks of a heap buffer in increasing address order, by reading each
/// header to find the next one.
///
/// The cursor does not borrow the buffer, so the caller may rewrite blocks it has already
/// passed (the compactor slides them down) between calls. Blocks at and after the cursor
/// must stay intact.
///
/// A header that does not decode, or a block running past `end`, ends the walk.
pub struct BlockCursor {
    cursor: usize,
    end: usize,
}

impl BlockCursor {
    /// Walk the blocks in `[start, end)`, both word indices.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        BlockCursor { cursor: start, end }
    }

    /// The next block's index and header.
    pub fn next_block(&mut self, words: &[Word]) -> Option<(usize, BlockHeader)> {
        if self.cursor >= self.end {
            return None;
        }
        let index = self.cursor;
        let Some(header) = BlockHeader::decode(words[index]) else {
            warn!(
                "Invalid block header {:#x} at word {}. Ignoring words {}..{}.",
                words[index], index, index, self.end
            );
            self.cursor = self.end;
            return None;
        };
        let size = header.size_in_words();
        if index + size > self.end {
            warn!(
                "Block at word {} ({} words) runs past the heap cursor {}. Ignoring it.",
                index, size, self.end
            );
            self.cursor = self.end;
            return None;
        }
        self.cursor = index + size;
        Some((index, header))
    }
}

/// Iterate over the blocks of an immutable heap buffer.
pub struct BlockIterator<'a> {
    words: &'a [Word],
    cursor: BlockCursor,
}

impl<'a> BlockIterator<'a> {
    pub fn new(words: &'a [Word], start: usize, end: usize) -> Self {
        BlockIterator {
            words,
            cursor: BlockCursor::new(start, end),
        }
    }
}

impl<'a> std::iter::Iterator for BlockIterator<'a> {
    type Item = (usize, BlockHeader);

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_block(self.words)
    }
}
