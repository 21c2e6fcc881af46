use crate::util::constants::*;
use crate::util::Address;

/* Alignment */

pub fn is_word_aligned(addr: Address) -> bool {
    addr.is_aligned_to(BYTES_IN_WORD)
}

pub const fn raw_align_down(val: usize, align: usize) -> usize {
    val & !align.wrapping_sub(1)
}

pub const fn raw_is_aligned(val: usize, align: usize) -> bool {
    val & align.wrapping_sub(1) == 0
}

/* Conversion */

pub const fn bytes_to_words_up(bytes: usize) -> usize {
    (bytes + BYTES_IN_WORD - 1) >> LOG_BYTES_IN_WORD
}

/// The number of whole words between `start` and `end`. `end` must not be lower than `start`.
pub fn words_between(start: Address, end: Address) -> usize {
    (end - start) >> LOG_BYTES_IN_WORD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_words_up() {
        assert_eq!(bytes_to_words_up(0), 0);
        assert_eq!(bytes_to_words_up(1), 1);
        assert_eq!(bytes_to_words_up(BYTES_IN_WORD), 1);
        assert_eq!(bytes_to_words_up(BYTES_IN_WORD + 1), 2);
    }

    #[test]
    fn test_words_between() {
        let start = Address::from_usize(0x1000);
        assert_eq!(words_between(start, start), 0);
        assert_eq!(words_between(start, start.shift_words(7)), 7);
    }

    #[test]
    fn test_word_alignment() {
        assert!(is_word_aligned(Address::from_usize(0x1000)));
        assert!(!is_word_aligned(Address::from_usize(0x1001)));
    }
}
