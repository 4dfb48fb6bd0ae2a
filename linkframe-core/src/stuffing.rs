//! Bit stuffing: a `0` after every run of five `1`s
//!
//! The stuffed form is only used for display; the data field travels
//! unstuffed. Frames annotate the most recent insertion only (see
//! [`Stuffed::last_inserted`]); [`Stuffed::inserted`] keeps every position for
//! callers that need them.

use crate::bits::BitString;
use crate::constants::STUFFING_RUN;
use alloc::vec::Vec;

/// Output of [`stuff`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stuffed {
    /// Bits with markers inserted
    pub bits: BitString,

    /// Index (into `bits`) of the last inserted marker
    pub last_inserted: Option<usize>,

    /// Indices (into `bits`) of every inserted marker, ascending
    pub inserted: Vec<usize>,
}

/// Insert a `0` after every run of five consecutive `1`s
pub fn stuff(bits: &BitString) -> Stuffed {
    let mut out = BitString::new();
    let mut inserted = Vec::new();
    let mut run = 0;

    for bit in bits.iter() {
        out.push(bit);
        if bit {
            run += 1;
            if run == STUFFING_RUN {
                out.push(false);
                inserted.push(out.len() - 1);
                run = 0;
            }
        } else {
            run = 0;
        }
    }

    Stuffed {
        last_inserted: inserted.last().copied(),
        bits: out,
        inserted,
    }
}

/// Remove the markers inserted by [`stuff`]
///
/// The bit following five consecutive `1`s is assumed to be a marker and is
/// dropped whatever its value.
pub fn destuff(bits: &BitString) -> BitString {
    let mut out = BitString::new();
    let mut run = 0;
    let mut skip_next = false;

    for bit in bits.iter() {
        if skip_next {
            skip_next = false;
            continue;
        }
        out.push(bit);
        if bit {
            run += 1;
            if run == STUFFING_RUN {
                skip_next = true;
                run = 0;
            }
        } else {
            run = 0;
        }
    }

    out
}

/// Length of the longest run of consecutive `1`s
pub fn longest_run(bits: &BitString) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for bit in bits.iter() {
        if bit {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    fn bits(s: &str) -> BitString {
        s.parse().unwrap()
    }

    #[test]
    fn test_no_stuffing_needed() {
        let input = bits("1111011110");
        let stuffed = stuff(&input);
        assert_eq!(stuffed.bits, input);
        assert_eq!(stuffed.last_inserted, None);
        assert!(stuffed.inserted.is_empty());
    }

    #[test]
    fn test_two_runs() {
        let input = bits("111110111110");
        let stuffed = stuff(&input);
        assert_eq!(stuffed.bits.to_string(), "11111001111100");
        assert_eq!(stuffed.bits.len(), input.len() + 2);
        assert_eq!(stuffed.inserted, vec![5, 12]);
        assert_eq!(stuffed.last_inserted, Some(12));
        assert_eq!(destuff(&stuffed.bits), input);
    }

    #[test]
    fn test_long_run_restarts_count() {
        let input = bits("111111111111");
        let stuffed = stuff(&input);
        assert_eq!(stuffed.bits.to_string(), "11111011111011");
        assert_eq!(stuffed.inserted, vec![5, 11]);
        assert!(longest_run(&stuffed.bits) <= 5);
        assert_eq!(destuff(&stuffed.bits), input);
    }

    #[test]
    fn test_run_at_end_gets_marker() {
        let stuffed = stuff(&bits("011111"));
        assert_eq!(stuffed.bits.to_string(), "0111110");
        assert_eq!(stuffed.last_inserted, Some(6));
    }

    #[test]
    fn test_destuff_drops_bit_after_five_ones() {
        // The dropped bit is assumed to be a marker even when it is a 1.
        assert_eq!(destuff(&bits("1111110")).to_string(), "111110");
    }

    #[test]
    fn test_empty() {
        let stuffed = stuff(&BitString::new());
        assert!(stuffed.bits.is_empty());
        assert!(destuff(&BitString::new()).is_empty());
        assert_eq!(longest_run(&BitString::new()), 0);
    }
}
