//! Hamming single-error-correcting code
//!
//! Codewords are systematic with interleaved parity: 1-based positions that
//! are powers of two carry parity, every other position carries a data bit
//! in its original order. The parity bit at position `2^i` is the XOR of all
//! codeword bits whose 1-based index has bit `i` set.
//!
//! Any single flipped bit is corrected. Two flipped bits produce a syndrome
//! that points at a third position (or past the end of the codeword); the
//! decoder then "corrects" the wrong bit and reports nothing unusual. That is
//! inherent to a distance-3 code and deliberately left undetected.

use crate::bits::BitString;
use crate::error::FormatError;
use alloc::vec;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Result of decoding a received codeword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    /// Data bits after correction
    pub data: BitString,

    /// 1-based position named by the syndrome, `None` for a clean codeword
    ///
    /// May exceed the codeword length after a multi-bit error, in which case
    /// no bit was flipped.
    pub error_position: Option<usize>,
}

impl Decoded {
    /// Whether the syndrome named a bit inside the codeword that was flipped
    pub fn corrected(&self, codeword_len: usize) -> bool {
        matches!(self.error_position, Some(p) if p <= codeword_len)
    }
}

/// Number of parity bits for `m` data bits: minimal `r` with `2^r >= m + r + 1`
pub fn parity_bits(m: usize) -> usize {
    let mut r = 0;
    while (1usize << r) < m + r + 1 {
        r += 1;
    }
    r
}

/// Codeword length for `m` data bits
pub fn codeword_len(m: usize) -> usize {
    m + parity_bits(m)
}

fn is_parity_position(position: usize) -> bool {
    position.is_power_of_two()
}

/// XOR of every bit whose 1-based index has `mask` set
fn check(codeword: &[bool], mask: usize) -> bool {
    codeword
        .iter()
        .enumerate()
        .filter(|(i, _)| (i + 1) & mask != 0)
        .fold(false, |acc, (_, &bit)| acc ^ bit)
}

/// Encode `data` into a Hamming codeword
pub fn encode(data: &BitString) -> BitString {
    let m = data.len();
    let r = parity_bits(m);
    let n = m + r;

    let mut codeword = vec![false; n];
    let mut source = data.iter();
    for (i, slot) in codeword.iter_mut().enumerate() {
        if !is_parity_position(i + 1) {
            // Counts match by construction of `r`.
            *slot = source.next().unwrap_or(false);
        }
    }

    for i in 0..r {
        let position = 1usize << i;
        codeword[position - 1] = check(&codeword, position);
    }

    BitString::from_bits(codeword)
}

/// Decode a received codeword, correcting at most one bit error
pub fn decode(codeword: &BitString) -> Result<Decoded, FormatError> {
    if codeword.is_empty() {
        return Err(FormatError::EmptyCodeword);
    }

    let mut bits: Vec<bool> = codeword.as_slice().to_vec();
    let n = bits.len();

    let syndrome: usize = (0..usize::BITS)
        .map(|i| 1usize << i)
        .take_while(|&position| position <= n)
        .filter(|&position| check(&bits, position))
        .sum();

    if syndrome != 0 && syndrome <= n {
        bits[syndrome - 1] = !bits[syndrome - 1];
    }

    let data = bits
        .iter()
        .enumerate()
        .filter(|(i, _)| !is_parity_position(i + 1))
        .map(|(_, &bit)| bit)
        .collect();

    Ok(Decoded {
        data,
        error_position: (syndrome != 0).then_some(syndrome),
    })
}

/// Parse `text` as a codeword and decode it
pub fn decode_str(text: &str) -> Result<Decoded, FormatError> {
    decode(&text.parse()?)
}
