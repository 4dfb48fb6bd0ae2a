//! Bit string type and conversions between text, bytes and bits

use crate::error::FormatError;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Ordered, variable-length sequence of binary digits
///
/// Displayed and parsed as a string of `0`/`1` characters. Nothing in this
/// type truncates implicitly; [`BitString::truncated`] and
/// [`BitString::pad_right`] are the only length-changing conversions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BitString {
    bits: Vec<bool>,
}

impl BitString {
    /// Create an empty bit string
    pub fn new() -> Self {
        Self { bits: Vec::new() }
    }

    /// Create `len` zero bits
    pub fn zeros(len: usize) -> Self {
        Self {
            bits: alloc::vec![false; len],
        }
    }

    /// Create from individual bits
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Expand bytes into bits, most significant bit first
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut bits = Vec::with_capacity(bytes.len() * 8);
        for &byte in bytes {
            push_octet(&mut bits, byte);
        }
        Self { bits }
    }

    /// Convert an input line the way the transmit path does
    ///
    /// Characters that already are `'0'` or `'1'` are taken as literal bits.
    /// Every other character contributes the binary form of its code point:
    /// eight bits up to U+00FF, the minimal width above that. A line such as
    /// `"01"` is therefore two bits, not two octets.
    pub fn from_line(text: &str) -> Self {
        let mut bits = Vec::with_capacity(text.len() * 8);
        for ch in text.chars() {
            match ch {
                '0' => bits.push(false),
                '1' => bits.push(true),
                other => push_code_point(&mut bits, u32::from(other)),
            }
        }
        Self { bits }
    }

    /// Fixed-width big-endian binary of `value`
    pub fn from_value(value: u32, width: usize) -> Result<Self, FormatError> {
        if width < 32 && value >> width != 0 {
            return Err(FormatError::ValueTooWide { value, width });
        }
        let bits = (0..width)
            .rev()
            .map(|shift| shift < 32 && (value >> shift) & 1 == 1)
            .collect();
        Ok(Self { bits })
    }

    /// Interpret the bits as a big-endian unsigned value
    ///
    /// Bits beyond the low 32 are discarded.
    pub fn to_value(&self) -> u32 {
        self.bits
            .iter()
            .fold(0u32, |acc, &bit| (acc << 1) | u32::from(bit))
    }

    /// Pack complete octets, most significant bit first
    ///
    /// A trailing partial octet is dropped.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits
            .chunks_exact(8)
            .map(|octet| octet.iter().fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit)))
            .collect()
    }

    /// Packed octets read as code points U+0000 to U+00FF
    ///
    /// Inverts [`BitString::from_line`] for text without literal `0`/`1`
    /// characters and without code points above U+00FF.
    pub fn to_text_lossy(&self) -> String {
        self.to_bytes().into_iter().map(char::from).collect()
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether there are no bits
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Bit at 0-based `index`
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// Borrow the bits
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Iterate over the bits
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    /// Append one bit
    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Toggle the bit at 0-based `index`
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn flip(&mut self, index: usize) {
        self.bits[index] = !self.bits[index];
    }

    /// Right-fill with zeros up to `len`
    ///
    /// Fails rather than truncating when the string is already longer.
    pub fn pad_right(&self, len: usize) -> Result<Self, FormatError> {
        if self.bits.len() > len {
            return Err(FormatError::PayloadTooLong {
                actual: self.bits.len(),
                max: len,
            });
        }
        let mut bits = self.bits.clone();
        bits.resize(len, false);
        Ok(Self { bits })
    }

    /// First `len` bits (or all of them if shorter)
    pub fn truncated(&self, len: usize) -> Self {
        Self {
            bits: self.bits.iter().copied().take(len).collect(),
        }
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&bit| bit).count()
    }
}

fn push_octet(bits: &mut Vec<bool>, byte: u8) {
    for shift in (0..8).rev() {
        bits.push((byte >> shift) & 1 == 1);
    }
}

fn push_code_point(bits: &mut Vec<bool>, code: u32) {
    let width = (u32::BITS - code.leading_zeros()).max(8);
    for shift in (0..width).rev() {
        bits.push((code >> shift) & 1 == 1);
    }
}

impl FromStr for BitString {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .enumerate()
            .map(|(index, symbol)| match symbol {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(FormatError::NonBinary { symbol, index }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::from_bits)
    }
}

impl TryFrom<String> for BitString {
    type Error = FormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BitString> for String {
    fn from(value: BitString) -> Self {
        value.to_string()
    }
}

impl From<Vec<bool>> for BitString {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

impl FromIterator<bool> for BitString {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn bits(s: &str) -> BitString {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let b = bits("0110");
        assert_eq!(b.len(), 4);
        assert_eq!(b.to_string(), "0110");
        assert_eq!(b.get(1), Some(true));
        assert_eq!(b.get(4), None);
    }

    #[test]
    fn test_parse_rejects_non_binary() {
        let err = "01x1".parse::<BitString>().unwrap_err();
        assert_eq!(
            err,
            FormatError::NonBinary {
                symbol: 'x',
                index: 2
            }
        );
    }

    #[test]
    fn test_from_bytes_msb_first() {
        assert_eq!(BitString::from_bytes(b"A").to_string(), "01000001");
        assert_eq!(BitString::from_bytes(b"Hi").to_bytes(), b"Hi".to_vec());
    }

    #[test]
    fn test_from_line_mixes_literal_bits_and_characters() {
        assert_eq!(BitString::from_line("01").to_string(), "01");
        assert_eq!(BitString::from_line("A1").to_string(), "010000011");
        assert!(BitString::from_line("").is_empty());
    }

    #[test]
    fn test_from_line_uses_code_points() {
        // U+00E9 fits one octet; U+20AC needs its 14 significant bits.
        assert_eq!(BitString::from_line("é").to_string(), "11101001");
        assert_eq!(BitString::from_line("€").to_string(), "10000010101100");
        assert_eq!(BitString::from_line("é").to_text_lossy(), "é");
        assert_eq!(BitString::from_line("Ab").to_text_lossy(), "Ab");
    }

    #[test]
    fn test_from_value_widths() {
        assert_eq!(BitString::from_value(30, 8).unwrap().to_string(), "00011110");
        assert_eq!(BitString::from_value(3, 4).unwrap().to_string(), "0011");
        assert_eq!(BitString::from_value(0, 4).unwrap().to_string(), "0000");
        assert!(BitString::from_value(16, 4).is_err());
        assert_eq!(BitString::from_value(9, 4).unwrap().to_value(), 9);
    }

    #[test]
    fn test_pad_right_and_truncate() {
        let b = bits("101");
        assert_eq!(b.pad_right(6).unwrap().to_string(), "101000");
        assert_eq!(b.pad_right(3).unwrap(), b);
        assert!(matches!(
            b.pad_right(2),
            Err(FormatError::PayloadTooLong { actual: 3, max: 2 })
        ));
        assert_eq!(b.truncated(2).to_string(), "10");
        assert_eq!(b.truncated(10), b);
    }

    #[test]
    fn test_partial_octet_dropped() {
        assert_eq!(bits("010000011").to_bytes(), b"A".to_vec());
        assert_eq!(bits("0100").to_text_lossy(), "");
    }

    #[test]
    fn test_flip() {
        let mut b = bits("000");
        b.flip(1);
        assert_eq!(b.to_string(), "010");
        assert_eq!(b.count_ones(), 1);
    }
}
