//! Frame assembly, rendering and parsing
//!
//! A frame travels as one line of text:
//!
//! ```text
//! Flag: 00011110, Dest Addr: 0000, Source Addr: 0001, Data: 01000[0]01..., FCS: 1010...
//! ```
//!
//! - Flag (8 bits): binary of the group id
//! - Dest Addr (4 bits): always zero
//! - Source Addr (4 bits): last digit of the transmitting channel id
//! - Data (L bits): payload right-padded with `0`; at most one bit may be
//!   bracketed to mark where the stuffer inserted its last marker
//! - FCS: Hamming codeword over the data field
//!
//! [`parse_frame`] is the exact inverse of [`Frame`]'s `Display`
//! implementation for every frame produced by [`FrameBuilder::build`].

use crate::bits::BitString;
use crate::config::LinkConfig;
use crate::constants::{data_len_for_group, labels, ADDRESS_WIDTH, DESTINATION_ADDRESS, FLAG_WIDTH};
use crate::error::FormatError;
use crate::hamming;
use crate::stuffing::{self, Stuffed};
use alloc::format;
use alloc::string::{String, ToString};
use bytes::{BufMut, Bytes, BytesMut};
use core::fmt;

/// A single link-layer frame
///
/// Frames are immutable; [`Frame::with_fcs`] produces a modified copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    flag: BitString,
    destination: BitString,
    source: BitString,
    data: BitString,
    marker: Option<usize>,
    fcs: BitString,
}

impl Frame {
    /// Flag field (8 bits)
    pub fn flag(&self) -> &BitString {
        &self.flag
    }

    /// Destination address (4 bits)
    pub fn destination(&self) -> &BitString {
        &self.destination
    }

    /// Source address (4 bits)
    pub fn source(&self) -> &BitString {
        &self.source
    }

    /// Source address as a number
    pub fn source_address(&self) -> u32 {
        self.source.to_value()
    }

    /// Padded data field
    pub fn data(&self) -> &BitString {
        &self.data
    }

    /// Index of the bracketed data bit, if any
    pub fn marker(&self) -> Option<usize> {
        self.marker
    }

    /// Frame check sequence (Hamming codeword)
    pub fn fcs(&self) -> &BitString {
        &self.fcs
    }

    /// Stuffed form of the data field, for display
    pub fn stuffed(&self) -> Stuffed {
        stuffing::stuff(&self.data)
    }

    /// Copy of this frame carrying a different FCS
    pub fn with_fcs(&self, fcs: BitString) -> Self {
        Self {
            fcs,
            ..self.clone()
        }
    }

    /// Decode the FCS, correcting at most one bit
    pub fn decode(&self) -> Result<hamming::Decoded, FormatError> {
        hamming::decode(&self.fcs)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}, {}: {}, {}: {}, {}: ",
            labels::FLAG,
            self.flag,
            labels::DEST,
            self.destination,
            labels::SOURCE,
            self.source,
            labels::DATA,
        )?;
        for (i, bit) in self.data.iter().enumerate() {
            let digit = if bit { '1' } else { '0' };
            if self.marker == Some(i) {
                write!(f, "[{}]", digit)?;
            } else {
                write!(f, "{}", digit)?;
            }
        }
        write!(f, ", {}: {}", labels::FCS, self.fcs)
    }
}

/// Builds frames for one group id
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    flag: BitString,
    data_len: usize,
}

impl FrameBuilder {
    /// Create a builder for `group_id`; the data field is `group_id + 1` bits
    pub fn new(group_id: u8) -> Self {
        Self {
            flag: BitString::from_bytes(&[group_id]),
            data_len: data_len_for_group(group_id),
        }
    }

    /// Create a builder from a link configuration
    pub fn from_config(config: &LinkConfig) -> Self {
        Self::new(config.group_id)
    }

    /// Length `L` of the data field
    pub fn data_len(&self) -> usize {
        self.data_len
    }

    /// Assemble a frame for `payload` sent from `channel_id`
    ///
    /// Fails if `channel_id` does not end in a decimal digit or if the
    /// payload is longer than the data field.
    pub fn build(&self, channel_id: &str, payload: &BitString) -> Result<Frame, FormatError> {
        let digit = channel_id
            .chars()
            .last()
            .and_then(|c| c.to_digit(10))
            .ok_or_else(|| FormatError::BadChannelId(channel_id.to_string()))?;

        let data = payload.pad_right(self.data_len)?;
        let fcs = hamming::encode(&data);

        // The stuffed index is applied to the unstuffed data; an index past
        // the data field is not shown.
        let marker = stuffing::stuff(&data)
            .last_inserted
            .filter(|&pos| pos < self.data_len);

        Ok(Frame {
            flag: self.flag.clone(),
            destination: BitString::from_value(DESTINATION_ADDRESS, ADDRESS_WIDTH)?,
            source: BitString::from_value(digit, ADDRESS_WIDTH)?,
            data,
            marker,
            fcs,
        })
    }

    /// Render a frame as its wire line (no newline)
    pub fn render(&self, frame: &Frame) -> String {
        frame.to_string()
    }

    /// Render a frame as newline-terminated wire bytes
    pub fn encode_line(&self, frame: &Frame) -> Bytes {
        let line = self.render(frame);
        let mut buf = BytesMut::with_capacity(line.len() + 1);
        buf.put_slice(line.as_bytes());
        buf.put_u8(b'\n');
        buf.freeze()
    }

    /// Parse a wire line produced for this builder's data length
    pub fn parse(&self, line: &str) -> Result<Frame, FormatError> {
        parse_frame(line, self.data_len)
    }
}

/// Parse one wire line
///
/// Surrounding whitespace (including the line terminator) is ignored. The
/// flag and address fields must have their fixed widths and the data field
/// must be exactly `data_len` bits. The FCS may be any non-empty bit string,
/// since a damaged codeword is still handed to the decoder.
pub fn parse_frame(line: &str, data_len: usize) -> Result<Frame, FormatError> {
    let mut cursor = Cursor::new(line.trim());

    cursor.expect_label(labels::FLAG)?;
    let flag = fixed_field(labels::FLAG, cursor.take_value(), FLAG_WIDTH)?;

    cursor.expect_separator(labels::DEST)?;
    cursor.expect_label(labels::DEST)?;
    let destination = fixed_field(labels::DEST, cursor.take_value(), ADDRESS_WIDTH)?;

    cursor.expect_separator(labels::SOURCE)?;
    cursor.expect_label(labels::SOURCE)?;
    let source = fixed_field(labels::SOURCE, cursor.take_value(), ADDRESS_WIDTH)?;

    cursor.expect_separator(labels::DATA)?;
    cursor.expect_label(labels::DATA)?;
    let (data, marker) = data_field(cursor.take_value(), data_len)?;

    cursor.expect_separator(labels::FCS)?;
    cursor.expect_label(labels::FCS)?;
    let fcs = bits_field(labels::FCS, cursor.take_value())?;
    if fcs.is_empty() {
        return Err(FormatError::MalformedField {
            field: labels::FCS,
            reason: "empty codeword".to_string(),
        });
    }

    if !cursor.at_end() {
        return Err(FormatError::TrailingContent(cursor.rest().to_string()));
    }

    Ok(Frame {
        flag,
        destination,
        source,
        data,
        marker,
        fcs,
    })
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos == self.input.len()
    }

    fn expect(&mut self, literal: &str, expected: &'static str) -> Result<(), FormatError> {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(FormatError::MissingField {
                expected,
                column: self.pos,
            })
        }
    }

    /// `<label>: `
    fn expect_label(&mut self, label: &'static str) -> Result<(), FormatError> {
        self.expect(label, label)?;
        self.expect(": ", label)
    }

    /// `, ` before the field named `next`
    fn expect_separator(&mut self, next: &'static str) -> Result<(), FormatError> {
        self.expect(", ", next)
    }

    /// Everything up to the next comma or the end of input
    fn take_value(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest.find(',').unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }
}

fn bits_field(field: &'static str, text: &str) -> Result<BitString, FormatError> {
    text.parse().map_err(|e: FormatError| FormatError::MalformedField {
        field,
        reason: e.to_string(),
    })
}

fn fixed_field(field: &'static str, text: &str, width: usize) -> Result<BitString, FormatError> {
    let bits = bits_field(field, text)?;
    if bits.len() != width {
        return Err(FormatError::FieldWidth {
            field,
            expected: width,
            actual: bits.len(),
        });
    }
    Ok(bits)
}

fn data_field(text: &str, data_len: usize) -> Result<(BitString, Option<usize>), FormatError> {
    let malformed = |reason: String| FormatError::MalformedField {
        field: labels::DATA,
        reason,
    };

    let mut bits = BitString::new();
    let mut marker = None;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '0' => bits.push(false),
            '1' => bits.push(true),
            '[' => {
                if marker.is_some() {
                    return Err(malformed("more than one marked bit".to_string()));
                }
                let bit = match chars.next() {
                    Some('0') => false,
                    Some('1') => true,
                    other => return Err(malformed(format!("expected bit after '[', got {:?}", other))),
                };
                if chars.next() != Some(']') {
                    return Err(malformed("unterminated '['".to_string()));
                }
                marker = Some(bits.len());
                bits.push(bit);
            }
            other => {
                return Err(malformed(format!(
                    "unexpected {:?} at bit {}",
                    other,
                    bits.len()
                )))
            }
        }
    }

    if bits.len() != data_len {
        return Err(FormatError::FieldWidth {
            field: labels::DATA,
            expected: data_len,
            actual: bits.len(),
        });
    }

    Ok((bits, marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> BitString {
        s.parse().unwrap()
    }

    #[test]
    fn test_build_default_group() {
        let builder = FrameBuilder::new(30);
        let frame = builder.build("COM1", &bits("1011")).unwrap();

        assert_eq!(frame.flag().to_string(), "00011110");
        assert_eq!(frame.destination().to_string(), "0000");
        assert_eq!(frame.source().to_string(), "0001");
        assert_eq!(frame.source_address(), 1);
        assert_eq!(frame.data().len(), 31);
        assert!(frame.data().to_string().starts_with("1011000"));
        assert_eq!(frame.fcs().len(), 37);
        assert_eq!(frame.marker(), None);
    }

    #[test]
    fn test_build_rejects_long_payload() {
        let builder = FrameBuilder::new(3);
        assert!(builder.build("COM1", &bits("1111")).is_ok());
        assert_eq!(
            builder.build("COM1", &bits("11111")),
            Err(FormatError::PayloadTooLong { actual: 5, max: 4 })
        );
    }

    #[test]
    fn test_build_rejects_bad_channel_id() {
        let builder = FrameBuilder::new(30);
        assert!(matches!(
            builder.build("COMX", &bits("1")),
            Err(FormatError::BadChannelId(_))
        ));
        assert!(matches!(
            builder.build("", &bits("1")),
            Err(FormatError::BadChannelId(_))
        ));
    }

    #[test]
    fn test_render_marks_last_stuffed_bit() {
        let builder = FrameBuilder::new(11);
        let frame = builder.build("COM3", &bits("111111")).unwrap();
        // Stuffed: 111110 1 ... -> inserted at index 5
        assert_eq!(frame.marker(), Some(5));
        assert_eq!(
            builder.render(&frame),
            format!(
                "Flag: 00001011, Dest Addr: 0000, Source Addr: 0011, Data: 11111[1]000000, FCS: {}",
                frame.fcs()
            )
        );
    }

    #[test]
    fn test_marker_past_data_field_not_shown() {
        let builder = FrameBuilder::new(4);
        // 5 ones -> marker inserted at index 5, data field is 5 bits
        let frame = builder.build("COM1", &bits("11111")).unwrap();
        assert_eq!(frame.marker(), None);
        assert!(!builder.render(&frame).contains('['));
    }

    #[test]
    fn test_parse_round_trip() {
        let builder = FrameBuilder::new(30);
        for payload in ["", "1", "0101", "111111111111", "0111110111110111110"] {
            let frame = builder.build("COM3", &bits(payload)).unwrap();
            let parsed = builder.parse(&builder.render(&frame)).unwrap();
            assert_eq!(parsed, frame, "payload {}", payload);
        }
    }

    #[test]
    fn test_parse_accepts_newline() {
        let builder = FrameBuilder::new(30);
        let frame = builder.build("COM1", &bits("01")).unwrap();
        let line = builder.encode_line(&frame);
        assert_eq!(line.last(), Some(&b'\n'));
        let text = core::str::from_utf8(&line).unwrap();
        assert_eq!(builder.parse(text).unwrap(), frame);
    }

    #[test]
    fn test_parse_errors_name_the_field() {
        let builder = FrameBuilder::new(3);
        let good = "Flag: 00000011, Dest Addr: 0000, Source Addr: 0001, Data: 1010, FCS: 1011010";
        assert!(builder.parse(good).is_ok());

        assert!(matches!(
            builder.parse("Flag 00000011"),
            Err(FormatError::MissingField { expected: "Flag", .. })
        ));
        assert!(matches!(
            builder.parse(&good.replace("Dest Addr: 0000", "Dest Addr: 000")),
            Err(FormatError::FieldWidth { field: "Dest Addr", expected: 4, actual: 3 })
        ));
        assert!(matches!(
            builder.parse(&good.replace(", Source Addr", "; Source Addr")),
            Err(FormatError::MalformedField { field: "Dest Addr", .. })
        ));
        assert!(matches!(
            builder.parse(&good.replace("Data: 1010", "Data: 10102")),
            Err(FormatError::MalformedField { field: "Data", .. })
        ));
        assert!(matches!(
            builder.parse(&good.replace("Data: 1010", "Data: 101")),
            Err(FormatError::FieldWidth { field: "Data", expected: 4, actual: 3 })
        ));
        assert!(matches!(
            builder.parse(&good.replace("Data: 1010", "Data: [1]0[1]0")),
            Err(FormatError::MalformedField { field: "Data", .. })
        ));
        assert!(matches!(
            builder.parse(&good.replace("Data: 1010", "Data: 10[10")),
            Err(FormatError::MalformedField { field: "Data", .. })
        ));
        assert!(matches!(
            builder.parse(&good.replace("FCS: 1011010", "FCS: 10x")),
            Err(FormatError::MalformedField { field: "FCS", .. })
        ));
        assert!(matches!(
            builder.parse(&format!("{}, extra", good)),
            Err(FormatError::TrailingContent(_))
        ));
        assert!(matches!(
            builder.parse(&good.replace(", FCS: 1011010", "")),
            Err(FormatError::MissingField { expected: "FCS", .. })
        ));
    }

    #[test]
    fn test_with_fcs_keeps_other_fields() {
        let builder = FrameBuilder::new(30);
        let frame = builder.build("COM1", &bits("1")).unwrap();
        let mut damaged = frame.fcs().clone();
        damaged.flip(0);
        let copy = frame.with_fcs(damaged.clone());
        assert_eq!(copy.data(), frame.data());
        assert_eq!(copy.fcs(), &damaged);
        assert_eq!(copy.decode().unwrap().data, *frame.data());
    }
}
