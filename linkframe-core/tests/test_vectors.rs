//! Fixed test vectors for the codec stages and the default frame layout

use linkframe_core::{
    frame::parse_frame,
    hamming,
    stuffing::{destuff, stuff},
    BitString, FormatError, FrameBuilder,
};

fn bits(s: &str) -> BitString {
    s.parse().unwrap()
}

/// 1. Seven data bits need four parity bits
#[test]
fn vector_hamming_seven_bits() {
    let data = bits("1011001");
    assert_eq!(hamming::parity_bits(7), 4);

    let codeword = hamming::encode(&data);
    assert_eq!(codeword.len(), 11);
    assert_eq!(codeword.to_string(), "10100111001");

    for p in 0..11 {
        let mut damaged = codeword.clone();
        damaged.flip(p);
        let decoded = hamming::decode(&damaged).unwrap();
        assert_eq!(decoded.data.to_string(), "1011001", "flip at position {}", p + 1);
    }
}

/// 2. Two runs of five ones, two markers
#[test]
fn vector_stuffing_two_runs() {
    let input = bits("111110111110");
    let stuffed = stuff(&input);

    assert_eq!(stuffed.inserted.len(), 2);
    assert_eq!(stuffed.bits.len(), input.len() + 2);
    for &pos in &stuffed.inserted {
        assert_eq!(stuffed.bits.get(pos), Some(false));
        let run: Vec<bool> = (pos - 5..pos).filter_map(|i| stuffed.bits.get(i)).collect();
        assert_eq!(run, vec![true; 5]);
    }
    assert_eq!(destuff(&stuffed.bits), input);
}

/// 3. Default deployment, payload "A" on COM1
#[test]
fn vector_default_frame_line() {
    let builder = FrameBuilder::new(30);
    let frame = builder.build("COM1", &BitString::from_line("A")).unwrap();
    let data = "0100000100000000000000000000000";
    let fcs = hamming::encode(&bits(data));

    assert_eq!(
        builder.render(&frame),
        format!(
            "Flag: 00011110, Dest Addr: 0000, Source Addr: 0001, Data: {}, FCS: {}",
            data, fcs
        )
    );
}

/// 4. All-ones payload: last marker lands at index 29 of 31
#[test]
fn vector_all_ones_marker() {
    let builder = FrameBuilder::new(30);
    let payload = bits(&"1".repeat(26));
    let frame = builder.build("COM3", &payload).unwrap();

    // Markers at 5, 11, 17, 23, 29 in the stuffed string.
    assert_eq!(frame.stuffed().inserted, vec![5, 11, 17, 23, 29]);
    assert_eq!(frame.marker(), Some(29));
    let line = builder.render(&frame);
    assert!(line.contains(&format!("Data: {}[0]0,", "1".repeat(26) + "000")));
}

/// 5. Received line with one damaged FCS bit
#[test]
fn vector_received_line_with_damaged_fcs() {
    let builder = FrameBuilder::new(30);
    let frame = builder.build("COM1", &BitString::from_line("Hi")).unwrap();
    let mut fcs = frame.fcs().clone();
    fcs.flip(20);
    let line = builder.render(&frame.with_fcs(fcs)) + "\n";

    let parsed = parse_frame(&line, 31).unwrap();
    let decoded = parsed.decode().unwrap();
    assert_eq!(decoded.error_position, Some(21));
    assert_eq!(&decoded.data, frame.data());
    assert_eq!(decoded.data.truncated(16).to_text_lossy(), "Hi");
}

/// 6. Digits are literal bits, not characters
#[test]
fn vector_literal_bits_line() {
    assert_eq!(BitString::from_line("0110").to_string(), "0110");
    assert_eq!(BitString::from_line("2").to_string(), "00110010");
}

/// 7. Payload one bit too long for the data field
#[test]
fn vector_payload_overflow() {
    let builder = FrameBuilder::new(30);
    let err = builder.build("COM1", &bits(&"0".repeat(32))).unwrap_err();
    assert_eq!(err, FormatError::PayloadTooLong { actual: 32, max: 31 });
}
