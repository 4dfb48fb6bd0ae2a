//! Fuzz entry points for linkframe-core
//!
//! Every function here must return without panicking for any input. To
//! drive them with cargo-fuzz, wrap each in a `fuzz_target!`.

use linkframe_core::constants::DEFAULT_GROUP_ID;
use linkframe_core::{frame::parse_frame, hamming, stuffing, BitString, FrameBuilder};

/// Parse arbitrary bytes as a wire line, then decode the FCS if it parsed
pub fn fuzz_parse(data: &[u8]) {
    let line = String::from_utf8_lossy(data);
    let builder = FrameBuilder::new(DEFAULT_GROUP_ID);
    if let Ok(frame) = parse_frame(&line, builder.data_len()) {
        let _ = frame.decode();
    }
}

/// Treat each byte's low bit as one codeword bit and decode
pub fn fuzz_decode(data: &[u8]) {
    let codeword: BitString = data.iter().map(|b| b & 1 == 1).collect();
    let _ = hamming::decode(&codeword);
}

/// Destuff arbitrary bits, and stuff them back
pub fn fuzz_destuff(data: &[u8]) {
    let bits = BitString::from_bytes(data);
    let plain = stuffing::destuff(&bits);
    let _ = stuffing::stuff(&plain);
}
