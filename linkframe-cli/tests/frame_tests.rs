use linkframe_cli::commands::frame;
use linkframe_core::{BitString, FrameBuilder, LinkConfig, NoiseConfig};
use std::fs;
use tempfile::tempdir;

const FRAME_A: &str = "Flag: 00011110, Dest Addr: 0000, Source Addr: 0001, \
    Data: 0100000100000000000000000000000, FCS: 1000100100010000000000000000000000000";

#[test]
fn test_frame_lines_default_config() {
    let framed = frame::frame_lines("A\n", "COM1", &LinkConfig::default());
    assert!(framed.skipped.is_empty());
    assert_eq!(framed.lines, vec![FRAME_A.to_string()]);
}

#[test]
fn test_frame_lines_skips_blank_and_oversized() {
    let framed = frame::frame_lines("A\n\n   \nabcd\n0110\n", "COM3", &LinkConfig::default());
    assert_eq!(framed.lines.len(), 2);
    assert_eq!(framed.skipped, vec![4]);
    assert!(framed.lines[1].contains("Source Addr: 0011"));
    assert!(framed.lines[1].contains("Data: 0110000000000000000000000000000"));
}

#[test]
fn test_frame_lines_keep_whitespace_like_the_session() {
    let builder = FrameBuilder::new(30);
    let expected = builder
        .build("COM1", &BitString::from_line("A "))
        .unwrap();

    let framed = frame::frame_lines("A \n", "COM1", &LinkConfig::default());
    assert_eq!(framed.lines, vec![builder.render(&expected)]);
    assert!(framed.lines[0].contains("Data: 0100000100100000000000000000000,"));
}

#[test]
fn test_frame_lines_bad_channel() {
    let framed = frame::frame_lines("A\nB\n", "COMX", &LinkConfig::default());
    assert!(framed.lines.is_empty());
    assert_eq!(framed.skipped, vec![1, 2]);
}

#[test]
fn test_frame_lines_noise_is_reproducible() {
    let config = LinkConfig {
        noise: Some(NoiseConfig {
            seed: 11,
            ..NoiseConfig::default()
        }),
        ..LinkConfig::default()
    };
    let text = "one\ntwo\nthree\n";
    let first = frame::frame_lines(text, "COM1", &config);
    let second = frame::frame_lines(text, "COM1", &config);
    assert_eq!(first.lines, second.lines);
    assert_eq!(first.lines.len(), 3);
}

#[test]
fn test_frame_execute_writes_file() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("input.txt");
    let output_path = td.path().join("frames.txt");
    fs::write(&input_path, "A\n").unwrap();

    let result = frame::execute(
        input_path.to_str().unwrap(),
        Some(output_path.to_str().unwrap()),
        "COM1",
        &LinkConfig::default(),
    );
    assert!(result.is_ok());

    let written = fs::read_to_string(&output_path).unwrap();
    assert_eq!(written, format!("{}\n", FRAME_A));
}

#[test]
fn test_frame_execute_missing_input() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("missing.txt");

    let result = frame::execute(input_path.to_str().unwrap(), None, "COM1", &LinkConfig::default());
    assert!(result.is_err());
}
