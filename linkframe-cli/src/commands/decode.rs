use anyhow::{Context, Result};
use colored::*;
use linkframe_core::frame::parse_frame;
use linkframe_core::LinkConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};

/// One decoded wire line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedLine {
    /// 1-based input line number
    pub line: usize,
    /// Source address field
    pub source_address: u32,
    /// Data bits recovered from the FCS
    pub data: String,
    /// Position named by the syndrome, if any
    pub error_position: Option<usize>,
    /// Whether the data field on the wire differs from the recovered data
    pub data_field_differs: bool,
    /// Recovered data as text (complete octets only)
    pub text: String,
}

/// Decoding report for a block of wire lines
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DecodeReport {
    /// Successfully decoded frames
    pub frames: Vec<DecodedLine>,
    /// Line numbers that were not valid frames
    pub malformed: Vec<usize>,
}

impl DecodeReport {
    /// Frames whose syndrome was non-zero
    pub fn corrected(&self) -> usize {
        self.frames
            .iter()
            .filter(|f| f.error_position.is_some())
            .count()
    }
}

/// Parse and decode every non-blank line of `text`
pub fn decode_lines(text: &str, config: &LinkConfig) -> DecodeReport {
    let mut report = DecodeReport::default();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let decoded = parse_frame(line, config.data_len())
            .and_then(|frame| frame.decode().map(|decoded| (frame, decoded)));

        match decoded {
            Ok((frame, decoded)) => report.frames.push(DecodedLine {
                line: i + 1,
                source_address: frame.source_address(),
                data: decoded.data.to_string(),
                error_position: decoded.error_position,
                data_field_differs: &decoded.data != frame.data(),
                text: decoded.data.to_text_lossy(),
            }),
            Err(e) => {
                warn!("Line {}: {}", i + 1, e);
                report.malformed.push(i + 1);
            }
        }
    }

    report
}

pub fn execute(input: &str, output: Option<&str>, config: &LinkConfig) -> Result<()> {
    info!("Decoding frames from {}", input);

    let text = super::read_input(input)?;
    let report = decode_lines(&text, config);

    println!("\n=== Decode Results ===");
    println!("Frames decoded:     {}", report.frames.len().to_string().green());
    println!("Corrected:          {}", report.corrected());
    if report.malformed.is_empty() {
        println!("Malformed lines:    0");
    } else {
        println!("Malformed lines:    {}", report.malformed.len().to_string().red());
    }
    println!();

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&report)
            .with_context(|| "Failed to serialize decode report")?;

        fs::write(output_path, json)
            .with_context(|| format!("Failed to write output file: {}", output_path))?;

        info!("Decode report written to: {}", output_path);
    } else {
        for frame in &report.frames {
            let status = match frame.error_position {
                None => "clean".green(),
                Some(p) => format!("syndrome {}", p).yellow(),
            };
            println!(
                "Line {} from {}: {} [{}] {:?}",
                frame.line, frame.source_address, frame.data, status, frame.text
            );
        }
    }

    Ok(())
}
