use anyhow::{Context, Result};
use linkframe_core::{channel::ChannelSimulator, BitString, FrameBuilder, LinkConfig};
use std::fs;
use tracing::{info, warn};

/// Outcome of framing a block of input text
#[derive(Debug, Default)]
pub struct FramedLines {
    /// Wire lines, without terminators
    pub lines: Vec<String>,
    /// 1-based numbers of input lines that could not be framed
    pub skipped: Vec<usize>,
}

/// Frame every non-blank line of `text` as if sent from `channel`
///
/// Lines are converted as the session's transmit path converts them,
/// whitespace included. Lines that cannot be framed are logged and
/// skipped. When the config carries noise settings the FCS of each frame
/// goes through the channel simulator first.
pub fn frame_lines(text: &str, channel: &str, config: &LinkConfig) -> FramedLines {
    let builder = FrameBuilder::from_config(config);
    let mut simulator = config.noise.map(ChannelSimulator::seeded);
    let mut out = FramedLines::default();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let payload = BitString::from_line(line);

        let frame = match builder.build(channel, &payload) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Line {}: {}", i + 1, e);
                out.skipped.push(i + 1);
                continue;
            }
        };

        let frame = match simulator.as_mut() {
            Some(sim) => {
                let corruption = sim.corrupt(frame.fcs());
                info!("Line {}: flipped FCS bits {:?}", i + 1, corruption.flipped);
                frame.with_fcs(corruption.bits)
            }
            None => frame,
        };

        out.lines.push(builder.render(&frame));
    }

    out
}

pub fn execute(input: &str, output: Option<&str>, channel: &str, config: &LinkConfig) -> Result<()> {
    info!("Framing {} as channel {}", input, channel);

    let text = super::read_input(input)?;
    let framed = frame_lines(&text, channel, config);

    let mut rendered = framed.lines.join("\n");
    if !rendered.is_empty() {
        rendered.push('\n');
    }

    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write output file: {}", path))?;
            info!("Wrote {} frames to {}", framed.lines.len(), path);
        }
        None => print!("{}", rendered),
    }

    if !framed.skipped.is_empty() {
        warn!("Skipped {} line(s): {:?}", framed.skipped.len(), framed.skipped);
    }

    Ok(())
}
