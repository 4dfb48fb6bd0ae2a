//! Library entry for linkframe-cli used by integration tests and embedding.

pub mod commands;

use anyhow::{Context, Result};
use linkframe_core::{LinkConfig, NoiseConfig};
use std::fs;

/// Load the link configuration
///
/// Starts from a JSON file when `path` is given, otherwise from the
/// defaults. `group` replaces the group id; `seed` switches on channel
/// noise with default probabilities unless the file already set them.
pub fn load_config(path: Option<&str>, group: Option<u8>, seed: Option<u64>) -> Result<LinkConfig> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config file: {}", path))?
        }
        None => LinkConfig::default(),
    };

    if let Some(group) = group {
        config.group_id = group;
    }

    if let Some(seed) = seed {
        let noise = config.noise.unwrap_or_default();
        config.noise = Some(NoiseConfig { seed, ..noise });
    }

    Ok(config)
}
