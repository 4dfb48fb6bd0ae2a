//! Link configuration

use crate::constants::{
    data_len_for_group, DEFAULT_BAUD_RATE, DEFAULT_DISPATCH_DELAY_MS,
    DEFAULT_DOUBLE_FLIP_PROBABILITY, DEFAULT_GROUP_ID, DEFAULT_SINGLE_FLIP_PROBABILITY,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifies one of the two channel pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairId {
    /// First pair (COM1 -> COM2 by default)
    A,
    /// Second pair (COM3 -> COM4 by default)
    B,
}

impl PairId {
    /// Both pairs, in counter order
    pub const ALL: [PairId; 2] = [PairId::A, PairId::B];

    /// Index into per-pair arrays
    pub const fn index(self) -> usize {
        match self {
            PairId::A => 0,
            PairId::B => 1,
        }
    }
}

impl core::fmt::Display for PairId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PairId::A => f.write_str("A"),
            PairId::B => f.write_str("B"),
        }
    }
}

/// A transmit endpoint wired to a receive endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPair {
    /// Endpoint frames are written to; its last digit is the source address
    pub tx_endpoint: String,

    /// Endpoint frames are read from
    pub rx_endpoint: String,

    /// Baud rate passed through to the transport for both endpoints
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

impl ChannelPair {
    /// Create a pair with the default baud rate
    pub fn new(tx_endpoint: impl Into<String>, rx_endpoint: impl Into<String>) -> Self {
        Self {
            tx_endpoint: tx_endpoint.into(),
            rx_endpoint: rx_endpoint.into(),
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

/// Probabilities used by the channel simulator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Probability of flipping one random bit
    pub p_single: f64,

    /// Probability of additionally flipping two distinct random bits
    pub p_double: f64,

    /// Seed for the simulator's random source
    #[serde(default)]
    pub seed: u64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            p_single: DEFAULT_SINGLE_FLIP_PROBABILITY,
            p_double: DEFAULT_DOUBLE_FLIP_PROBABILITY,
            seed: 0,
        }
    }
}

/// Complete configuration for a link session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Group id; sets the flag field and the data length
    pub group_id: u8,

    /// Channel pair A
    pub pair_a: ChannelPair,

    /// Channel pair B
    pub pair_b: ChannelPair,

    /// Pause between spawning transmit tasks
    #[serde(default = "default_dispatch_delay_ms")]
    pub dispatch_delay_ms: u64,

    /// Corrupt the FCS of every transmitted frame when set
    #[serde(default)]
    pub noise: Option<NoiseConfig>,
}

impl LinkConfig {
    /// Configuration for `group_id` with the default endpoints
    pub fn with_group(group_id: u8) -> Self {
        Self {
            group_id,
            ..Self::default()
        }
    }

    /// Length `L` of the data field
    pub const fn data_len(&self) -> usize {
        data_len_for_group(self.group_id)
    }

    /// Look up a channel pair
    pub fn pair(&self, id: PairId) -> &ChannelPair {
        match id {
            PairId::A => &self.pair_a,
            PairId::B => &self.pair_b,
        }
    }

    /// Inter-dispatch delay as a duration
    pub fn dispatch_delay(&self) -> Duration {
        Duration::from_millis(self.dispatch_delay_ms)
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            group_id: DEFAULT_GROUP_ID,
            pair_a: ChannelPair::new("COM1", "COM2"),
            pair_b: ChannelPair::new("COM3", "COM4"),
            dispatch_delay_ms: DEFAULT_DISPATCH_DELAY_MS,
            noise: None,
        }
    }
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_dispatch_delay_ms() -> u64 {
    DEFAULT_DISPATCH_DELAY_MS
}
