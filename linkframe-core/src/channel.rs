//! Noisy channel simulator
//!
//! Flips bits at random to demonstrate what the Hamming code can and cannot
//! repair. All randomness comes from the injected RNG, so a seeded simulator
//! is fully reproducible.

use crate::bits::BitString;
use crate::config::NoiseConfig;
use alloc::vec::Vec;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Bits after a pass through the simulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corruption {
    /// Possibly corrupted bits
    pub bits: BitString,

    /// 0-based positions flipped, in the order they were flipped
    ///
    /// A position can appear twice when the double flip hits the single
    /// flip; the two flips then cancel.
    pub flipped: Vec<usize>,
}

/// Randomly flips one or two bits
#[derive(Debug, Clone)]
pub struct ChannelSimulator<R> {
    config: NoiseConfig,
    rng: R,
}

impl ChannelSimulator<ChaCha8Rng> {
    /// Simulator driven by a ChaCha8 RNG seeded from `config.seed`
    pub fn seeded(config: NoiseConfig) -> Self {
        Self::new(config, ChaCha8Rng::seed_from_u64(config.seed))
    }
}

impl<R: Rng> ChannelSimulator<R> {
    /// Simulator with an explicit random source
    pub fn new(config: NoiseConfig, rng: R) -> Self {
        Self { config, rng }
    }

    /// Noise probabilities in use
    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Pass `bits` through the channel
    ///
    /// With probability `p_single` one random bit is flipped. Independently,
    /// with probability `p_double` two distinct random bits are flipped.
    /// Probabilities outside `[0, 1]` are clamped.
    pub fn corrupt(&mut self, bits: &BitString) -> Corruption {
        let mut out = bits.clone();
        let mut flipped = Vec::new();
        let len = bits.len();

        if len > 0 && self.rng.gen_bool(self.config.p_single.clamp(0.0, 1.0)) {
            let pos = self.rng.gen_range(0..len);
            out.flip(pos);
            flipped.push(pos);
        }

        if len > 1 && self.rng.gen_bool(self.config.p_double.clamp(0.0, 1.0)) {
            for pos in index::sample(&mut self.rng, len, 2).into_iter() {
                out.flip(pos);
                flipped.push(pos);
            }
        }

        Corruption { bits: out, flipped }
    }
}
