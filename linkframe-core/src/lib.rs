//! # Linkframe Core
//!
//! Text frames for a simulated point-to-point link, protected by a Hamming
//! single-error-correcting code.
//!
//! ## Modules
//!
//! - `bits`: Bit string type and text/byte/bit conversions
//! - `hamming`: Hamming SEC encode/decode
//! - `stuffing`: Bit stuffing and destuffing
//! - `frame`: Frame assembly, wire rendering and parsing
//! - `channel`: Random bit-flip channel simulator
//! - `transport`: Byte-stream transport trait and in-memory loopback
//! - `session`: Two-pair transmit/receive orchestration
//! - `config`: Link configuration
//! - `constants`: Wire format constants and defaults

#![warn(missing_docs)]

extern crate alloc;

pub mod bits;
pub mod channel;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod hamming;
pub mod session;
pub mod stuffing;
pub mod transport;

// Re-export commonly used types
pub use bits::BitString;
pub use config::{ChannelPair, LinkConfig, NoiseConfig, PairId};
pub use error::{FormatError, LinkError};
pub use frame::{Frame, FrameBuilder};
pub use session::{CommunicationSession, CounterSnapshot, LogPresenter, Presenter};
pub use transport::{MemoryTransport, Transport};

/// Result type alias for Linkframe operations
pub type Result<T> = core::result::Result<T, LinkError>;
