//! Constants and limits for the Linkframe wire format

/// Group id of this deployment; encoded in the flag field
pub const DEFAULT_GROUP_ID: u8 = 30;

/// Width of the flag field in bits
pub const FLAG_WIDTH: usize = 8;

/// Width of each address field in bits
pub const ADDRESS_WIDTH: usize = 4;

/// Destination address; every frame is addressed to station zero
pub const DESTINATION_ADDRESS: u32 = 0;

/// Consecutive `1`s after which the stuffer inserts a `0`
pub const STUFFING_RUN: usize = 5;

/// Default baud rate handed to the transport for every endpoint
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default pause between dispatching transmit tasks, in milliseconds
pub const DEFAULT_DISPATCH_DELAY_MS: u64 = 100;

/// Default probability of a single-bit flip on the simulated channel
pub const DEFAULT_SINGLE_FLIP_PROBABILITY: f64 = 0.6;

/// Default probability of an additional double-bit flip
pub const DEFAULT_DOUBLE_FLIP_PROBABILITY: f64 = 0.25;

/// Wire labels, in the order they appear on a line
pub mod labels {
    /// Flag field label
    pub const FLAG: &str = "Flag";
    /// Destination address label
    pub const DEST: &str = "Dest Addr";
    /// Source address label
    pub const SOURCE: &str = "Source Addr";
    /// Data field label
    pub const DATA: &str = "Data";
    /// Frame check sequence label
    pub const FCS: &str = "FCS";
}

/// Length of the data field for a group id (`L = group + 1`)
pub const fn data_len_for_group(group_id: u8) -> usize {
    group_id as usize + 1
}
