//! Error types for Linkframe operations

/// Malformed input detected by one of the codec stages
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// A symbol other than '0' or '1' where a bit was expected
    #[error("Non-binary symbol {symbol:?} at index {index}")]
    NonBinary {
        /// The offending character.
        symbol: char,
        /// Character index within the field.
        index: usize,
    },

    /// Codeword handed to the Hamming decoder was empty
    #[error("Empty codeword")]
    EmptyCodeword,

    /// Payload longer than the configured data field
    #[error("Payload of {actual} bits exceeds data field length {max}")]
    PayloadTooLong {
        /// Payload length in bits.
        actual: usize,
        /// Configured data field length.
        max: usize,
    },

    /// Value does not fit in a fixed-width binary field
    #[error("Value {value} does not fit in {width} bits")]
    ValueTooWide {
        /// The value to encode.
        value: u32,
        /// Field width in bits.
        width: usize,
    },

    /// Channel identifier does not end in a decimal digit
    #[error("Channel id {0:?} does not end in a decimal digit")]
    BadChannelId(String),

    /// A wire field label was missing or out of order
    #[error("Expected field {expected:?} at column {column}")]
    MissingField {
        /// Label that was expected next.
        expected: &'static str,
        /// Byte offset in the line where it was expected.
        column: usize,
    },

    /// A wire field had the wrong number of bits
    #[error("Field {field} has {actual} bits, expected {expected}")]
    FieldWidth {
        /// Field label.
        field: &'static str,
        /// Width required by the frame layout.
        expected: usize,
        /// Width found on the wire.
        actual: usize,
    },

    /// A wire field contained invalid content
    #[error("Malformed field {field}: {reason}")]
    MalformedField {
        /// Field label.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// Unparsed characters after the last field
    #[error("Trailing content after FCS: {0:?}")]
    TrailingContent(String),
}

/// Errors that can occur during Linkframe operations
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Malformed wire text, payload or codeword
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Failure to open, write or read a transport endpoint
    #[error("Transport error on {endpoint}: {source}")]
    Transport {
        /// Endpoint identifier, e.g. `COM1`.
        endpoint: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl LinkError {
    /// Wrap an I/O failure on `endpoint`
    pub fn transport(endpoint: impl Into<String>, source: std::io::Error) -> Self {
        LinkError::Transport {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Whether this error was caused by malformed input rather than I/O
    pub fn is_format(&self) -> bool {
        matches!(self, LinkError::Format(_))
    }
}
