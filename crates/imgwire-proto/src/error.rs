/// Errors that can occur while encoding or decoding the envelope header.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The header text ended before all expected tokens were consumed.
    #[error("truncated header")]
    Truncated,

    /// The version token does not name a protocol this codec speaks.
    #[error("unknown protocol version {found:?} (expecting v1)")]
    VersionMismatch { found: String },

    /// A fixed grammar keyword was missing or misspelled.
    #[error("malformed header: expected {expected:?}, found {found:?}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },

    /// The rank or an extent token was not a usable dimension.
    #[error("bad dimension in header: {0}")]
    InvalidDimension(String),

    /// The element-type token names no supported element type.
    #[error("unsupported element type {0:?}")]
    UnsupportedElementType(String),

    /// The layout token names no layout this implementation can receive.
    #[error("unsupported storage layout {0:?}")]
    UnsupportedLayout(String),
}

pub type Result<T> = std::result::Result<T, EnvelopeError>;
