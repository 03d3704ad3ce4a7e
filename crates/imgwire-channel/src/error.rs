/// Errors that can occur on a message channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The frame header contains an invalid magic number.
    #[error("invalid frame magic (expected 0x4957 \"IW\")")]
    InvalidMagic,

    /// The frame payload exceeds the configured maximum size.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer went away before a complete frame was delivered.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, ChannelError>;
