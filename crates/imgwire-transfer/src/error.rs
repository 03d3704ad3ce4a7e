/// Errors that can occur during an image transfer.
///
/// Every variant is fatal to the current transfer: the channel's frame
/// position is not guaranteed clean afterwards, so callers retry the whole
/// transfer on a fresh channel if they retry at all.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The envelope header was malformed or describes something this
    /// implementation cannot materialize.
    #[error("envelope error: {0}")]
    Envelope(#[from] imgwire_proto::EnvelopeError),

    /// Channel-level failure underneath the transfer.
    #[error("channel error: {0}")]
    Channel(#[from] imgwire_channel::ChannelError),

    /// No frame was observed within the configured window; the connection
    /// is treated as broken.
    #[error("reached timeout after {waited_secs} s waiting for incoming data")]
    BrokenConnection { waited_secs: i64 },

    /// A frame arrived but was smaller than the block plan expected.
    /// Indicates sender/receiver plan disagreement or transport corruption.
    #[error("short read: expected {expected} bytes, received {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// Refusing to transfer an image with zero elements.
    #[error("refusing to transfer an empty image")]
    EmptyImage,

    /// The header frame was not valid UTF-8 text.
    #[error("header frame is not valid UTF-8 text")]
    HeaderNotText,

    /// Buffers handed to the image model disagree with the declared shape.
    #[error("buffer shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The declared image does not fit in this process's address space.
    #[error("image too large for this platform: {0}")]
    TooLarge(String),
}

pub type Result<T> = std::result::Result<T, TransferError>;
