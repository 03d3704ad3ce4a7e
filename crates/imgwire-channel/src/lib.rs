//! Multipart message-channel abstraction for chunked array transfer.
//!
//! This is the lowest layer of imgwire. A [`MessageChannel`] delivers data
//! as an ordered sequence of discrete frames, each flagged with whether more
//! frames of the same logical message follow. Everything above (envelope,
//! chunked transfer engine) speaks only to this trait.
//!
//! Two channels are provided:
//! - [`MemoryChannel`] — a connected in-process pair, for loopback
//!   transfers and deterministic tests.
//! - [`StreamChannel`] — the frame codec over any `Read + Write` byte
//!   stream, e.g. a Unix domain socket.

pub mod error;
pub mod memory;
pub mod stream;
pub mod traits;
pub mod wire;

pub use error::{ChannelError, Result};
pub use memory::MemoryChannel;
pub use stream::StreamChannel;
pub use traits::MessageChannel;
pub use wire::{
    decode_frame, encode_frame, ChannelConfig, WireFrame, DEFAULT_MAX_PAYLOAD, HEADER_SIZE,
};
