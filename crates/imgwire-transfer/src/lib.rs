//! Chunked array transfer over a multipart message channel.
//!
//! This is the "just works" layer of imgwire. Build an [`Image`] (or let
//! [`recv_image`] allocate one from the incoming header), hand it a channel,
//! and the engine does the rest: envelope header first, then the payload
//! split into frames by the fixed partition both sides derive from the
//! array's geometry. The receive side waits for every frame under the
//! [`ArrivalWatchdog`], so a silent transport becomes a bounded error
//! instead of a hang.

pub mod chunk;
pub mod engine;
pub mod error;
pub mod image;
pub mod watchdog;

pub use chunk::{Block, ChunkPlan, SINGLE_FRAME_ELEMENT_LIMIT};
pub use engine::{recv_array, recv_image, recv_planes, send_array, send_image, send_planes};
pub use error::{Result, TransferError};
pub use image::{Element, Image, PixelData, TypedBuffer};
pub use watchdog::{
    get_connection_broken_timeout, set_connection_broken_timeout, ArrivalWatchdog,
    DEFAULT_CONNECTION_BROKEN_TIMEOUT,
};
