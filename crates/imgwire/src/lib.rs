//! Chunked transfer of large typed arrays over multipart message channels.
//!
//! imgwire moves multi-dimensional numeric arrays ("images") between two
//! processes over any transport that delivers ordered frames with a
//! "more frames follow" flag. A transfer is one textual envelope frame
//! (shape, element type, storage layout) followed by payload frames the
//! receiver reassembles with arithmetic derived from the envelope alone.
//!
//! # Crate Structure
//!
//! - [`channel`] — Message-channel abstraction (in-memory pair,
//!   stream-backed frame codec)
//! - [`proto`] — Transfer descriptor and envelope codec
//! - [`transfer`] — Chunked transfer engine, arrival watchdog, image model

/// Re-export channel types.
pub mod channel {
    pub use imgwire_channel::*;
}

/// Re-export descriptor and envelope types.
pub mod proto {
    pub use imgwire_proto::*;
}

/// Re-export engine, watchdog, and image types.
pub mod transfer {
    pub use imgwire_transfer::*;
}
