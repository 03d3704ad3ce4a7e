//! Transfer descriptor and textual envelope codec.
//!
//! Every transfer opens with a human-readable header frame naming the
//! protocol version, the array's per-dimension extents, its element type,
//! and its storage layout. This crate owns that grammar and the closed
//! element-type/layout tables everything else dispatches on. Pure logic, no
//! I/O.

pub mod element;
pub mod envelope;
pub mod error;
pub mod layout;

pub use element::ElementType;
pub use envelope::{decode, encode, TransferDescriptor, PROTOCOL_VERSION};
pub use error::{EnvelopeError, Result};
pub use layout::Layout;
