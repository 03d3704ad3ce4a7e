use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{ChannelError, Result};

/// Frame header: magic (2) + flags (1) + length (4) = 7 bytes.
pub const HEADER_SIZE: usize = 7;

/// Magic bytes: "IW" (0x49 0x57).
pub const MAGIC: [u8; 2] = [0x49, 0x57];

/// Flag bit: more frames of this message follow.
pub const FLAG_MORE: u8 = 0b0000_0001;

/// Default maximum payload size: the 32-bit length bound.
///
/// Payloads at this layer are bounded by the 4-byte length field; the
/// chunked transfer engine above exists precisely because whole arrays can
/// exceed any practical single-frame size.
pub const DEFAULT_MAX_PAYLOAD: usize = u32::MAX as usize;

/// One frame as delivered by a message channel: an opaque byte sequence
/// plus the continuation flag.
#[derive(Debug, Clone)]
pub struct WireFrame {
    /// The frame payload.
    pub payload: Bytes,
    /// Whether more frames of the same logical message follow.
    pub more: bool,
}

impl WireFrame {
    /// Create a new frame.
    pub fn new(payload: impl Into<Bytes>, more: bool) -> Self {
        Self {
            payload: payload.into(),
            more,
        }
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬───────────┬───────────┬─────────────────┐
/// │ Magic (2B)   │ Flags     │ Length    │ Payload         │
/// │ 0x49 0x57    │ (1B)      │ (4B LE)   │ (Length bytes)  │
/// │ "IW"         │ bit0=more │           │                 │
/// └──────────────┴───────────┴───────────┴─────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], more: bool, dst: &mut BytesMut) -> Result<()> {
    if payload.len() > u32::MAX as usize {
        return Err(ChannelError::FrameTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&MAGIC);
    dst.put_u8(if more { FLAG_MORE } else { 0 });
    dst.put_u32_le(payload.len() as u32);
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<WireFrame>> {
    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    // Check magic
    if src[0..2] != MAGIC {
        return Err(ChannelError::InvalidMagic);
    }

    let more = src[2] & FLAG_MORE != 0;
    let payload_len = u32::from_le_bytes(src[3..7].try_into().unwrap()) as usize;

    if payload_len > max_payload {
        return Err(ChannelError::FrameTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(WireFrame { payload, more }))
}

/// Check whether a complete frame sits at the front of the buffer, without
/// consuming anything.
pub fn frame_ready(src: &BytesMut, max_payload: usize) -> Result<bool> {
    if src.len() < HEADER_SIZE {
        return Ok(false);
    }
    if src[0..2] != MAGIC {
        return Err(ChannelError::InvalidMagic);
    }
    let payload_len = u32::from_le_bytes(src[3..7].try_into().unwrap()) as usize;
    if payload_len > max_payload {
        return Err(ChannelError::FrameTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }
    Ok(src.len() >= HEADER_SIZE + payload_len)
}

/// Configuration for stream-backed channels.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Maximum payload size in bytes. Default: the 32-bit length bound.
    pub max_payload_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let mut buf = BytesMut::new();
        let payload = b"hello, imgwire!";

        encode_frame(payload, true, &mut buf).unwrap();

        assert_eq!(buf.len(), HEADER_SIZE + payload.len());

        let frame = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();

        assert!(frame.more);
        assert_eq!(frame.payload.as_ref(), payload);
        assert!(buf.is_empty());
    }

    #[test]
    fn final_frame_clears_more_flag() {
        let mut buf = BytesMut::new();
        encode_frame(b"tail", false, &mut buf).unwrap();

        let frame = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert!(!frame.more);
    }

    #[test]
    fn decode_incomplete_header() {
        let mut buf = BytesMut::from(&[0x49, 0x57, 0x01][..]);
        let result = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn decode_incomplete_payload() {
        let mut buf = BytesMut::new();
        encode_frame(b"hello", false, &mut buf).unwrap();
        buf.truncate(HEADER_SIZE + 2); // Truncate payload

        let result = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn decode_invalid_magic() {
        let mut buf = BytesMut::from(&[0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00][..]);
        let result = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD);
        assert!(matches!(result, Err(ChannelError::InvalidMagic)));
    }

    #[test]
    fn decode_payload_too_large() {
        let mut buf = BytesMut::new();
        buf.put_slice(&MAGIC);
        buf.put_u8(0);
        buf.put_u32_le(1024 * 1024);

        let result = decode_frame(&mut buf, 64 * 1024);
        assert!(matches!(result, Err(ChannelError::FrameTooLarge { .. })));
    }

    #[test]
    fn decode_multiple_frames() {
        let mut buf = BytesMut::new();
        encode_frame(b"first", true, &mut buf).unwrap();
        encode_frame(b"second", false, &mut buf).unwrap();

        let f1 = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert!(f1.more);
        assert_eq!(f1.payload.as_ref(), b"first");

        let f2 = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert!(!f2.more);
        assert_eq!(f2.payload.as_ref(), b"second");

        assert!(buf.is_empty());
    }

    #[test]
    fn empty_payload() {
        let mut buf = BytesMut::new();
        encode_frame(b"", false, &mut buf).unwrap();

        let frame = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn frame_ready_reports_without_consuming() {
        let mut buf = BytesMut::new();
        encode_frame(b"peek", true, &mut buf).unwrap();
        let wire_len = buf.len();

        assert!(frame_ready(&buf, DEFAULT_MAX_PAYLOAD).unwrap());
        assert_eq!(buf.len(), wire_len);

        buf.truncate(wire_len - 1);
        assert!(!frame_ready(&buf, DEFAULT_MAX_PAYLOAD).unwrap());
    }

    #[test]
    fn wire_size_accounts_for_header() {
        let frame = WireFrame::new(Bytes::from_static(b"test"), false);
        assert_eq!(frame.wire_size(), HEADER_SIZE + 4);
    }
}
