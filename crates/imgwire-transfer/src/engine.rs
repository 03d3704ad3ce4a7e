//! The chunked transfer engine.
//!
//! Send side: slice a typed buffer into the frames of its [`ChunkPlan`] and
//! push them through the channel, threading the continuation flag so only
//! the very last frame of the whole exchange clears it. Receive side: derive
//! the identical plan from the header-declared geometry (the wire carries no
//! frame count), wait for each frame under the watchdog, and copy it into
//! the pre-allocated buffer at its block offset.

use imgwire_channel::MessageChannel;
use tracing::{debug, trace};

use crate::chunk::ChunkPlan;
use crate::error::{Result, TransferError};
use crate::image::{Image, PixelData, TypedBuffer};
use crate::watchdog::ArrivalWatchdog;

/// Upper bound on the header frame; headers are a few dozen bytes, anything
/// near this size is not a header.
const MAX_HEADER_LEN: usize = 4096;

/// Send one typed buffer as one or more payload frames.
///
/// `more_after` is carried by the final frame, so a caller with further
/// buffers to send (planes) keeps the multipart message open.
pub fn send_array(
    buffer: &TypedBuffer,
    channel: &mut impl MessageChannel,
    more_after: bool,
) -> Result<()> {
    let n = buffer.element_count();
    if n == 0 {
        return Err(TransferError::EmptyImage);
    }
    let s = buffer.element_type().size_in_bytes();

    let plan = ChunkPlan::new(n, s);
    let blocks = plan.blocks();
    let bytes = buffer.as_bytes();

    trace!(
        elements = n,
        element_size = s,
        frames = blocks.len(),
        "sending array"
    );

    for (index, block) in blocks.iter().enumerate() {
        let more = more_after || index + 1 < blocks.len();
        channel.send_frame(&bytes[block.byte_range(s)], more)?;
    }
    Ok(())
}

/// Receive one typed buffer's payload frames into pre-allocated storage.
///
/// Uses the identical block arithmetic as [`send_array`]: the same element
/// count and size yield the same partition on both ends.
pub fn recv_array(
    buffer: &mut TypedBuffer,
    channel: &mut impl MessageChannel,
    watchdog: &ArrivalWatchdog,
) -> Result<()> {
    let n = buffer.element_count();
    if n == 0 {
        return Err(TransferError::EmptyImage);
    }
    let s = buffer.element_type().size_in_bytes();

    let plan = ChunkPlan::new(n, s);
    let blocks = plan.blocks();
    let bytes = buffer.as_bytes_mut();

    trace!(
        elements = n,
        element_size = s,
        frames = blocks.len(),
        "receiving array"
    );

    for block in blocks {
        watchdog.await_next_frame(channel)?;
        let target = &mut bytes[block.byte_range(s)];
        let received = channel.recv_frame(target)?;
        if received < target.len() {
            return Err(TransferError::ShortRead {
                expected: target.len(),
                actual: received,
            });
        }
    }
    Ok(())
}

/// Send ordered planes; every frame but the very last of the last plane
/// keeps the multipart message open.
pub fn send_planes(
    planes: &[TypedBuffer],
    channel: &mut impl MessageChannel,
    more_after: bool,
) -> Result<()> {
    if planes.is_empty() {
        return Err(TransferError::EmptyImage);
    }
    for (index, plane) in planes.iter().enumerate() {
        let more = more_after || index + 1 < planes.len();
        send_array(plane, channel, more)?;
    }
    Ok(())
}

/// Receive ordered planes into pre-allocated storage.
pub fn recv_planes(
    planes: &mut [TypedBuffer],
    channel: &mut impl MessageChannel,
    watchdog: &ArrivalWatchdog,
) -> Result<()> {
    if planes.is_empty() {
        return Err(TransferError::EmptyImage);
    }
    for plane in planes {
        recv_array(plane, channel, watchdog)?;
    }
    Ok(())
}

/// Send a whole image: envelope header frame, then payload frames.
pub fn send_image(image: &Image, channel: &mut impl MessageChannel) -> Result<()> {
    if image.element_count() == 0 {
        return Err(TransferError::EmptyImage);
    }

    let descriptor = image.descriptor();
    let header = imgwire_proto::encode(&descriptor);
    debug!(header = %header, "sending image");
    channel.send_frame(header.as_bytes(), true)?;

    // TODO: metadata frames (name, calibration, ROIs) belong here, between
    // the header and the payload; nothing is transmitted for them yet.

    match image.pixel_data() {
        PixelData::Flat(buffer) => send_array(buffer, channel, false),
        PixelData::Planar(planes) => send_planes(planes, channel, false),
    }
}

/// Receive a whole image: wait for and parse the envelope header, allocate
/// matching storage, then receive the payload frames into it.
///
/// Header-level failures (version mismatch, unsupported element type or
/// layout) surface before any payload frame is read, leaving the channel at
/// a known message boundary.
pub fn recv_image(
    channel: &mut impl MessageChannel,
    watchdog: &ArrivalWatchdog,
) -> Result<Image> {
    watchdog.await_first_frame(channel)?;

    let mut header_buf = vec![0u8; MAX_HEADER_LEN];
    let received = channel.recv_frame(&mut header_buf)?;
    let header =
        std::str::from_utf8(&header_buf[..received]).map_err(|_| TransferError::HeaderNotText)?;
    debug!(header = %header, "received image header");

    let descriptor = imgwire_proto::decode(header)?;
    if descriptor.element_count() == Some(0) {
        return Err(TransferError::EmptyImage);
    }

    let mut image = Image::alloc(&descriptor)?;
    match image.pixel_data_mut() {
        PixelData::Flat(buffer) => recv_array(buffer, channel, watchdog)?,
        PixelData::Planar(planes) => recv_planes(planes, channel, watchdog)?,
    }
    Ok(image)
}
