use crate::error::Result;

/// A message-oriented channel delivering ordered, discrete frames.
///
/// This is the transport seam of the transfer protocol: one logical array
/// transfer occupies one contiguous frame sequence on a channel dedicated to
/// that purpose. Frames carry a continuation flag; the last frame of a
/// logical message is the one sent with `more = false`.
///
/// The readiness predicates exist for the arrival watchdog, which polls them
/// to turn transport silence into a bounded failure instead of an indefinite
/// block.
pub trait MessageChannel {
    /// Send one frame, flagged with whether more frames follow.
    fn send_frame(&mut self, payload: &[u8], more: bool) -> Result<()>;

    /// Receive the next frame into `buf`, truncating at `buf.len()`.
    ///
    /// Returns the number of bytes copied. Blocks until a frame is
    /// available; callers that need a bounded wait check [`is_readable`]
    /// first.
    ///
    /// [`is_readable`]: MessageChannel::is_readable
    fn recv_frame(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Whether a continuation frame of the open multipart message is
    /// available: the previously received frame was flagged `more` and the
    /// next frame has arrived.
    fn has_more_frames(&mut self) -> Result<bool>;

    /// Whether a frame is available to read right now.
    fn is_readable(&mut self) -> Result<bool>;
}
