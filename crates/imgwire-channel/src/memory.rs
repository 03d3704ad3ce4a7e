use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

use tracing::trace;

use crate::error::{ChannelError, Result};
use crate::traits::MessageChannel;
use crate::wire::WireFrame;

#[derive(Default)]
struct Queue {
    frames: VecDeque<WireFrame>,
    hangup: bool,
}

#[derive(Default)]
struct Direction {
    queue: Mutex<Queue>,
    ready: Condvar,
}

impl Direction {
    fn push(&self, frame: WireFrame) -> Result<()> {
        let mut queue = self.queue.lock().unwrap();
        if queue.hangup {
            return Err(ChannelError::ConnectionClosed);
        }
        queue.frames.push_back(frame);
        self.ready.notify_all();
        Ok(())
    }

    fn pop_blocking(&self) -> Result<WireFrame> {
        let mut queue = self.queue.lock().unwrap();
        loop {
            if let Some(frame) = queue.frames.pop_front() {
                return Ok(frame);
            }
            if queue.hangup {
                return Err(ChannelError::ConnectionClosed);
            }
            queue = self.ready.wait(queue).unwrap();
        }
    }

    fn hangup(&self) {
        let mut queue = self.queue.lock().unwrap();
        queue.hangup = true;
        self.ready.notify_all();
    }
}

/// One endpoint of an in-process channel pair.
///
/// Frames travel between the two endpoints through shared queues; `recv`
/// blocks until a frame arrives or the peer endpoint is dropped. Useful for
/// loopback transfers between threads and for deterministic wire-level
/// assertions in tests.
pub struct MemoryChannel {
    rx: Arc<Direction>,
    tx: Arc<Direction>,
    last_more: bool,
}

impl MemoryChannel {
    /// Create a connected pair of endpoints.
    pub fn pair() -> (MemoryChannel, MemoryChannel) {
        let a_to_b = Arc::new(Direction::default());
        let b_to_a = Arc::new(Direction::default());

        let a = MemoryChannel {
            rx: Arc::clone(&b_to_a),
            tx: Arc::clone(&a_to_b),
            last_more: false,
        };
        let b = MemoryChannel {
            rx: a_to_b,
            tx: b_to_a,
            last_more: false,
        };
        (a, b)
    }

    /// Number of frames queued for this endpoint to receive.
    pub fn pending_frames(&self) -> usize {
        self.rx.queue.lock().unwrap().frames.len()
    }

    /// Pop the next inbound frame raw, without multipart bookkeeping.
    ///
    /// Wire-level inspection for tests; regular consumers go through
    /// [`MessageChannel::recv_frame`].
    pub fn pop_frame(&mut self) -> Option<WireFrame> {
        self.rx.queue.lock().unwrap().frames.pop_front()
    }
}

impl MessageChannel for MemoryChannel {
    fn send_frame(&mut self, payload: &[u8], more: bool) -> Result<()> {
        trace!(len = payload.len(), more, "queueing frame");
        self.tx.push(WireFrame::new(payload.to_vec(), more))
    }

    fn recv_frame(&mut self, buf: &mut [u8]) -> Result<usize> {
        let frame = self.rx.pop_blocking()?;
        self.last_more = frame.more;
        let n = frame.payload.len().min(buf.len());
        buf[..n].copy_from_slice(&frame.payload[..n]);
        trace!(len = n, more = frame.more, "dequeued frame");
        Ok(n)
    }

    fn has_more_frames(&mut self) -> Result<bool> {
        Ok(self.last_more && self.pending_frames() > 0)
    }

    fn is_readable(&mut self) -> Result<bool> {
        Ok(self.pending_frames() > 0)
    }
}

impl Drop for MemoryChannel {
    fn drop(&mut self) {
        // Wake any peer blocked in recv; the pair is dead once one endpoint
        // is gone.
        self.tx.hangup();
        self.rx.hangup();
    }
}

impl std::fmt::Debug for MemoryChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryChannel")
            .field("pending", &self.pending_frames())
            .finish()
    }
}
