use std::io::{ErrorKind, Read, Write};

use bytes::BytesMut;
use tracing::trace;

use crate::error::{ChannelError, Result};
use crate::traits::MessageChannel;
use crate::wire::{decode_frame, encode_frame, frame_ready, ChannelConfig};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
// Pixel payloads run to megabytes; pull them off the stream in large bites.
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// A message channel over any byte stream.
///
/// Encodes frames with the [`wire`](crate::wire) header and handles partial
/// reads internally — consumers always get complete frames.
///
/// The readiness predicates (`is_readable`, `has_more_frames`) probe the
/// stream with a single opportunistic read. For those probes to be
/// non-blocking the underlying stream must be in non-blocking mode or carry
/// a short read timeout; `WouldBlock` and `TimedOut` are treated as "no data
/// yet". `recv_frame` itself blocks until a complete frame has arrived.
pub struct StreamChannel<T> {
    inner: T,
    rbuf: BytesMut,
    wbuf: BytesMut,
    config: ChannelConfig,
    last_more: bool,
    eof: bool,
}

impl<T: Read + Write> StreamChannel<T> {
    /// Create a stream channel with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, ChannelConfig::default())
    }

    /// Create a stream channel with explicit configuration.
    pub fn with_config(inner: T, config: ChannelConfig) -> Self {
        Self {
            inner,
            rbuf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            wbuf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            last_more: false,
            eof: false,
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the channel and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current channel configuration.
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// One read attempt that tolerates "no data yet" conditions.
    fn fill_opportunistic(&mut self) -> Result<()> {
        if self.eof {
            return Ok(());
        }
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        match self.inner.read(&mut chunk) {
            Ok(0) => self.eof = true,
            Ok(n) => self.rbuf.extend_from_slice(&chunk[..n]),
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) => {}
            Err(err) => return Err(ChannelError::Io(err)),
        }
        Ok(())
    }

    fn frame_buffered(&mut self) -> Result<bool> {
        if frame_ready(&self.rbuf, self.config.max_payload_size)? {
            return Ok(true);
        }
        self.fill_opportunistic()?;
        if frame_ready(&self.rbuf, self.config.max_payload_size)? {
            return Ok(true);
        }
        if self.eof {
            return Err(ChannelError::ConnectionClosed);
        }
        Ok(false)
    }
}

impl<T: Read + Write> MessageChannel for StreamChannel<T> {
    fn send_frame(&mut self, payload: &[u8], more: bool) -> Result<()> {
        if payload.len() > self.config.max_payload_size {
            return Err(ChannelError::FrameTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        self.wbuf.clear();
        encode_frame(payload, more, &mut self.wbuf)?;
        trace!(len = payload.len(), more, "writing frame");

        let mut offset = 0usize;
        while offset < self.wbuf.len() {
            match self.inner.write(&self.wbuf[offset..]) {
                Ok(0) => return Err(ChannelError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(ChannelError::Io(err)),
            }
        }

        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(ChannelError::Io(err)),
            }
        }
    }

    fn recv_frame(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            if let Some(frame) = decode_frame(&mut self.rbuf, self.config.max_payload_size)? {
                self.last_more = frame.more;
                let n = frame.payload.len().min(buf.len());
                buf[..n].copy_from_slice(&frame.payload[..n]);
                trace!(len = n, more = frame.more, "read frame");
                return Ok(n);
            }

            if self.eof {
                return Err(ChannelError::ConnectionClosed);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            match self.inner.read(&mut chunk) {
                Ok(0) => self.eof = true,
                Ok(n) => self.rbuf.extend_from_slice(&chunk[..n]),
                Err(err)
                    if matches!(
                        err.kind(),
                        ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
                    ) =>
                {
                    continue
                }
                Err(err) => return Err(ChannelError::Io(err)),
            }
        }
    }

    fn has_more_frames(&mut self) -> Result<bool> {
        if !self.last_more {
            return Ok(false);
        }
        self.frame_buffered()
    }

    fn is_readable(&mut self) -> Result<bool> {
        self.frame_buffered()
    }
}

impl<T> std::fmt::Debug for StreamChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamChannel")
            .field("buffered", &self.rbuf.len())
            .field("eof", &self.eof)
            .finish()
    }
}
