//! Bounded waiting for frame arrival.
//!
//! The watchdog turns transport silence into a reportable failure: it polls
//! the channel's readiness predicate once per second until the frame shows
//! up or the configured number of seconds has elapsed. One-second
//! granularity is deliberate — this detects a broken connection, it does
//! not provide latency control.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use imgwire_channel::MessageChannel;
use tracing::{trace, warn};

use crate::error::{Result, TransferError};

/// Seconds to wait for incoming data before declaring the connection
/// broken, when nothing else is configured.
pub const DEFAULT_CONNECTION_BROKEN_TIMEOUT: i64 = 60;

static CONNECTION_BROKEN_TIMEOUT: AtomicI64 = AtomicI64::new(DEFAULT_CONNECTION_BROKEN_TIMEOUT);

/// Set the process-wide connection-broken timeout, in seconds.
///
/// A negative argument resets to the default instead of being taken
/// literally. Intended to be called during initialization, before any
/// transfer begins; an in-progress wait is not affected.
pub fn set_connection_broken_timeout(seconds: i64) {
    let value = if seconds < 0 {
        DEFAULT_CONNECTION_BROKEN_TIMEOUT
    } else {
        seconds
    };
    CONNECTION_BROKEN_TIMEOUT.store(value, Ordering::Relaxed);
}

/// Read the process-wide connection-broken timeout, in seconds.
pub fn get_connection_broken_timeout() -> i64 {
    CONNECTION_BROKEN_TIMEOUT.load(Ordering::Relaxed)
}

/// Polls a channel for frame arrival, bounded by a per-instance timeout.
///
/// A non-positive timeout means "check once, fail immediately if nothing
/// is there" — no sleep loop. Note the asymmetry with
/// [`set_connection_broken_timeout`], which coerces negative values to the
/// default; a watchdog constructed directly keeps the literal value.
#[derive(Debug, Clone, Copy)]
pub struct ArrivalWatchdog {
    timeout_secs: i64,
}

impl ArrivalWatchdog {
    /// Create a watchdog with an explicit timeout in seconds.
    pub fn new(timeout_secs: i64) -> Self {
        Self { timeout_secs }
    }

    /// The configured timeout in seconds.
    pub fn timeout_secs(&self) -> i64 {
        self.timeout_secs
    }

    /// Wait until the first frame of a message is observable on the
    /// channel.
    pub fn await_first_frame(&self, channel: &mut impl MessageChannel) -> Result<()> {
        self.poll(channel, "first", |c| c.is_readable())
    }

    /// Wait until a continuation frame of the open multipart message is
    /// observable on the channel.
    pub fn await_next_frame(&self, channel: &mut impl MessageChannel) -> Result<()> {
        self.poll(channel, "next", |c| c.has_more_frames())
    }

    fn poll<C, F>(&self, channel: &mut C, what: &str, mut ready: F) -> Result<()>
    where
        C: MessageChannel,
        F: FnMut(&mut C) -> imgwire_channel::Result<bool>,
    {
        let mut waited = 0i64;
        while waited < self.timeout_secs && !ready(channel)? {
            trace!(what, waited, "no frame yet, sleeping");
            std::thread::sleep(Duration::from_secs(1));
            waited += 1;
        }

        if ready(channel)? {
            Ok(())
        } else {
            warn!(what, timeout_secs = self.timeout_secs, "frame never arrived");
            Err(TransferError::BrokenConnection {
                waited_secs: self.timeout_secs.max(0),
            })
        }
    }
}

impl Default for ArrivalWatchdog {
    /// Snapshot the process-wide timeout at construction time.
    fn default() -> Self {
        Self::new(get_connection_broken_timeout())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use imgwire_channel::{MemoryChannel, MessageChannel};

    use super::*;

    #[test]
    fn ready_channel_passes_without_sleeping() {
        let (mut tx, mut rx) = MemoryChannel::pair();
        tx.send_frame(b"here", false).unwrap();

        let start = Instant::now();
        ArrivalWatchdog::new(60).await_first_frame(&mut rx).unwrap();
        assert!(start.elapsed().as_millis() < 500);
    }

    #[test]
    fn silent_channel_times_out_after_configured_seconds() {
        let (_tx, mut rx) = MemoryChannel::pair();

        let start = Instant::now();
        let err = ArrivalWatchdog::new(2).await_first_frame(&mut rx).unwrap_err();
        let elapsed = start.elapsed();

        assert!(matches!(
            err,
            TransferError::BrokenConnection { waited_secs: 2 }
        ));
        assert!(elapsed.as_secs_f64() >= 1.9, "waited only {elapsed:?}");
        assert!(elapsed.as_secs_f64() < 4.0, "waited {elapsed:?}");
    }

    #[test]
    fn non_positive_timeout_checks_once_without_sleeping() {
        let (_tx, mut rx) = MemoryChannel::pair();

        for timeout in [0, -1, -30] {
            let start = Instant::now();
            let err = ArrivalWatchdog::new(timeout)
                .await_first_frame(&mut rx)
                .unwrap_err();
            assert!(matches!(err, TransferError::BrokenConnection { .. }));
            assert!(start.elapsed().as_millis() < 200);
        }
    }

    #[test]
    fn next_frame_requires_open_multipart_message() {
        let (mut tx, mut rx) = MemoryChannel::pair();
        tx.send_frame(b"head", true).unwrap();
        tx.send_frame(b"tail", false).unwrap();

        let mut buf = [0u8; 8];
        rx.recv_frame(&mut buf).unwrap();

        ArrivalWatchdog::new(5).await_next_frame(&mut rx).unwrap();
        rx.recv_frame(&mut buf).unwrap();

        // Message complete: no continuation can arrive anymore.
        let err = ArrivalWatchdog::new(0).await_next_frame(&mut rx).unwrap_err();
        assert!(matches!(err, TransferError::BrokenConnection { .. }));
    }

    #[test]
    fn global_timeout_setter_and_quirk() {
        assert_eq!(get_connection_broken_timeout(), 60);

        set_connection_broken_timeout(5);
        assert_eq!(get_connection_broken_timeout(), 5);
        assert_eq!(ArrivalWatchdog::default().timeout_secs(), 5);

        // Negative input resets to the default rather than being accepted.
        set_connection_broken_timeout(-7);
        assert_eq!(get_connection_broken_timeout(), 60);
    }
}
