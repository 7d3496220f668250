use std::fmt;
use std::time::Duration;

use rsevents::{Awaitable, EventState, ManualResetEvent};

/// Lets one thread sleep for a bounded time until another thread tells it to stop.
///
/// This is a minimal cross-thread wake mechanism standing in for a full event loop: it is
/// sufficient for "one thread waits for one external signal". Each
/// [`EventFuture`][crate::EventFuture] owns its own signal, so a stop requested for one future
/// can never wake a thread waiting on another.
///
/// A stop request is sticky: once requested, every later [`block_with_timeout()`] returns
/// immediately. This means a stop requested before anyone started blocking is not lost.
///
/// [`block_with_timeout()`]: Self::block_with_timeout
pub struct WakeSignal {
    stop_requested: ManualResetEvent,
}

impl WakeSignal {
    /// Creates a signal with no stop requested.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stop_requested: ManualResetEvent::new(EventState::Unset),
        }
    }

    /// Blocks the calling thread until a stop is requested or `timeout` elapses,
    /// whichever comes first.
    ///
    /// The caller is not told which of the two happened; it is expected to inspect
    /// whatever state the signaling thread was supposed to update.
    pub fn block_with_timeout(&self, timeout: Duration) {
        // Timing out is a normal outcome here.
        _ = self.stop_requested.try_wait_for(timeout);
    }

    /// Requests the blocked thread (if any) to stop blocking.
    pub fn request_stop(&self) {
        self.stop_requested.set();
    }

    /// Whether a stop has been requested. Does not block.
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.try_wait0().is_ok()
    }
}

impl Default for WakeSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WakeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WakeSignal")
            .field("stop_requested", &self.is_stop_requested())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    use static_assertions::assert_impl_all;
    use testing::with_watchdog;

    use super::*;

    assert_impl_all!(WakeSignal: Send, Sync);

    #[test]
    fn times_out_without_stop() {
        let signal = WakeSignal::new();

        let start = Instant::now();
        signal.block_with_timeout(Duration::from_millis(20));

        assert!(start.elapsed() >= Duration::from_millis(20));
        assert!(!signal.is_stop_requested());
    }

    #[test]
    fn stop_before_block_is_not_lost() {
        with_watchdog(|| {
            let signal = WakeSignal::new();
            signal.request_stop();

            let start = Instant::now();
            signal.block_with_timeout(Duration::from_secs(30));

            assert!(start.elapsed() < Duration::from_secs(5));
            assert!(signal.is_stop_requested());
        });
    }

    #[test]
    fn stop_from_other_thread_wakes_blocked_thread() {
        with_watchdog(|| {
            let signal = Arc::new(WakeSignal::new());

            let signal_clone = Arc::clone(&signal);
            let stopper = thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                signal_clone.request_stop();
            });

            let start = Instant::now();
            signal.block_with_timeout(Duration::from_secs(30));

            assert!(start.elapsed() < Duration::from_secs(5));
            stopper.join().unwrap();
        });
    }
}
