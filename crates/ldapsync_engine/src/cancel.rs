//! Cooperative cancellation for long-running sync sessions.

use crate::error::{SyncError, SyncResult};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct CancelState {
    cancelled: Mutex<bool>,
    wakeup: Condvar,
}

/// A cloneable handle that stops a sync session.
///
/// Engines check the token before every search, before every streamed
/// message, and around backoff sleeps. Cancelling also wakes a session that
/// is currently sleeping.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<CancelState>,
}

impl CancelToken {
    /// Creates an uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        *self.state.cancelled.lock() = true;
        self.state.wakeup.notify_all();
    }

    /// Clears a previous cancellation so the session can run again.
    pub fn reset(&self) {
        *self.state.cancelled.lock() = false;
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        *self.state.cancelled.lock()
    }

    /// Fails with [`SyncError::Cancelled`] if cancellation was requested.
    pub fn check(&self) -> SyncResult<()> {
        if self.is_cancelled() {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleeps for `duration` unless cancelled first.
    ///
    /// A duration too large to represent as a deadline sleeps until
    /// cancelled.
    pub fn sleep(&self, duration: Duration) -> SyncResult<()> {
        let deadline = Instant::now().checked_add(duration);
        let mut cancelled = self.state.cancelled.lock();
        while !*cancelled {
            match deadline {
                Some(deadline) => {
                    if self
                        .state
                        .wakeup
                        .wait_until(&mut cancelled, deadline)
                        .timed_out()
                    {
                        break;
                    }
                }
                None => self.state.wakeup.wait(&mut cancelled),
            }
        }
        if *cancelled {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn cancel_and_reset() {
        let token = CancelToken::new();
        assert!(token.check().is_ok());

        token.clone().cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(SyncError::Cancelled)));

        token.reset();
        assert!(token.check().is_ok());
    }

    #[test]
    fn sleep_completes_without_cancel() {
        let token = CancelToken::new();
        let start = Instant::now();
        token.sleep(Duration::from_millis(20)).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn cancel_interrupts_sleep() {
        let token = CancelToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        let start = Instant::now();
        let result = token.sleep(Duration::from_secs(30));
        handle.join().unwrap();

        assert!(matches!(result, Err(SyncError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn cancel_interrupts_unbounded_sleep() {
        let token = CancelToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        let result = token.sleep(Duration::MAX);
        handle.join().unwrap();
        assert!(matches!(result, Err(SyncError::Cancelled)));
    }
}
