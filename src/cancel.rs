//! Cooperative cancellation
//!
//! A single token is threaded through every suspension point of a session
//! (pauses, settle delays, inter-repeat delays, frame poll backoff) so a
//! stop request unwinds all of them within bounded time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Largest uninterrupted slice slept at once
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Shared flag observed by every suspension point of a processing session
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. In-progress device calls finish, but no new
    /// action starts once this is observed.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`, waking early on cancellation.
    ///
    /// Returns false when the sleep was cut short.
    pub fn sleep(&self, duration: Duration) -> bool {
        self.sleep_until(Instant::now() + duration)
    }

    /// Sleep until `deadline` in small slices, waking early on cancellation.
    pub fn sleep_until(&self, deadline: Instant) -> bool {
        loop {
            if self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_completes_when_not_cancelled() {
        let token = CancellationToken::new();
        let started = Instant::now();
        assert!(token.sleep(Duration::from_millis(20)));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_sleep_interrupted_by_cancel() {
        let token = CancellationToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            remote.cancel();
        });

        let started = Instant::now();
        assert!(!token.sleep(Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_secs(2));
        handle.join().unwrap();
    }

    #[test]
    fn test_cancelled_token_does_not_sleep() {
        let token = CancellationToken::new();
        token.cancel();
        let started = Instant::now();
        assert!(!token.sleep(Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_millis(50));
    }
}
