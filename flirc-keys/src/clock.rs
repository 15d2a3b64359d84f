//! Millisecond time sources

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Monotonic millisecond clock
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Process-relative clock backed by [`Instant`]. Starts at 1 so `0` is never
/// a valid timestamp.
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        (self.start.elapsed().as_millis() as u64).saturating_add(1)
    }
}

/// Settable clock for tests and report replay.
///
/// Clones share the same time value, so one handle can be given to a
/// [`Registry`](crate::Registry) while another advances it.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let first = clock.now_ms();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(clock.now_ms() >= first + 1);
    }

    #[test]
    fn monotonic_clock_starts_at_one() {
        let clock = MonotonicClock::new();
        assert!(clock.now_ms() >= 1);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(1);
        let handle = clock.clone();
        handle.advance(4);
        assert_eq!(clock.now_ms(), 5);
        handle.set(42);
        assert_eq!(clock.now_ms(), 42);
    }
}
