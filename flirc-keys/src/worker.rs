//! Poll and tick loops.
//!
//! The poll loop blocks on a [`ReportSource`] and feeds decoded edges into the
//! registry. The tick loop runs on its own thread at a short fixed period so
//! thresholds are applied even when no reports arrive. Both stop when the
//! shared `running` flag is cleared.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, warn};

use crate::decode::decode;
use crate::registry::Registry;

/// Receiver reports are 8 bytes; only the first 3 are decoded.
pub const REPORT_BUFFER_LEN: usize = 8;

/// Default tick period.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(1);

/// Something that yields raw input reports.
pub trait ReportSource {
    type Error;

    /// Read one report into `buf`.
    ///
    /// `Ok(None)` is a read timeout, which is a normal event. The timeout
    /// must be bounded so the poll loop can notice shutdown.
    fn read_report(&mut self, buf: &mut [u8]) -> Result<Option<usize>, Self::Error>;
}

/// Read and dispatch reports until `running` is cleared or the source fails.
///
/// Errors that arrive after shutdown was requested are swallowed.
pub fn run_poll_loop<S: ReportSource>(
    source: &mut S,
    registry: &Registry,
    running: &AtomicBool,
) -> Result<(), S::Error> {
    let mut buf = [0u8; REPORT_BUFFER_LEN];

    while running.load(Ordering::SeqCst) {
        match source.read_report(&mut buf) {
            Ok(Some(len)) => {
                let report = &buf[..len.min(buf.len())];
                debug!("report {:02X?}", report);
                match decode(report) {
                    Ok(event) => registry.on_report(&event),
                    Err(e) => warn!("dropping report {:02X?}: {e}", report),
                }
            }
            Ok(None) => registry.on_read_timeout(),
            Err(_) if !running.load(Ordering::SeqCst) => break,
            Err(e) => return Err(e),
        }
    }

    debug!("poll loop exiting");
    Ok(())
}

/// Spawn the tick worker thread.
pub fn spawn_tick_worker(
    registry: Arc<Registry>,
    running: Arc<AtomicBool>,
    period: Duration,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("key-tick".into())
        .spawn(move || {
            debug!("tick worker started ({period:?})");
            while running.load(Ordering::SeqCst) {
                registry.tick_all();
                std::thread::sleep(period);
            }
            debug!("tick worker exiting");
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::KeyState;
    use crate::clock::ManualClock;
    use crate::codes::{CodeTable, Section};
    use crate::config::Thresholds;
    use crate::registry::NullObserver;
    use std::collections::VecDeque;
    use std::time::Instant;

    #[derive(Debug, PartialEq)]
    struct Unplugged;

    enum Step {
        Report(Vec<u8>),
        Timeout,
        Fail,
    }

    /// Replays a script, advancing the clock 1ms per read, then stops the loop.
    struct Scripted<'a> {
        steps: VecDeque<Step>,
        clock: ManualClock,
        running: &'a AtomicBool,
    }

    impl ReportSource for Scripted<'_> {
        type Error = Unplugged;

        fn read_report(&mut self, buf: &mut [u8]) -> Result<Option<usize>, Unplugged> {
            self.clock.advance(1);
            match self.steps.pop_front() {
                Some(Step::Report(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(Some(bytes.len()))
                }
                Some(Step::Timeout) => Ok(None),
                Some(Step::Fail) => Err(Unplugged),
                None => {
                    self.running.store(false, Ordering::SeqCst);
                    Ok(None)
                }
            }
        }
    }

    fn registry(clock: &ManualClock) -> Registry {
        let mut table = CodeTable::new();
        table.insert(Section::Plain, 0x16, "A");
        Registry::new(
            table,
            Thresholds::new(2, 10, 1),
            clock.clone(),
            Arc::new(NullObserver),
        )
    }

    #[test]
    fn test_poll_loop_dispatches_reports() {
        let clock = ManualClock::new(0);
        let registry = registry(&clock);
        let running = AtomicBool::new(true);
        let mut source = Scripted {
            steps: VecDeque::from([
                Step::Report(vec![1, 0, 0x16, 0, 0, 0, 0, 0]),
                Step::Report(vec![1, 0, 0, 0, 0, 0, 0, 0]),
                Step::Report(vec![1]),
            ]),
            clock: clock.clone(),
            running: &running,
        };

        assert_eq!(run_poll_loop(&mut source, &registry, &running), Ok(()));
        assert_eq!(registry.pending(), 1);
        assert_eq!(registry.snapshot()[0].description, "A");

        clock.advance(2);
        registry.tick_all();
        assert_eq!(registry.state(0x116), Some(KeyState::Pressed));
    }

    #[test]
    fn test_poll_loop_timeout_releases() {
        let clock = ManualClock::new(0);
        let registry = registry(&clock);
        let running = AtomicBool::new(true);
        let mut source = Scripted {
            steps: VecDeque::from([Step::Report(vec![1, 0, 0x16]), Step::Timeout]),
            clock: clock.clone(),
            running: &running,
        };

        run_poll_loop(&mut source, &registry, &running).unwrap();
        clock.advance(2);
        registry.tick_all();
        assert_eq!(registry.state(0x116), Some(KeyState::Pressed));
    }

    #[test]
    fn test_poll_loop_stops_on_error() {
        let clock = ManualClock::new(0);
        let registry = registry(&clock);
        let running = AtomicBool::new(true);
        let mut source = Scripted {
            steps: VecDeque::from([Step::Report(vec![1, 0, 0x16]), Step::Fail]),
            clock: clock.clone(),
            running: &running,
        };

        assert_eq!(
            run_poll_loop(&mut source, &registry, &running),
            Err(Unplugged)
        );
        assert!(running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_error_after_shutdown_is_ignored() {
        let clock = ManualClock::new(0);
        let registry = registry(&clock);
        let running = AtomicBool::new(true);

        struct FailAfterStop<'a>(&'a AtomicBool);
        impl ReportSource for FailAfterStop<'_> {
            type Error = Unplugged;
            fn read_report(&mut self, _buf: &mut [u8]) -> Result<Option<usize>, Unplugged> {
                self.0.store(false, Ordering::SeqCst);
                Err(Unplugged)
            }
        }

        let mut source = FailAfterStop(&running);
        assert_eq!(run_poll_loop(&mut source, &registry, &running), Ok(()));
    }

    #[test]
    fn test_tick_worker_applies_thresholds() {
        let clock = ManualClock::new(1);
        let registry = Arc::new(registry(&clock));
        let running = Arc::new(AtomicBool::new(true));

        registry.on_report(&decode(&[1, 0, 0x16]).unwrap());
        clock.set(20);

        let worker =
            spawn_tick_worker(registry.clone(), running.clone(), DEFAULT_TICK_PERIOD).unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while registry.state(0x116) != Some(KeyState::Held) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        running.store(false, Ordering::SeqCst);
        worker.join().unwrap();

        assert_eq!(registry.state(0x116), Some(KeyState::Held));
    }
}
