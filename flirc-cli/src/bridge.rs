//! Connect / poll / reconnect supervisor.
//!
//! The tick worker lives for the whole run. Each device session runs the poll
//! loop on the calling thread; when the device fails, every button goes
//! offline and the supervisor waits for the receiver to come back.

use anyhow::{anyhow, Context, Result};
use flirc_keys::{worker, ButtonObserver, KeyState, Registry};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::device::Receiver;
use crate::settings::Settings;

/// How often the reconnect wait checks for shutdown.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Reports discoveries and state changes through the log.
pub struct LogObserver;

impl ButtonObserver for LogObserver {
    fn button_discovered(&self, code: u32, description: &str) {
        info!("New button {:#x}: {}", code, description);
    }

    fn state_changed(&self, code: u32, state: KeyState) {
        info!("Button {:#x} -> {} ({})", code, state.name(), state.value());
    }
}

/// Run until `running` is cleared.
pub fn run(settings: &Settings, registry: Arc<Registry>, running: Arc<AtomicBool>) -> Result<()> {
    let ticker = worker::spawn_tick_worker(
        Arc::clone(&registry),
        Arc::clone(&running),
        settings.tick_period(),
    )
    .context("failed to spawn tick worker")?;

    while running.load(Ordering::SeqCst) {
        let Some(mut receiver) = wait_for_receiver(settings, &running)? else {
            break;
        };

        registry.idle_all();
        let outcome = worker::run_poll_loop(&mut receiver, &registry, &running);
        drop(receiver);
        registry.offline_all();

        match outcome {
            Ok(()) => info!("Receiver closed"),
            Err(e) => warn!("Receiver read failed: {}; reconnecting", e),
        }
    }

    ticker
        .join()
        .map_err(|_| anyhow!("tick worker panicked"))?;

    for button in registry.snapshot() {
        info!(
            "{:#x} {}: {}",
            button.code,
            button.description,
            button.state.name()
        );
    }
    Ok(())
}

/// Open the receiver, retrying every reconnect interval.
///
/// Returns `None` if shutdown was requested while waiting.
fn wait_for_receiver(settings: &Settings, running: &AtomicBool) -> Result<Option<Receiver>> {
    let mut spinner: Option<ProgressBar> = None;

    while running.load(Ordering::SeqCst) {
        match Receiver::open(settings.vendor_id, settings.read_timeout()) {
            Ok(receiver) => {
                if let Some(pb) = spinner {
                    pb.finish_and_clear();
                }
                return Ok(Some(receiver));
            }
            Err(e) => {
                let pb = match spinner.take() {
                    Some(pb) => pb,
                    None => {
                        warn!("Could not connect receiver: {:#}", e);
                        new_spinner()?
                    }
                };
                pb.set_message(format!(
                    "Waiting for receiver {:04X} ({:#})",
                    settings.vendor_id, e
                ));
                spinner = Some(pb);
            }
        }

        let deadline = Instant::now() + settings.reconnect_interval();
        while running.load(Ordering::SeqCst) && Instant::now() < deadline {
            std::thread::sleep(SHUTDOWN_POLL);
        }
    }

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    Ok(None)
}

fn new_spinner() -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg} [{elapsed}]")
            .context("invalid spinner template")?,
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}
