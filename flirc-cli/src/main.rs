mod bridge;
mod device;
mod report;
mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flirc_keys::{CodeTable, MonotonicClock, Registry};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

use settings::Settings;

#[derive(Parser)]
#[command(name = "flirc-cli")]
#[command(about = "Flirc IR receiver key-state bridge")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Config file (default: ~/.config/flirc-bridge/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Decode receiver reports into button states until Ctrl-C
    Listen {
        /// TOML code table (overrides the config file)
        #[arg(long)]
        table: Option<PathBuf>,
        /// Threshold parameter, e.g. idleThreshold=100 (repeatable)
        #[arg(long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,
    },
    /// Detect if a receiver is connected
    Detect,
    /// Decode a single report given as hex bytes
    Decode {
        /// TOML code table (overrides the config file)
        #[arg(long)]
        table: Option<PathBuf>,
        /// Report bytes, e.g. `01 00 16`
        #[arg(required = true)]
        bytes: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config_path = cli.config.unwrap_or_else(Settings::default_path);
    let settings = Settings::load(&config_path)?;

    match cli.command {
        Command::Listen { table, params } => {
            let mut thresholds = settings.thresholds;
            for param in &params {
                thresholds
                    .apply_assignment(param)
                    .with_context(|| format!("applying --param {}", param))?;
            }
            info!(
                "Thresholds: release {}ms, idle {}ms, held {}ms",
                thresholds.release_ms, thresholds.idle_ms, thresholds.held_ms
            );

            let table = load_table(table.as_deref().or(settings.code_table.as_deref()))?;
            let registry = Arc::new(Registry::new(
                table,
                thresholds,
                MonotonicClock::new(),
                Arc::new(bridge::LogObserver),
            ));

            let running = Arc::new(AtomicBool::new(true));
            let running_clone = Arc::clone(&running);
            ctrlc::set_handler(move || {
                running_clone.store(false, Ordering::SeqCst);
            })
            .context("installing Ctrl-C handler")?;

            bridge::run(&settings, registry, running)?;
        }
        Command::Detect => match device::detect(settings.vendor_id)? {
            Some(product_id) => {
                println!(
                    "Receiver detected ({:04X}:{:04X}).",
                    settings.vendor_id, product_id
                );
            }
            None => {
                println!("Receiver {:04X} not detected.", settings.vendor_id);
                println!("Check the USB connection and device permissions.");
            }
        },
        Command::Decode { table, bytes } => {
            let table = load_table(table.as_deref().or(settings.code_table.as_deref()))?;
            let data = report::parse_report(&bytes).context("parsing report bytes")?;
            println!("{}", report::describe_report(&data, &table)?);
        }
    }

    Ok(())
}

fn load_table(path: Option<&Path>) -> Result<CodeTable> {
    match path {
        Some(path) => {
            let table = CodeTable::load(path)?;
            info!("Loaded {} key codes from {}", table.len(), path.display());
            Ok(table)
        }
        None => Ok(CodeTable::builtin()),
    }
}
