//! Bridge configuration file.
//!
//! Everything is optional; a missing file means all defaults.

use anyhow::{Context, Result};
use flirc_keys::Thresholds;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::device::FLIRC_VID;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// USB vendor id of the receiver
    pub vendor_id: u16,
    /// Bounded device read; a timeout counts as "no key pressed".
    ///
    /// The receiver does not repeat reports while a key stays down, so a press
    /// longer than this reads as a release. Keep it above `thresholds.held`
    /// or `Held` is never reached.
    pub read_timeout_ms: u64,
    /// Delay between reconnection attempts
    pub reconnect_interval_ms: u64,
    /// Tick worker period
    pub tick_period_ms: u64,
    /// TOML code table; the built-in table is used when unset
    pub code_table: Option<PathBuf>,
    pub thresholds: Thresholds,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vendor_id: FLIRC_VID,
            read_timeout_ms: 1000,
            reconnect_interval_ms: 5000,
            tick_period_ms: 1,
            code_table: None,
            thresholds: Thresholds::default(),
        }
    }
}

impl Settings {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flirc-bridge")
            .join("config.toml")
    }

    /// Load settings from a file, or return defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms.max(1))
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let settings = Settings::load(Path::new("/nonexistent/flirc-bridge.toml")).unwrap();
        assert_eq!(settings.vendor_id, FLIRC_VID);
        assert_eq!(settings.thresholds, Thresholds::default());
        assert!(settings.code_table.is_none());
        assert!(settings.read_timeout_ms > settings.thresholds.held_ms);
    }

    #[test]
    fn test_parse_full() {
        let settings: Settings = toml::from_str(
            r#"
            vendor_id = 0x20a0
            read_timeout_ms = 250
            reconnect_interval_ms = 1000
            tick_period_ms = 2
            code_table = "scancodes.toml"

            [thresholds]
            idle = 120
            held = 500
            release = 30
            "#,
        )
        .unwrap();
        assert_eq!(settings.read_timeout(), Duration::from_millis(250));
        assert_eq!(settings.tick_period(), Duration::from_millis(2));
        assert_eq!(settings.code_table, Some(PathBuf::from("scancodes.toml")));
        assert_eq!(settings.thresholds, Thresholds::new(120, 500, 30));
    }

    #[test]
    fn test_partial_thresholds() {
        let settings: Settings = toml::from_str("[thresholds]\nheld = \"abc\"\nidle = 80").unwrap();
        assert_eq!(settings.thresholds.idle_ms, 80);
        assert_eq!(
            settings.thresholds.held_ms,
            flirc_keys::config::DEFAULT_HELD_MS
        );
    }

    #[test]
    fn test_zero_periods_are_clamped() {
        let settings: Settings = toml::from_str("tick_period_ms = 0\nread_timeout_ms = 0").unwrap();
        assert_eq!(settings.tick_period(), Duration::from_millis(1));
        assert_eq!(settings.read_timeout(), Duration::from_millis(1));
    }
}
