//! Key-state timing thresholds.
//!
//! Three durations drive every button:
//! - `release`: how long a release must persist before it is trusted
//! - `idle`: how long after a release the button is considered idle again
//! - `held`: how long a continuous press must last before it escalates to held
//!
//! Thresholds come from a TOML `[thresholds]` section or from host-style
//! `name=value` parameters. Values that are missing or not non-negative
//! integers fall back to the defaults below.

use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::ConfigError;

/// Default release settle time (ms)
pub const DEFAULT_RELEASE_MS: u64 = 50;
/// Default time from release to idle (ms)
pub const DEFAULT_IDLE_MS: u64 = 100;
/// Default continuous press time before held (ms)
pub const DEFAULT_HELD_MS: u64 = 400;

/// Parameter names used by the host configuration layer
pub mod param {
    pub const IDLE: &str = "idleThreshold";
    pub const HELD: &str = "pressThreshold";
    pub const RELEASE: &str = "releaseThreshold";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub idle_ms: u64,
    pub held_ms: u64,
    pub release_ms: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            idle_ms: DEFAULT_IDLE_MS,
            held_ms: DEFAULT_HELD_MS,
            release_ms: DEFAULT_RELEASE_MS,
        }
    }
}

impl Thresholds {
    pub fn new(idle_ms: u64, held_ms: u64, release_ms: u64) -> Self {
        Self {
            idle_ms,
            held_ms,
            release_ms,
        }
    }

    /// Build thresholds from a full parameter set; absent names use defaults.
    pub fn from_params<'a, I>(params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut thresholds = Self::default();
        for (name, value) in params {
            if let Err(e) = thresholds.apply_param(name, value) {
                debug!("ignoring parameter: {e}");
            }
        }
        thresholds
    }

    /// Apply one `name=value` parameter.
    ///
    /// An unparsable value resets that threshold to its default.
    pub fn apply_param(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let (slot, default) = match name {
            param::IDLE => (&mut self.idle_ms, DEFAULT_IDLE_MS),
            param::HELD => (&mut self.held_ms, DEFAULT_HELD_MS),
            param::RELEASE => (&mut self.release_ms, DEFAULT_RELEASE_MS),
            other => return Err(ConfigError::UnknownParameter(other.to_string())),
        };
        *slot = parse_ms(value).unwrap_or(default);
        debug!("{name} set to {}", *slot);
        Ok(())
    }

    /// Apply a `name=value` string, as given on the command line.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| ConfigError::MalformedParameter(assignment.to_string()))?;
        self.apply_param(name.trim(), value.trim())
    }
}

fn parse_ms(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

/// Accepts integers and numeric strings; anything else yields `None`.
fn lenient_ms<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Raw::deserialize(d)? {
        Raw::Int(n) => u64::try_from(n).ok(),
        Raw::Text(s) => parse_ms(&s),
        Raw::Other(_) => None,
    })
}

impl<'de> Deserialize<'de> for Thresholds {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Repr {
            #[serde(default, deserialize_with = "lenient_ms")]
            idle: Option<u64>,
            #[serde(default, deserialize_with = "lenient_ms")]
            held: Option<u64>,
            #[serde(default, deserialize_with = "lenient_ms")]
            release: Option<u64>,
        }

        let repr = Repr::deserialize(d)?;
        let resolve = |name: &str, value: Option<u64>, default: u64| {
            value.unwrap_or_else(|| {
                debug!("{name} threshold missing or invalid, using {default}ms");
                default
            })
        };
        Ok(Self {
            idle_ms: resolve("idle", repr.idle, DEFAULT_IDLE_MS),
            held_ms: resolve("held", repr.held, DEFAULT_HELD_MS),
            release_ms: resolve("release", repr.release, DEFAULT_RELEASE_MS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_params() {
        let t = Thresholds::from_params([
            (param::IDLE, "250"),
            (param::HELD, "800"),
            (param::RELEASE, "20"),
        ]);
        assert_eq!(t, Thresholds::new(250, 800, 20));
    }

    #[test]
    fn test_invalid_param_falls_back_to_default() {
        let mut t = Thresholds::new(1, 2, 3);
        t.apply_param(param::IDLE, "soon").unwrap();
        t.apply_param(param::HELD, "-5").unwrap();
        assert_eq!(t.idle_ms, DEFAULT_IDLE_MS);
        assert_eq!(t.held_ms, DEFAULT_HELD_MS);
        assert_eq!(t.release_ms, 3);
    }

    #[test]
    fn test_unknown_param() {
        let mut t = Thresholds::default();
        assert_eq!(
            t.apply_param("holdThreshold", "10"),
            Err(ConfigError::UnknownParameter("holdThreshold".into()))
        );
    }

    #[test]
    fn test_assignment() {
        let mut t = Thresholds::default();
        t.apply_assignment("releaseThreshold = 5").unwrap();
        assert_eq!(t.release_ms, 5);
        assert!(matches!(
            t.apply_assignment("releaseThreshold"),
            Err(ConfigError::MalformedParameter(_))
        ));
    }

    #[test]
    fn test_deserialize_lenient() {
        let t: Thresholds = toml::from_str(
            r#"
            idle = "150"
            held = true
            "#,
        )
        .unwrap();
        assert_eq!(t.idle_ms, 150);
        assert_eq!(t.held_ms, DEFAULT_HELD_MS);
        assert_eq!(t.release_ms, DEFAULT_RELEASE_MS);
    }

    #[test]
    fn test_deserialize_negative_uses_default() {
        let t: Thresholds = toml::from_str("release = -1\nidle = 7").unwrap();
        assert_eq!(t.release_ms, DEFAULT_RELEASE_MS);
        assert_eq!(t.idle_ms, 7);
    }
}
