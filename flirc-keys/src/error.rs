//! Error types for decoding, code tables and configuration

use std::path::PathBuf;

use thiserror::Error;

/// Errors from turning a raw report into a key event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("report too short: got {0} bytes, need at least 3")]
    ShortReport(usize),
}

/// Errors from loading a code table
#[derive(Error, Debug)]
pub enum TableError {
    #[error("failed to read code table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid code table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid key code \"{0}\" (expected 0-255, decimal or 0x-prefixed hex)")]
    InvalidCode(String),
}

/// Errors from applying configuration parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("malformed parameter \"{0}\" (expected name=value)")]
    MalformedParameter(String),
}
