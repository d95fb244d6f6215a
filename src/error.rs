//! Error types for the fallible edges of the crate.
//!
//! The per-frame path never fails; these errors only come out of loading
//! configuration and decoding recorded frames.

use thiserror::Error;

/// Errors raised while loading configuration or reading frames.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration could not be read or deserialized.
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    /// A duration string could not be parsed.
    #[error("Invalid duration: {0}")]
    Duration(String),

    /// A rule referenced a metric that does not exist.
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// A rule used a comparator that does not exist.
    #[error("Unknown comparator: {0}")]
    UnknownComparator(String),

    /// Reading a frame file failed.
    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),

    /// A recorded frame was not valid JSON.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<framewatch_types::UnknownMetric> for Error {
    fn from(err: framewatch_types::UnknownMetric) -> Self {
        Error::UnknownMetric(err.0)
    }
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
