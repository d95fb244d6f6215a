use std::time::Duration;

use crate::error::{Error, Result};

/// Suffix to nanoseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("µs", 1_000.0),
    ("us", 1_000.0),
    ("ms", 1_000_000.0),
    ("min", 60_000_000_000.0),
    ("s", 1_000_000_000.0),
];

/// Parse duration strings like "2s", "1.5s", "250ms", "0ns".
///
/// Negative and non-finite values are rejected.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str
                .trim()
                .parse()
                .map_err(|_| Error::Duration(s.to_string()))?;
            if !val.is_finite() || val < 0.0 {
                return Err(Error::Duration(s.to_string()));
            }
            return Ok(Duration::from_nanos((val * multiplier) as u64));
        }
    }

    Err(Error::Duration(s.to_string()))
}

/// Convert a frame delta in seconds into a `Duration`.
///
/// Negative or non-finite deltas count as zero.
pub fn delta_from_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::ZERO)
}
