//! Millisecond durations as they appear on the wire.
//!
//! Timeouts and measured execution times cross process boundaries in JSON,
//! so they need a representation other tooling can read without knowing
//! Rust's `Duration` layout. [`DurationMs`] pins that representation to a
//! bare integer millisecond count.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A duration carried as whole milliseconds.
///
/// Every duration field in the contract — request timeout overrides, spec
/// timeouts, result metrics, activity entries — uses this type, so a
/// consumer in any language sees the same plain `u64`. Sub-millisecond
/// precision is dropped on conversion from [`Duration`].
///
/// # Examples
///
/// ```
/// use overseer_contract::DurationMs;
///
/// let d = DurationMs::from_millis(1500);
/// assert_eq!(d.as_millis(), 1500);
///
/// let json = serde_json::to_string(&d).unwrap();
/// assert_eq!(json, "1500");
/// ```
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DurationMs(u64);

impl DurationMs {
    /// Zero duration.
    pub const ZERO: Self = Self(0);

    /// Create from milliseconds.
    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Create from seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Get the value in milliseconds.
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// True if this duration is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Convert to `std::time::Duration`.
    pub fn to_std(&self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl From<Duration> for DurationMs {
    fn from(d: Duration) -> Self {
        Self(d.as_millis() as u64)
    }
}

impl From<DurationMs> for Duration {
    fn from(d: DurationMs) -> Self {
        d.to_std()
    }
}
