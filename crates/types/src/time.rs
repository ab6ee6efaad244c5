// Path: crates/types/src/time.rs
//! Wall-clock time as whole UNIX seconds.
//!
//! Consensus never needs sub-second resolution: block timestamps, maintenance
//! deadlines, and hardfork thresholds are all second-granular. Arithmetic is
//! explicit (`checked_*`/`saturating_*`) so that overflow behavior is the same
//! on every platform.

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Seconds in one minute.
pub const MINUTE_SECS: u64 = 60;
/// Seconds in one hour.
pub const HOUR_SECS: u64 = 3_600;
/// Seconds in one day.
pub const DAY_SECS: u64 = 86_400;

/// A wall-clock instant, in whole seconds since the UNIX epoch.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, Encode, Decode,
)]
pub struct TimePoint(pub u64);

impl TimePoint {
    /// The epoch itself; also the "never set" sentinel.
    pub const ZERO: TimePoint = TimePoint(0);
    /// The far-future sentinel (lifetime membership, orders that never expire).
    pub const MAX: TimePoint = TimePoint(u64::MAX);

    /// Builds an instant from raw UNIX seconds.
    pub const fn from_secs(secs: u64) -> Self {
        TimePoint(secs)
    }

    /// Raw UNIX seconds.
    pub const fn secs(self) -> u64 {
        self.0
    }

    /// This instant advanced by `secs` seconds, saturating at the sentinel.
    pub const fn plus_secs(self, secs: u64) -> Self {
        TimePoint(self.0.saturating_add(secs))
    }

    /// This instant moved back by `secs` seconds, saturating at the epoch.
    pub const fn minus_secs(self, secs: u64) -> Self {
        TimePoint(self.0.saturating_sub(secs))
    }

    /// Signed distance `self - earlier` in seconds.
    ///
    /// Wide intermediate so that even sentinel values subtract without
    /// wrapping; the result is clamped into `i64`.
    pub fn diff_secs(self, earlier: TimePoint) -> i64 {
        let wide = self.0 as i128 - earlier.0 as i128;
        wide.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }
}

impl std::fmt::Display for TimePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.0)
    }
}
