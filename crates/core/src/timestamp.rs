//! Microsecond-precision timestamp type
//!
//! Entities record two timestamps (`created_at`, `forked_at`) and events
//! carry one each. Microsecond precision is enough to order events within
//! a single process run without pulling in a full calendar/calendaring
//! dependency for the hot path.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A point in time, stored as microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Unix epoch (1970-01-01 00:00:00 UTC).
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Timestamp for the current moment.
    ///
    /// Falls back to [`Timestamp::EPOCH`] if the system clock reports a
    /// time before the Unix epoch (e.g. a misconfigured clock).
    pub fn now() -> Self {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);
        Timestamp(micros)
    }

    /// Construct a timestamp from raw microseconds since epoch.
    #[inline]
    pub const fn from_micros(micros: u64) -> Self {
        Timestamp(micros)
    }

    /// Microseconds since the Unix epoch.
    #[inline]
    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    /// Whether `self` is strictly earlier than `other`.
    pub fn is_before(&self, other: Timestamp) -> bool {
        self.0 < other.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}
