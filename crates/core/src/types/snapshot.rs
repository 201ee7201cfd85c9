//! Timestamped envelope for persisted cart and wishlist snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default lifetime of a persisted snapshot: 24 hours, in milliseconds.
pub const DEFAULT_SNAPSHOT_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// A value paired with the time it was written.
///
/// Serialized as `{"data": <value>, "timestamp": <epoch-ms>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamped<T> {
    pub data: T,
    /// Write time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl<T> Stamped<T> {
    /// Wrap a value with its write time.
    pub const fn new(data: T, timestamp: i64) -> Self {
        Self { data, timestamp }
    }

    /// Whether the snapshot is at least `ttl_ms` old at `now_ms`.
    ///
    /// Snapshots stamped in the future (clock skew) are not expired.
    #[must_use]
    pub const fn is_expired(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms.saturating_sub(self.timestamp) >= ttl_ms
    }

    /// Write time as a UTC datetime, if representable.
    #[must_use]
    pub fn written_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Unwrap the stored value.
    pub fn into_data(self) -> T {
        self.data
    }
}
