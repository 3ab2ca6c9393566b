//! Time window for one sync run.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::SyncError;

/// How far back a sync reaches when the caller gives no start
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SyncWindow {
    /// Fills in defaults: `start = now - 30 days`, `end = now`
    ///
    /// Each bound defaults independently. A start after the end is rejected.
    pub fn resolve(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Self, SyncError> {
        let start = start.unwrap_or_else(|| now - Duration::days(DEFAULT_LOOKBACK_DAYS));
        let end = end.unwrap_or(now);

        if start > end {
            return Err(SyncError::InvalidWindow { start, end });
        }

        Ok(Self { start, end })
    }
}
