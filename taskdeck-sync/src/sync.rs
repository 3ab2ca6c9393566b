//! One-way calendar import.
//!
//! ```text
//! resolve_credentials ─> provider.list_events(window) ─> for each event:
//!     no start/end dateTime ─> skip
//!     otherwise            ─> upsert by (user_id, google_event_id)
//! ```
//!
//! Upserts are individually atomic but not batched, so a failure part-way
//! leaves earlier events written. Re-running the same window converges.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use taskdeck_shared::models::calendar_event::{CalendarEvent, UpsertCalendarEvent, PRIMARY_CALENDAR};

use crate::credentials::resolve_credentials;
use crate::error::SyncError;
use crate::google::oauth::TokenRefresher;
use crate::google::types::ApiEvent;
use crate::provider::CalendarProvider;
use crate::window::SyncWindow;

/// Title stored for events without a summary
pub const UNTITLED_EVENT: &str = "Untitled";

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Outcome of one sync run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Events returned by the provider
    pub considered: usize,

    /// Events inserted or updated locally
    pub imported: usize,

    /// Events without concrete start/end times
    pub skipped: usize,
}

/// Destination for imported events
#[async_trait]
pub trait CalendarEventStore: Send + Sync {
    async fn upsert_event(&self, event: &UpsertCalendarEvent) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl CalendarEventStore for PgPool {
    async fn upsert_event(&self, event: &UpsertCalendarEvent) -> Result<(), sqlx::Error> {
        CalendarEvent::upsert(self, event).await.map(|_| ())
    }
}

/// Event length in hours
pub fn duration_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Maps a provider event to the local row, or `None` if it is not timed
pub fn to_upsert(user_id: Uuid, event: &ApiEvent) -> Option<UpsertCalendarEvent> {
    let (start_time, end_time) = event.timed_span()?;

    Some(UpsertCalendarEvent {
        user_id,
        google_event_id: event.id.clone(),
        calendar_id: PRIMARY_CALENDAR.to_string(),
        title: event
            .summary
            .clone()
            .filter(|summary| !summary.is_empty())
            .unwrap_or_else(|| UNTITLED_EVENT.to_string()),
        description: event.description.clone(),
        start_time,
        end_time,
        duration: duration_hours(start_time, end_time),
    })
}

/// Writes provider events into `store`
pub async fn import_events(
    store: &dyn CalendarEventStore,
    user_id: Uuid,
    events: &[ApiEvent],
) -> Result<SyncReport, SyncError> {
    let mut report = SyncReport {
        considered: events.len(),
        ..Default::default()
    };

    for event in events {
        match to_upsert(user_id, event) {
            Some(row) => {
                store.upsert_event(&row).await?;
                report.imported += 1;
            }
            None => {
                debug!(event_id = %event.id, "Skipping event without start/end dateTime");
                report.skipped += 1;
            }
        }
    }

    Ok(report)
}

/// Imports the user's primary-calendar events in `window`
///
/// A 401 from the provider triggers one token refresh and retry when a
/// refresh token is on file.
#[instrument(skip(pool, refresher, provider), fields(provider = provider.name()))]
pub async fn sync_calendar_events(
    pool: &PgPool,
    refresher: &dyn TokenRefresher,
    provider: &dyn CalendarProvider,
    user_id: Uuid,
    window: SyncWindow,
) -> Result<SyncReport, SyncError> {
    info!(start = %window.start, end = %window.end, "Starting calendar sync");

    let mut credentials = resolve_credentials(pool, refresher, user_id).await?;

    let events = match provider.list_events(&credentials.access_token, window).await {
        Err(e) if e.should_refresh_token() && credentials.can_refresh() => {
            warn!("Provider rejected access token, refreshing and retrying once");
            credentials.refresh(pool, refresher).await?;
            provider.list_events(&credentials.access_token, window).await?
        }
        other => other?,
    };

    let report = import_events(pool, user_id, &events).await?;

    info!(
        considered = report.considered,
        imported = report.imported,
        skipped = report.skipped,
        "Calendar sync finished"
    );

    Ok(report)
}
