//! Calendar provider abstraction.
//!
//! Sync talks to the calendar through [`CalendarProvider`] so the routine can
//! run against [`crate::mock::MockCalendarProvider`] in tests. The Google
//! implementation lives in [`crate::google::calendar`].

use async_trait::async_trait;

use crate::error::CalendarError;
use crate::google::types::ApiEvent;
use crate::window::SyncWindow;

/// Read access to a user's primary calendar
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Lists every single (expanded) event in `window`, ordered by start time
    ///
    /// Implementations follow pagination to the end.
    async fn list_events(
        &self,
        access_token: &str,
        window: SyncWindow,
    ) -> Result<Vec<ApiEvent>, CalendarError>;
}
