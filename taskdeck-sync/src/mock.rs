//! In-memory calendar provider for tests and local development.
//!
//! # Example
//!
//! ```
//! use taskdeck_sync::mock::MockCalendarProvider;
//! use taskdeck_sync::google::types::ApiEvent;
//! use chrono::{TimeZone, Utc};
//!
//! let start = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
//! let end = Utc.with_ymd_and_hms(2025, 3, 3, 10, 30, 0).unwrap();
//! let provider = MockCalendarProvider::new(vec![ApiEvent::timed("evt_1", "Standup", start, end)]);
//! assert_eq!(provider.calls().len(), 0);
//! ```

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::CalendarError;
use crate::google::types::ApiEvent;
use crate::provider::CalendarProvider;
use crate::window::SyncWindow;

/// Canned response for the next calls
#[derive(Debug, Clone)]
enum MockBehavior {
    Events(Vec<ApiEvent>),
    TokenExpired,
    ApiError(String),
}

/// Provider that returns a fixed event list and records each call
#[derive(Debug)]
pub struct MockCalendarProvider {
    behavior: Mutex<MockBehavior>,
    calls: Mutex<Vec<(String, SyncWindow)>>,
}

impl MockCalendarProvider {
    pub fn new(events: Vec<ApiEvent>) -> Self {
        Self {
            behavior: Mutex::new(MockBehavior::Events(events)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with an HTTP 401-style error
    pub fn expired_token() -> Self {
        Self {
            behavior: Mutex::new(MockBehavior::TokenExpired),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a generic API error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: Mutex::new(MockBehavior::ApiError(message.into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replaces the upstream event list
    pub fn set_events(&self, events: Vec<ApiEvent>) {
        if let Ok(mut behavior) = self.behavior.lock() {
            *behavior = MockBehavior::Events(events);
        }
    }

    /// `(access_token, window)` of every call so far
    pub fn calls(&self) -> Vec<(String, SyncWindow)> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

impl Default for MockCalendarProvider {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl CalendarProvider for MockCalendarProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_events(
        &self,
        access_token: &str,
        window: SyncWindow,
    ) -> Result<Vec<ApiEvent>, CalendarError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((access_token.to_string(), window));
        }

        let behavior = self
            .behavior
            .lock()
            .map(|behavior| behavior.clone())
            .map_err(|_| CalendarError::ApiError("mock provider poisoned".to_string()))?;

        match behavior {
            MockBehavior::Events(events) => Ok(events),
            MockBehavior::TokenExpired => Err(CalendarError::TokenExpired),
            MockBehavior::ApiError(message) => Err(CalendarError::ApiError(message)),
        }
    }
}
