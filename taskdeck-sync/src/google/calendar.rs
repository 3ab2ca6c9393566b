//! Google Calendar v3 client.

use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, instrument};

use taskdeck_shared::models::calendar_event::PRIMARY_CALENDAR;

use super::types::{ApiEvent, EventListResponse};
use crate::error::CalendarError;
use crate::provider::CalendarProvider;
use crate::window::SyncWindow;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Events requested per page
const PAGE_SIZE: &str = "250";

#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for GoogleCalendarClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleCalendarClient {
    pub fn new() -> Self {
        Self::with_base_url(CALENDAR_API_BASE)
    }

    /// Points the client at another host (used against a mock server)
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn events_url(&self, calendar_id: &str) -> Result<Url, CalendarError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CalendarError::ApiError(format!("invalid base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| CalendarError::ApiError("base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(["calendars", calendar_id, "events"]);

        Ok(url)
    }

    /// Fetches one page of single events in `window`, ordered by start time
    #[instrument(skip(self, access_token), level = "debug")]
    pub async fn list_events_page(
        &self,
        access_token: &str,
        calendar_id: &str,
        window: SyncWindow,
        page_token: Option<&str>,
    ) -> Result<EventListResponse, CalendarError> {
        let time_min = window.start.to_rfc3339();
        let time_max = window.end.to_rfc3339();

        let mut query = vec![
            ("timeMin", time_min.as_str()),
            ("timeMax", time_max.as_str()),
            ("singleEvents", "true"),
            ("orderBy", "startTime"),
            ("maxResults", PAGE_SIZE),
        ];
        if let Some(page_token) = page_token {
            query.push(("pageToken", page_token));
        }

        let response = self
            .client
            .get(self.events_url(calendar_id)?)
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await?;

        handle_response(response).await
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarClient {
    fn name(&self) -> &str {
        "google"
    }

    #[instrument(skip(self, access_token), level = "info")]
    async fn list_events(
        &self,
        access_token: &str,
        window: SyncWindow,
    ) -> Result<Vec<ApiEvent>, CalendarError> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .list_events_page(access_token, PRIMARY_CALENDAR, window, page_token.as_deref())
                .await?;
            pages += 1;
            events.extend(page.items);

            match page.next_page_token {
                Some(next) if Some(&next) != page_token.as_ref() => page_token = Some(next),
                _ => break,
            }
        }

        debug!(pages, events = events.len(), "Listed calendar events");
        Ok(events)
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, CalendarError> {
    let status = response.status();

    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| CalendarError::ApiError(format!("JSON parse error: {}", e)))
    } else if status.as_u16() == 401 {
        Err(CalendarError::TokenExpired)
    } else if status.as_u16() == 403 {
        Err(CalendarError::AuthRequired)
    } else if status.as_u16() == 404 {
        let text = response.text().await.unwrap_or_default();
        Err(CalendarError::CalendarNotFound(text))
    } else if status.as_u16() == 429 {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        Err(CalendarError::RateLimited(retry_after))
    } else {
        let text = response.text().await.unwrap_or_default();
        Err(CalendarError::ApiError(format!("{}: {}", status, text)))
    }
}
