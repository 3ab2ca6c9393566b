//! Google API wire types.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One page of `events.list`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    pub next_page_token: Option<String>,
}

/// Event as returned by the Calendar v3 API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
    pub status: Option<String>,
}

/// Either a concrete instant (`dateTime`) or an all-day `date`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date_time: Option<DateTime<FixedOffset>>,
    pub date: Option<NaiveDate>,
    pub time_zone: Option<String>,
}

impl ApiEvent {
    /// Concrete start and end instants, if the event has both
    pub fn timed_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.start.as_ref()?.date_time?;
        let end = self.end.as_ref()?.date_time?;
        Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
    }

    /// Convenience constructor for a timed event
    pub fn timed(id: &str, summary: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            summary: Some(summary.to_string()),
            start: Some(ApiEventTime {
                date_time: Some(start.fixed_offset()),
                ..Default::default()
            }),
            end: Some(ApiEventTime {
                date_time: Some(end.fixed_offset()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Convenience constructor for an all-day event
    pub fn all_day(id: &str, summary: &str, date: NaiveDate) -> Self {
        Self {
            id: id.to_string(),
            summary: Some(summary.to_string()),
            start: Some(ApiEventTime {
                date: Some(date),
                ..Default::default()
            }),
            end: Some(ApiEventTime {
                date: date.succ_opt(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// Token endpoint response for both code exchange and refresh
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    /// Present on first consent and occasionally on refresh
    pub refresh_token: Option<String>,

    /// Lifetime in seconds
    pub expires_in: Option<i64>,

    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub id_token: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish()
    }
}

impl TokenResponse {
    /// Absolute expiry in unix seconds
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_in.map(|seconds| now.timestamp() + seconds)
    }
}

/// `GET /oauth2/v2/userinfo`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleUserInfo {
    /// Stable Google account id
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub verified_email: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}
