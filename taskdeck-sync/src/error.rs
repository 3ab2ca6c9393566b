//! Error types for the Google clients and the sync routine.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failures talking to the Google Calendar API
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Google Calendar access denied")]
    AuthRequired,

    #[error("Google access token expired or revoked")]
    TokenExpired,

    #[error("Google Calendar rate limit hit, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Google Calendar API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl CalendarError {
    /// Whether a fresh access token could fix this error
    pub fn should_refresh_token(&self) -> bool {
        matches!(self, Self::TokenExpired)
    }
}

/// Failures in the OAuth2 authorization-code and refresh flows
#[derive(Error, Debug)]
pub enum OAuthError {
    #[error("Invalid OAuth configuration: {0}")]
    InvalidConfig(String),

    #[error("Token exchange failed: {0}")]
    Exchange(String),

    #[error("Token refresh failed: {0}")]
    Refresh(String),

    #[error("User info request failed: {0}")]
    UserInfo(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// Failures of one calendar sync run
///
/// Display strings are shown to the user as-is.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Google account not found. Please log in again.")]
    AccountNotFound,

    #[error("Google access token not found. Please re-authenticate with Google.")]
    MissingAccessToken,

    #[error("Invalid sync window: start {start} is after end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Failed to refresh Google access token: {0}")]
    Refresh(#[from] OAuthError),

    #[error("Failed to fetch calendar events: {0}")]
    Calendar(#[from] CalendarError),

    #[error("Failed to store calendar events: {0}")]
    Database(#[from] sqlx::Error),
}

impl SyncError {
    /// True for errors caused by the request rather than by a dependency
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidWindow { .. })
    }
}
