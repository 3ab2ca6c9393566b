//! Google API clients.
//!
//! - [`oauth`]: authorization URL, code exchange, token refresh, userinfo
//! - [`calendar`]: Calendar v3 `events.list`
//! - [`types`]: wire types shared by both

pub mod calendar;
pub mod oauth;
pub mod types;

pub use calendar::GoogleCalendarClient;
pub use oauth::{GoogleOAuthClient, GoogleOAuthConfig};
