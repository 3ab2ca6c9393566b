//! # Taskdeck Calendar Sync
//!
//! Imports a user's Google Calendar events into Taskdeck.
//!
//! ## Modules
//!
//! - `google`: Google OAuth and Calendar v3 clients
//! - `provider`: the `CalendarProvider` seam the sync runs against
//! - `credentials`: loading and refreshing the user's Google tokens
//! - `window`: resolving the requested time window
//! - `sync`: the idempotent import itself
//! - `mock`: in-memory provider for tests
//!
//! ## Example
//!
//! ```no_run
//! use taskdeck_sync::{sync_calendar_events, GoogleCalendarClient, GoogleOAuthClient, GoogleOAuthConfig, SyncWindow};
//! # async fn example(pool: sqlx::PgPool, user_id: uuid::Uuid) -> Result<(), taskdeck_sync::SyncError> {
//! let oauth = GoogleOAuthClient::new(GoogleOAuthConfig::new("id", "secret", "http://localhost:8080/auth/callback/google"));
//! let calendar = GoogleCalendarClient::new();
//! let window = SyncWindow::resolve(None, None, chrono::Utc::now())?;
//!
//! let report = sync_calendar_events(&pool, &oauth, &calendar, user_id, window).await?;
//! println!("Synced {} events", report.considered);
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod error;
pub mod google;
pub mod mock;
pub mod provider;
pub mod sync;
pub mod window;

pub use credentials::{resolve_credentials, GoogleCredentials};
pub use error::{CalendarError, OAuthError, SyncError};
pub use google::{GoogleCalendarClient, GoogleOAuthClient, GoogleOAuthConfig};
pub use google::oauth::TokenRefresher;
pub use provider::CalendarProvider;
pub use sync::{import_events, sync_calendar_events, CalendarEventStore, SyncReport};
pub use window::SyncWindow;
