/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskdeck_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{security::SecurityHeadersLayer, session::require_session},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskdeck_sync::{CalendarProvider, GoogleCalendarClient, GoogleOAuthClient, GoogleOAuthConfig};
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; everything
/// behind it is reference-counted and immutable.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Google sign-in and token refresh
    pub oauth: Arc<GoogleOAuthClient>,

    /// Calendar the sync route reads from
    pub calendar: Arc<dyn CalendarProvider>,
}

impl AppState {
    /// Creates state talking to Google's production endpoints
    pub fn new(db: PgPool, config: Config) -> Self {
        let oauth = GoogleOAuthConfig::new(
            config.google.client_id.clone(),
            config.google.client_secret.clone(),
            config.google.redirect_url.clone(),
        );

        Self {
            db,
            config: Arc::new(config),
            oauth: Arc::new(GoogleOAuthClient::new(oauth)),
            calendar: Arc::new(GoogleCalendarClient::new()),
        }
    }

    /// Replaces the calendar provider
    pub fn with_calendar(mut self, calendar: Arc<dyn CalendarProvider>) -> Self {
        self.calendar = calendar;
        self
    }

    /// Replaces the OAuth client configuration
    pub fn with_oauth(mut self, config: GoogleOAuthConfig) -> Self {
        self.oauth = Arc::new(GoogleOAuthClient::new(config));
        self
    }

    /// Key signing the OAuth state token
    pub fn session_secret(&self) -> &[u8] {
        self.config.session.secret.as_bytes()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                      # public
/// ├── /auth/
/// │   ├── GET  /signin/google           # public, redirect to Google
/// │   ├── GET  /callback/google         # public, sets session cookie
/// │   ├── POST /signout                 # session
/// │   └── GET  /session                 # session
/// └── (session required)
///     ├── /projects      GET POST, /:id GET PATCH DELETE
///     ├── /tasks         GET POST, /:id GET PATCH DELETE
///     ├── /calendar/     GET events, GET summary, POST sync
///     ├── GET /dashboard
///     └── GET /debug/account
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Cookies (tower-cookies)
/// 5. Session authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/signin/google", get(routes::auth::signin_google))
        .route("/auth/callback/google", get(routes::auth::callback_google));

    // Everything else requires a session
    let protected_routes = Router::new()
        .route("/auth/signout", post(routes::auth::signout))
        .route("/auth/session", get(routes::auth::session))
        .route(
            "/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/projects/:id",
            get(routes::projects::get_project)
                .patch(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/calendar/events", get(routes::calendar::list_events))
        .route("/calendar/summary", get(routes::calendar::summary))
        .route("/calendar/sync", post(routes::calendar::sync))
        .route("/dashboard", get(routes::dashboard::dashboard))
        .route("/debug/account", get(routes::debug::account))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    // Configure CORS based on environment
    let cors = if state.config.allows_any_origin() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CookieManagerLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}
