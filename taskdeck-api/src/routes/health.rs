/// Health check endpoint
///
/// Reports whether the server is up and can reach the database.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskdeck_shared::db::pool::health_check as database_health;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    pub version: String,

    /// `connected` or `disconnected`
    pub database: String,
}

impl HealthResponse {
    fn from_database(connected: bool) -> Self {
        Self {
            status: if connected { "healthy" } else { "degraded" }.to_string(),
            version: taskdeck_shared::VERSION.to_string(),
            database: if connected { "connected" } else { "disconnected" }.to_string(),
        }
    }
}

/// Health check handler
///
/// Always 200; a database outage shows up as `"degraded"`.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let connected = match database_health(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    Ok(Json(HealthResponse::from_database(connected)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_without_database() {
        let response = HealthResponse::from_database(false);
        assert_eq!(response.status, "degraded");
        assert_eq!(response.database, "disconnected");

        let response = HealthResponse::from_database(true);
        assert_eq!(response.status, "healthy");
        assert_eq!(response.version, taskdeck_shared::VERSION);
    }
}
