/// Dashboard endpoint
///
/// # Endpoint
///
/// ```text
/// GET /dashboard
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use taskdeck_shared::{auth::session::AuthContext, models::dashboard::DashboardSummary};

/// Counts and active projects for the caller
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<DashboardSummary>> {
    let summary = DashboardSummary::for_user(&state.db, auth.user_id).await?;
    Ok(Json(summary))
}
