/// Project endpoints
///
/// Every query is scoped to the caller; a project that belongs to someone
/// else answers exactly like one that does not exist.
///
/// # Endpoints
///
/// - `GET /projects` - List projects with task counts
/// - `POST /projects` - Create a project
/// - `GET /projects/:id` - Project with its tasks
/// - `PATCH /projects/:id` - Partial update
/// - `DELETE /projects/:id` - Delete a project and its tasks

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::SuccessResponse,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{ownership::resolve_owned, session::AuthContext},
    models::{
        project::{CreateProject, Project, ProjectStatus, ProjectWithCounts, UpdateProject},
        task::Task,
    },
    patch::deserialize_some,
};
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(
        required(message = "Name is required"),
        length(min = 1, max = 200, message = "Name must be between 1 and 200 characters")
    )]
    pub name: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    /// Hex color; defaults to blue
    #[validate(length(max = 16, message = "Color must be at most 16 characters"))]
    pub color: Option<String>,

    /// Defaults to `ACTIVE`
    pub status: Option<ProjectStatus>,
}

/// Update project request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[validate(length(max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: Option<String>,

    /// `null` clears the description
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,

    #[validate(length(max = 16, message = "Color must be at most 16 characters"))]
    pub color: Option<String>,

    pub status: Option<ProjectStatus>,
}

impl UpdateProjectRequest {
    /// Blank `name` and `color` count as absent; the rest must fit their columns
    pub fn into_update(self) -> Result<UpdateProject, ApiError> {
        let req = Self {
            name: non_blank(self.name),
            color: non_blank(self.color),
            ..self
        };
        req.validate()?;

        Ok(UpdateProject {
            name: req.name,
            description: req.description,
            color: req.color,
            status: req.status,
        })
    }
}

/// `GET /projects/:id` response
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,

    /// In manual order
    pub tasks: Vec<Task>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// List the caller's projects, most recently updated first
///
/// Each project carries `_count.tasks`.
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ProjectWithCounts>>> {
    let projects = Project::list_with_counts(&state.db, auth.user_id).await?;
    Ok(Json(projects))
}

/// Create a project
///
/// # Errors
///
/// - `400 Bad Request`: missing name or invalid field
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let Json(mut req) = payload?;
    req.name = non_blank(req.name);
    req.color = non_blank(req.color);
    req.validate()?;

    let name = req
        .name
        .ok_or_else(|| ApiError::BadRequest("Name is required".to_string()))?;

    let project = Project::create(
        &state.db,
        CreateProject {
            user_id: auth.user_id,
            name,
            description: req.description.filter(|d| !d.is_empty()),
            color: req.color,
            status: req.status,
        },
    )
    .await?;

    tracing::info!(project_id = %project.id, user_id = %auth.user_id, "Created project");

    Ok((StatusCode::CREATED, Json(project)))
}

/// Get one project with its tasks
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<ProjectDetail>> {
    let Path(id) = path?;

    let project: Project = resolve_owned(&state.db, id, auth.user_id).await?;
    let tasks = Task::list_by_project(&state.db, project.id).await?;

    Ok(Json(ProjectDetail { project, tasks }))
}

/// Partially update a project
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> ApiResult<Json<Project>> {
    let Path(id) = path?;
    let Json(req) = payload?;
    let update = req.into_update()?;

    let existing: Project = resolve_owned(&state.db, id, auth.user_id).await?;

    let project = Project::update(&state.db, existing.id, auth.user_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

/// Delete a project; its tasks go with it
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Path(id) = path?;

    let existing: Project = resolve_owned(&state.db, id, auth.user_id).await?;

    if !Project::delete(&state.db, existing.id, auth.user_id).await? {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    tracing::info!(project_id = %existing.id, user_id = %auth.user_id, "Deleted project");

    Ok(SuccessResponse::ok())
}
