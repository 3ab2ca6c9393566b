/// Task endpoints
///
/// Tasks have no owner column; visibility always goes through the parent
/// project's `user_id`.
///
/// # Endpoints
///
/// - `GET /tasks?projectId=` - List tasks with their project
/// - `POST /tasks` - Create a task in an owned project
/// - `GET /tasks/:id` - Task with project and linked calendar events
/// - `PATCH /tasks/:id` - Partial update
/// - `DELETE /tasks/:id` - Delete a task

use std::collections::HashMap;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    input::{self, Numeric},
    routes::SuccessResponse,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use taskdeck_shared::{
    auth::{ownership::resolve_owned, session::AuthContext},
    models::{
        calendar_event::CalendarEvent,
        project::Project,
        task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask},
    },
    patch::deserialize_some,
};
use uuid::Uuid;
use validator::Validate;

/// Error returned when either required create field is missing
pub const REQUIRED_FIELDS_MESSAGE: &str = "ProjectId and title are required";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    pub project_id: Option<Uuid>,
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub project_id: Option<Uuid>,

    #[validate(length(max = 500, message = "Title must be at most 500 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,

    /// Defaults to `TODO`
    pub status: Option<TaskStatus>,

    /// Defaults to `MEDIUM`
    pub priority: Option<TaskPriority>,

    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub estimated_hours: Option<Numeric>,
}

/// Update task request
///
/// Nullable columns use `Option<Option<_>>`: absent leaves the column alone,
/// `null` clears it.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(length(max = 500, message = "Title must be at most 500 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,

    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub start_date: Option<Option<String>>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub due_date: Option<Option<String>>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub estimated_hours: Option<Option<Numeric>>,

    /// Present-but-null is rejected; the column is not nullable
    #[serde(default, deserialize_with = "deserialize_some")]
    pub actual_hours: Option<Option<Numeric>>,

    pub order: Option<i32>,
}

impl UpdateTaskRequest {
    /// Validates every present field and builds the model update
    pub fn into_update(mut self) -> Result<UpdateTask, ApiError> {
        self.title = match self.title {
            Some(title) if title.trim().is_empty() => {
                return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
            }
            other => other.map(|t| t.trim().to_string()),
        };
        self.validate()?;

        Ok(UpdateTask {
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            start_date: input::nullable_datetime("startDate", self.start_date)?,
            due_date: input::nullable_datetime("dueDate", self.due_date)?,
            estimated_hours: input::estimated_hours(self.estimated_hours)?,
            actual_hours: input::actual_hours(self.actual_hours)?,
            position: self.order,
        })
    }
}

/// A task with its parent project inlined
#[derive(Debug, Clone, Serialize)]
pub struct TaskWithProject {
    #[serde(flatten)]
    pub task: Task,

    pub project: Project,
}

/// `GET /tasks/:id` response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,

    pub project: Project,
    pub calendar_events: Vec<CalendarEvent>,
}

/// Pairs each task with its project, dropping tasks whose project is missing
pub fn attach_projects(tasks: Vec<Task>, projects: Vec<Project>) -> Vec<TaskWithProject> {
    let by_id: HashMap<Uuid, Project> = projects.into_iter().map(|p| (p.id, p)).collect();

    tasks
        .into_iter()
        .filter_map(|task| {
            by_id.get(&task.project_id).cloned().map(|project| TaskWithProject { task, project })
        })
        .collect()
}

/// Loads the caller's projects for a set of tasks
pub async fn with_projects(
    pool: &PgPool,
    user_id: Uuid,
    tasks: Vec<Task>,
) -> Result<Vec<TaskWithProject>, sqlx::Error> {
    let mut project_ids: Vec<Uuid> = tasks.iter().map(|t| t.project_id).collect();
    project_ids.sort_unstable();
    project_ids.dedup();

    let projects = Project::find_many_for_user(pool, &project_ids, user_id).await?;

    Ok(attach_projects(tasks, projects))
}

/// List the caller's tasks in manual order
///
/// `projectId` narrows the list; a project the caller does not own yields
/// an empty list.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<TaskWithProject>>> {
    let Query(query) = query?;

    let tasks = Task::list_for_user(&state.db, auth.user_id, query.project_id).await?;
    let tasks = with_projects(&state.db, auth.user_id, tasks).await?;

    Ok(Json(tasks))
}

/// Create a task at the end of its project
///
/// # Errors
///
/// - `400 Bad Request`: `projectId` or `title` missing
/// - `404 Not Found`: project missing or not the caller's
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskWithProject>)> {
    let Json(mut req) = payload?;

    req.title = req.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
    req.validate()?;
    let (Some(project_id), Some(title)) = (req.project_id, req.title) else {
        return Err(ApiError::BadRequest(REQUIRED_FIELDS_MESSAGE.to_string()));
    };

    let estimated_hours = input::estimated_hours(req.estimated_hours.map(Some))?.flatten();
    let start_date = input::optional_datetime("startDate", req.start_date)?;
    let due_date = input::optional_datetime("dueDate", req.due_date)?;

    let project: Project = resolve_owned(&state.db, project_id, auth.user_id).await?;

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id: project.id,
            title,
            description: req.description.filter(|d| !d.is_empty()),
            status: req.status,
            priority: req.priority,
            start_date,
            due_date,
            estimated_hours,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, project_id = %project.id, "Created task");

    Ok((StatusCode::CREATED, Json(TaskWithProject { task, project })))
}

/// Get one task with its project and linked calendar events
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<TaskDetail>> {
    let Path(id) = path?;

    let task: Task = resolve_owned(&state.db, id, auth.user_id).await?;
    let project: Project = resolve_owned(&state.db, task.project_id, auth.user_id).await?;
    let calendar_events = CalendarEvent::list_by_task(&state.db, task.id, auth.user_id).await?;

    Ok(Json(TaskDetail {
        task,
        project,
        calendar_events,
    }))
}

/// Partially update a task
///
/// Any status may move to any other.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<TaskWithProject>> {
    let Path(id) = path?;
    let Json(req) = payload?;
    let update = req.into_update()?;

    let existing: Task = resolve_owned(&state.db, id, auth.user_id).await?;

    let task = Task::update(&state.db, existing.id, auth.user_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    let project: Project = resolve_owned(&state.db, task.project_id, auth.user_id).await?;

    Ok(Json(TaskWithProject { task, project }))
}

/// Delete a task; its project is kept
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Path(id) = path?;

    let existing: Task = resolve_owned(&state.db, id, auth.user_id).await?;

    if !Task::delete(&state.db, existing.id, auth.user_id).await? {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(SuccessResponse::ok())
}
