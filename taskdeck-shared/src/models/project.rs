/// Project model and database operations
///
/// Projects are owned directly by a user. Deleting one cascades to its tasks.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('ACTIVE', 'ON_HOLD', 'COMPLETED', 'ARCHIVED');
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     color VARCHAR(16) NOT NULL DEFAULT '#3B82F6',
///     status project_status NOT NULL DEFAULT 'ACTIVE',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// # use taskdeck_shared::models::project::{Project, UpdateProject, ProjectStatus};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
/// # async fn example(pool: PgPool, id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let paused = Project::update(&pool, id, user_id, UpdateProject {
///     status: Some(ProjectStatus::OnHold),
///     ..Default::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Color assigned when a project is created without one
pub const DEFAULT_PROJECT_COLOR: &str = "#3B82F6";

const PROJECT_COLUMNS: &str =
    "projects.id, projects.user_id, projects.name, projects.description, projects.color, \
     projects.status, projects.created_at, projects.updated_at";

/// Project lifecycle label
///
/// Any status may be set from any other; there are no transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Active,
    OnHold,
    Completed,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "ACTIVE",
            ProjectStatus::OnHold => "ON_HOLD",
            ProjectStatus::Completed => "COMPLETED",
            ProjectStatus::Archived => "ARCHIVED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,

    /// Owner; the only ownership column in the task hierarchy
    pub user_id: Uuid,

    pub name: String,
    pub description: Option<String>,

    /// Hex color used by the board and calendar views
    pub color: String,

    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Relation counts, serialized as `_count`
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProjectCounts {
    #[sqlx(rename = "task_count")]
    pub tasks: i64,
}

/// A project as listed on the projects page
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProjectWithCounts {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub project: Project,

    #[sqlx(flatten)]
    #[serde(rename = "_count")]
    pub counts: ProjectCounts,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,

    /// Defaults to [`DEFAULT_PROJECT_COLOR`]
    pub color: Option<String>,

    /// Defaults to `ACTIVE`
    pub status: Option<ProjectStatus>,
}

/// Partial update; `None` leaves a column unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,

    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,

    pub color: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl UpdateProject {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.color.is_none()
            && self.status.is_none()
    }
}

impl Project {
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO projects (user_id, name, description, color, status)
            VALUES ($1, $2, $3, COALESCE($4, '{}'), COALESCE($5, 'ACTIVE'::project_status))
            RETURNING {}
            "#,
            DEFAULT_PROJECT_COLOR, PROJECT_COLUMNS
        );

        sqlx::query_as::<_, Project>(&sql)
            .bind(data.user_id)
            .bind(data.name)
            .bind(data.description)
            .bind(data.color)
            .bind(data.status)
            .fetch_one(pool)
            .await
    }

    /// Finds a project by ID, scoped to its owner
    pub async fn find_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM projects WHERE id = $1 AND user_id = $2",
            PROJECT_COLUMNS
        );

        sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Loads several of the caller's projects at once
    ///
    /// Ids belonging to other users are silently dropped.
    pub async fn find_many_for_user(
        pool: &PgPool,
        ids: &[Uuid],
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM projects WHERE id = ANY($1) AND user_id = $2",
            PROJECT_COLUMNS
        );

        sqlx::query_as::<_, Project>(&sql)
            .bind(ids)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Lists the caller's projects with task counts, most recently updated first
    pub async fn list_with_counts(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ProjectWithCounts>, sqlx::Error> {
        Self::list_with_counts_filtered(pool, user_id, None).await
    }

    /// Same as [`Project::list_with_counts`], restricted to one status
    pub async fn list_with_counts_filtered(
        pool: &PgPool,
        user_id: Uuid,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<ProjectWithCounts>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(PROJECT_COLUMNS);
        qb.push(
            ", (SELECT COUNT(*) FROM tasks WHERE tasks.project_id = projects.id) AS task_count \
             FROM projects WHERE user_id = ",
        );
        qb.push_bind(user_id);

        if let Some(status) = status {
            qb.push(" AND status = ").push_bind(status);
        }

        qb.push(" ORDER BY updated_at DESC");

        qb.build_query_as::<ProjectWithCounts>()
            .fetch_all(pool)
            .await
    }

    /// Applies a partial update, scoped to the owner
    ///
    /// Returns `None` when the project does not exist or is not the caller's.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_for_user(pool, id, user_id).await;
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE projects SET updated_at = NOW()");

        if let Some(name) = data.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(description) = data.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(color) = data.color {
            qb.push(", color = ").push_bind(color);
        }
        if let Some(status) = data.status {
            qb.push(", status = ").push_bind(status);
        }

        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" AND user_id = ").push_bind(user_id);
        qb.push(" RETURNING ").push(PROJECT_COLUMNS);

        qb.build_query_as::<Project>().fetch_optional(pool).await
    }

    /// Hard-deletes a project and its tasks
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
