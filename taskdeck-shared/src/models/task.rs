/// Task model and database operations
///
/// Tasks have no ownership column of their own. Every user-facing query joins
/// `projects` and filters on `projects.user_id`.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('TODO', 'IN_PROGRESS', 'DONE', 'ON_HOLD');
/// CREATE TYPE task_priority AS ENUM ('LOW', 'MEDIUM', 'HIGH');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     title VARCHAR(500) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'TODO',
///     priority task_priority NOT NULL DEFAULT 'MEDIUM',
///     start_date TIMESTAMPTZ,
///     due_date TIMESTAMPTZ,
///     estimated_hours DOUBLE PRECISION,
///     actual_hours DOUBLE PRECISION NOT NULL DEFAULT 0,
///     position INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// # use taskdeck_shared::models::task::{Task, UpdateTask, TaskStatus};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
/// # async fn example(pool: PgPool, id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// // Move a card to the Done column
/// let task = Task::update(&pool, id, user_id, UpdateTask {
///     status: Some(TaskStatus::Done),
///     ..Default::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const TASK_COLUMNS: &str =
    "tasks.id, tasks.project_id, tasks.title, tasks.description, tasks.status, tasks.priority, \
     tasks.start_date, tasks.due_date, tasks.estimated_hours, tasks.actual_hours, \
     tasks.position, tasks.created_at, tasks.updated_at";

/// Kanban column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    OnHold,
}

impl TaskStatus {
    /// All statuses in board order
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::OnHold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
            TaskStatus::OnHold => "ON_HOLD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: f64,

    /// Manual sort key within the project
    #[serde(rename = "order")]
    pub position: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
///
/// The new task is appended after the project's last task.
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,

    /// Defaults to `TODO`
    pub status: Option<TaskStatus>,

    /// Defaults to `MEDIUM`
    pub priority: Option<TaskPriority>,

    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
}

/// Partial update; `None` leaves a column unchanged, `Some(None)` clears it
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub start_date: Option<Option<DateTime<Utc>>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub estimated_hours: Option<Option<f64>>,
    pub actual_hours: Option<f64>,
    pub position: Option<i32>,
}

impl UpdateTask {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.start_date.is_none()
            && self.due_date.is_none()
            && self.estimated_hours.is_none()
            && self.actual_hours.is_none()
            && self.position.is_none()
    }
}

impl Task {
    /// Creates a task at the end of its project's ordering
    ///
    /// The caller must already have resolved the project as owned.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO tasks (project_id, title, description, status, priority,
                               start_date, due_date, estimated_hours, position)
            VALUES ($1, $2, $3,
                    COALESCE($4, 'TODO'::task_status),
                    COALESCE($5, 'MEDIUM'::task_priority),
                    $6, $7, $8,
                    (SELECT COALESCE(MAX(position) + 1, 0) FROM tasks WHERE project_id = $1))
            RETURNING {}
            "#,
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(data.project_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.status)
            .bind(data.priority)
            .bind(data.start_date)
            .bind(data.due_date)
            .bind(data.estimated_hours)
            .fetch_one(pool)
            .await
    }

    /// Finds a task by ID through its project's owner
    pub async fn find_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {}
            FROM tasks
            JOIN projects ON projects.id = tasks.project_id
            WHERE tasks.id = $1 AND projects.user_id = $2
            "#,
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Loads several of the caller's tasks at once
    pub async fn find_many_for_user(
        pool: &PgPool,
        ids: &[Uuid],
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT {}
            FROM tasks
            JOIN projects ON projects.id = tasks.project_id
            WHERE tasks.id = ANY($1) AND projects.user_id = $2
            "#,
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(ids)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Lists the caller's tasks in manual order, optionally for one project
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        project_id: Option<Uuid>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(TASK_COLUMNS);
        qb.push(" FROM tasks JOIN projects ON projects.id = tasks.project_id WHERE projects.user_id = ");
        qb.push_bind(user_id);

        if let Some(project_id) = project_id {
            qb.push(" AND tasks.project_id = ").push_bind(project_id);
        }

        qb.push(" ORDER BY tasks.position ASC, tasks.created_at ASC");

        qb.build_query_as::<Task>().fetch_all(pool).await
    }

    /// Lists a project's tasks in manual order
    ///
    /// The caller must already have resolved the project as owned.
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE project_id = $1 ORDER BY position ASC, created_at ASC",
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Applies a partial update, scoped through the project owner
    ///
    /// Returns `None` when the task does not exist or is not the caller's.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_for_user(pool, id, user_id).await;
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE tasks SET updated_at = NOW()");

        if let Some(title) = data.title {
            qb.push(", title = ").push_bind(title);
        }
        if let Some(description) = data.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(status) = data.status {
            qb.push(", status = ").push_bind(status);
        }
        if let Some(priority) = data.priority {
            qb.push(", priority = ").push_bind(priority);
        }
        if let Some(start_date) = data.start_date {
            qb.push(", start_date = ").push_bind(start_date);
        }
        if let Some(due_date) = data.due_date {
            qb.push(", due_date = ").push_bind(due_date);
        }
        if let Some(estimated_hours) = data.estimated_hours {
            qb.push(", estimated_hours = ").push_bind(estimated_hours);
        }
        if let Some(actual_hours) = data.actual_hours {
            qb.push(", actual_hours = ").push_bind(actual_hours);
        }
        if let Some(position) = data.position {
            qb.push(", position = ").push_bind(position);
        }

        qb.push(" FROM projects WHERE projects.id = tasks.project_id AND tasks.id = ");
        qb.push_bind(id);
        qb.push(" AND projects.user_id = ").push_bind(user_id);
        qb.push(" RETURNING ").push(TASK_COLUMNS);

        qb.build_query_as::<Task>().fetch_optional(pool).await
    }

    /// Hard-deletes a task; its project is untouched
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks
            USING projects
            WHERE projects.id = tasks.project_id AND tasks.id = $1 AND projects.user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts the caller's tasks per status
    ///
    /// Statuses with no tasks are absent from the result.
    pub async fn count_by_status(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<(TaskStatus, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (TaskStatus, i64)>(
            r#"
            SELECT tasks.status, COUNT(*)
            FROM tasks
            JOIN projects ON projects.id = tasks.project_id
            WHERE projects.user_id = $1
            GROUP BY tasks.status
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
