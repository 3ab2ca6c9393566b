/// Per-user dashboard aggregates
///
/// Everything here is derived on read; nothing is stored.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::project::{Project, ProjectStatus};
use super::task::{Task, TaskStatus};

/// Task counts keyed by board column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TasksByStatus {
    pub todo: i64,
    pub in_progress: i64,
    pub done: i64,
    pub on_hold: i64,
}

impl TasksByStatus {
    pub fn from_counts(counts: &[(TaskStatus, i64)]) -> Self {
        let mut by_status = Self::default();
        for (status, count) in counts {
            match status {
                TaskStatus::Todo => by_status.todo += count,
                TaskStatus::InProgress => by_status.in_progress += count,
                TaskStatus::Done => by_status.done += count,
                TaskStatus::OnHold => by_status.on_hold += count,
            }
        }
        by_status
    }

    pub fn total(&self) -> i64 {
        self.todo + self.in_progress + self.done + self.on_hold
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentProject {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub task_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub active_projects: i64,
    pub total_tasks: i64,
    pub tasks_by_status: TasksByStatus,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,

    /// Active projects, most recently updated first
    pub recent_projects: Vec<RecentProject>,
}

impl DashboardSummary {
    pub fn from_parts(active: Vec<RecentProject>, by_status: TasksByStatus) -> Self {
        Self {
            active_projects: i64::try_from(active.len()).unwrap_or(i64::MAX),
            total_tasks: by_status.total(),
            tasks_by_status: by_status,
            completed_tasks: by_status.done,
            in_progress_tasks: by_status.in_progress,
            recent_projects: active,
        }
    }

    /// Computes the caller's dashboard
    pub async fn for_user(pool: &PgPool, user_id: Uuid) -> Result<Self, sqlx::Error> {
        let active = Project::list_with_counts_filtered(pool, user_id, Some(ProjectStatus::Active))
            .await?
            .into_iter()
            .map(|listed| RecentProject {
                id: listed.project.id,
                name: listed.project.name,
                description: listed.project.description,
                color: listed.project.color,
                task_count: listed.counts.tasks,
            })
            .collect();

        let counts = Task::count_by_status(pool, user_id).await?;

        Ok(Self::from_parts(active, TasksByStatus::from_counts(&counts)))
    }
}
