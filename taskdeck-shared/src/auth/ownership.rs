/// Ownership-scoped resource resolution
///
/// Every handler that touches a single project, task, or calendar event first
/// calls [`resolve_owned`]. The lookup filters on the caller's id inside the
/// query itself, so a row owned by someone else comes back as `None`, and the
/// caller sees the same `NotFound` as for an id that never existed.
///
/// | Resource        | Ownership predicate                                   |
/// |-----------------|-------------------------------------------------------|
/// | `Project`       | `projects.user_id = $user`                            |
/// | `Task`          | `JOIN projects ON tasks.project_id` + `projects.user_id = $user` |
/// | `CalendarEvent` | `calendar_events.user_id = $user`                     |
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::auth::ownership::{resolve_owned, OwnershipError};
/// use taskdeck_shared::models::task::Task;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, task_id: Uuid, user_id: Uuid) -> Result<(), OwnershipError> {
/// let task: Task = resolve_owned(&pool, task_id, user_id).await?;
/// println!("{} belongs to project {}", task.title, task.project_id);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

use crate::models::{calendar_event::CalendarEvent, project::Project, task::Task};

/// Kinds of user-owned resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Project,
    Task,
    CalendarEvent,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceKind::Project => "Project",
            ResourceKind::Task => "Task",
            ResourceKind::CalendarEvent => "Calendar event",
        };
        f.write_str(label)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OwnershipError {
    /// Missing, or owned by another user
    #[error("{0} not found")]
    NotFound(ResourceKind),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A resource reachable from a user through an ownership chain
#[async_trait]
pub trait Owned: Sized + Send {
    const KIND: ResourceKind;

    /// Loads the resource only if `user_id` owns it
    async fn find_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<Option<Self>, sqlx::Error>;
}

#[async_trait]
impl Owned for Project {
    const KIND: ResourceKind = ResourceKind::Project;

    async fn find_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        Project::find_for_user(pool, id, user_id).await
    }
}

#[async_trait]
impl Owned for Task {
    const KIND: ResourceKind = ResourceKind::Task;

    async fn find_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        Task::find_for_user(pool, id, user_id).await
    }
}

#[async_trait]
impl Owned for CalendarEvent {
    const KIND: ResourceKind = ResourceKind::CalendarEvent;

    async fn find_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        CalendarEvent::find_for_user(pool, id, user_id).await
    }
}

/// Resolves `id` as a `T` owned by `user_id`, or `NotFound`
pub async fn resolve_owned<T: Owned>(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<T, OwnershipError> {
    T::find_owned(pool, id, user_id)
        .await?
        .ok_or(OwnershipError::NotFound(T::KIND))
}
