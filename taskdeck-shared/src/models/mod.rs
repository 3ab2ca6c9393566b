/// Database models for TaskDeck
///
/// Each model owns its SQL. Queries that return user-visible rows take the
/// caller's `user_id` and filter on it, so a row belonging to someone else is
/// indistinguishable from a missing one.
///
/// # Models
///
/// - `user`: Signed-in identities
/// - `account`: Linked OAuth accounts holding the Google token pair
/// - `session`: Database-backed login sessions
/// - `project`: Projects and their status
/// - `task`: Kanban tasks, owned through their project
/// - `calendar_event`: Local read model of synced Google Calendar events
/// - `dashboard`: Derived per-user counts
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::project::{CreateProject, Project};
/// use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::with_url("postgresql://localhost/taskdeck")).await?;
///
/// let project = Project::create(&pool, CreateProject {
///     user_id,
///     name: "Website relaunch".to_string(),
///     description: None,
///     color: None,
///     status: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod account;
pub mod calendar_event;
pub mod dashboard;
pub mod project;
pub mod session;
pub mod task;
pub mod user;
