/// Authentication and authorization for TaskDeck
///
/// # Modules
///
/// - [`session_token`]: Random session token generation and SHA-256 hashing
/// - [`session`]: Request auth context and session lookup
/// - [`ownership`]: `resolve_owned`, the single ownership check every handler uses
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::auth::ownership::resolve_owned;
/// use taskdeck_shared::auth::session::AuthContext;
/// use taskdeck_shared::models::project::Project;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, auth: AuthContext, id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let project: Project = resolve_owned(&pool, id, auth.user_id).await?;
/// # Ok(())
/// # }
/// ```

pub mod ownership;
pub mod session;
pub mod session_token;
