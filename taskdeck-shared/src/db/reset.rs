/// Development data resets
///
/// `reset_auth` signs everyone out and unlinks OAuth accounts, which forces a
/// fresh Google consent (and a new refresh token) on the next sign-in.
/// `reset_all` empties every table in foreign-key order.
///
/// Both run inside a single transaction.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, warn};

/// Rows removed per table by a reset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    pub calendar_events: u64,
    pub tasks: u64,
    pub projects: u64,
    pub sessions: u64,
    pub accounts: u64,
    pub users: u64,
}

impl ResetReport {
    /// Total number of rows deleted
    pub fn total(&self) -> u64 {
        self.calendar_events + self.tasks + self.projects + self.sessions + self.accounts + self.users
    }
}

async fn delete_all(tx: &mut Transaction<'_, Postgres>, table: &str) -> Result<u64, sqlx::Error> {
    // table names come from the fixed list below, never from input
    let result = sqlx::query(&format!("DELETE FROM {}", table))
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}

/// Deletes all sessions and linked accounts
pub async fn reset_auth(pool: &PgPool) -> Result<ResetReport, sqlx::Error> {
    warn!("Resetting authentication data");

    let mut tx = pool.begin().await?;
    let report = ResetReport {
        sessions: delete_all(&mut tx, "sessions").await?,
        accounts: delete_all(&mut tx, "accounts").await?,
        ..Default::default()
    };
    tx.commit().await?;

    info!(
        sessions = report.sessions,
        accounts = report.accounts,
        "Authentication data reset"
    );
    Ok(report)
}

/// Deletes every row in every table
pub async fn reset_all(pool: &PgPool) -> Result<ResetReport, sqlx::Error> {
    warn!("Resetting all data");

    let mut tx = pool.begin().await?;
    let report = ResetReport {
        calendar_events: delete_all(&mut tx, "calendar_events").await?,
        tasks: delete_all(&mut tx, "tasks").await?,
        projects: delete_all(&mut tx, "projects").await?,
        sessions: delete_all(&mut tx, "sessions").await?,
        accounts: delete_all(&mut tx, "accounts").await?,
        users: delete_all(&mut tx, "users").await?,
    };
    tx.commit().await?;

    info!(total = report.total(), "All data reset");
    Ok(report)
}
