/// Calendar event read model
///
/// Rows are written only by calendar sync and are never deleted by it. The
/// upsert key is `(user_id, google_event_id)`, so two users who share an
/// event each get their own row.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE calendar_events (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     task_id UUID REFERENCES tasks(id) ON DELETE SET NULL,
///     project_id UUID REFERENCES projects(id) ON DELETE SET NULL,
///     google_event_id VARCHAR(1024) NOT NULL,
///     calendar_id VARCHAR(255) NOT NULL DEFAULT 'primary',
///     title VARCHAR(1024) NOT NULL,
///     description TEXT,
///     start_time TIMESTAMPTZ NOT NULL,
///     end_time TIMESTAMPTZ NOT NULL,
///     duration DOUBLE PRECISION NOT NULL,
///     synced_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (user_id, google_event_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Calendar that sync reads from and records on each row
pub const PRIMARY_CALENDAR: &str = "primary";

const EVENT_COLUMNS: &str =
    "id, user_id, task_id, project_id, google_event_id, calendar_id, title, description, \
     start_time, end_time, duration, synced_at, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub task_id: Option<Uuid>,
    pub project_id: Option<Uuid>,

    /// Provider's event id
    pub google_event_id: String,

    pub calendar_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,

    /// Length in hours
    pub duration: f64,

    pub synced_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written by one sync of one event
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertCalendarEvent {
    pub user_id: Uuid,
    pub google_event_id: String,
    pub calendar_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration: f64,
}

/// Inclusive time filter for listing events
///
/// Matches events with `start_time >= start` and `end_time <= end`; either
/// bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl CalendarEvent {
    /// Inserts the event, or updates the caller's existing copy of it
    ///
    /// On conflict only the synced fields change; links to a task or project
    /// and `calendar_id` are kept.
    pub async fn upsert(pool: &PgPool, data: &UpsertCalendarEvent) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO calendar_events (user_id, google_event_id, calendar_id, title, description,
                                         start_time, end_time, duration, synced_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT ON CONSTRAINT calendar_events_user_google_event_unique DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                start_time = EXCLUDED.start_time,
                end_time = EXCLUDED.end_time,
                duration = EXCLUDED.duration,
                synced_at = NOW(),
                updated_at = NOW()
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );

        sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(data.user_id)
            .bind(&data.google_event_id)
            .bind(&data.calendar_id)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.start_time)
            .bind(data.end_time)
            .bind(data.duration)
            .fetch_one(pool)
            .await
    }

    pub async fn find_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM calendar_events WHERE id = $1 AND user_id = $2",
            EVENT_COLUMNS
        );

        sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Lists the caller's events inside `range`, earliest first
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        range: EventRange,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(EVENT_COLUMNS);
        qb.push(" FROM calendar_events WHERE user_id = ");
        qb.push_bind(user_id);

        if let Some(start) = range.start {
            qb.push(" AND start_time >= ").push_bind(start);
        }
        if let Some(end) = range.end {
            qb.push(" AND end_time <= ").push_bind(end);
        }

        qb.push(" ORDER BY start_time ASC");

        qb.build_query_as::<CalendarEvent>().fetch_all(pool).await
    }

    /// Lists the events linked to a task, earliest first
    pub async fn list_by_task(
        pool: &PgPool,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM calendar_events WHERE task_id = $1 AND user_id = $2 ORDER BY start_time ASC",
            EVENT_COLUMNS
        );

        sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(task_id)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM calendar_events WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}
