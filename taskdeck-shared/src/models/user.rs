/// User model and database operations
///
/// Users are created on first Google sign-in and matched by email afterwards.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(320) NOT NULL UNIQUE,
///     name VARCHAR(255),
///     image VARCHAR(1024),
///     email_verified_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A signed-in identity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    /// Unique across all users
    pub email: String,

    pub name: Option<String>,

    /// Profile picture URL from the identity provider
    pub image: Option<String>,

    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile data reported by the identity provider at sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertUser {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub email_verified: bool,
}

impl User {
    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, image, email_verified_at, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Creates the user on first sign-in, or refreshes their profile
    ///
    /// Missing profile fields never overwrite stored ones, and the first
    /// verification timestamp is kept.
    pub async fn upsert_by_email(pool: &PgPool, data: UpsertUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, image, email_verified_at)
            VALUES ($1, $2, $3, CASE WHEN $4 THEN NOW() ELSE NULL END)
            ON CONFLICT (email) DO UPDATE SET
                name = COALESCE(EXCLUDED.name, users.name),
                image = COALESCE(EXCLUDED.image, users.image),
                email_verified_at = COALESCE(users.email_verified_at, EXCLUDED.email_verified_at),
                updated_at = NOW()
            RETURNING id, email, name, image, email_verified_at, created_at, updated_at
            "#,
        )
        .bind(data.email)
        .bind(data.name)
        .bind(data.image)
        .bind(data.email_verified)
        .fetch_one(pool)
        .await
    }

    /// Deletes a user and, by cascade, everything they own
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
