/// Linked OAuth accounts
///
/// One row per (provider, provider account). The Google row carries the
/// access/refresh token pair that calendar sync authenticates with.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE accounts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     provider VARCHAR(50) NOT NULL,
///     provider_account_id VARCHAR(255) NOT NULL,
///     access_token TEXT,
///     refresh_token TEXT,
///     expires_at BIGINT,
///     scope TEXT,
///     token_type VARCHAR(50),
///     id_token TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (provider, provider_account_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

/// Provider name stored for Google accounts
pub const GOOGLE_PROVIDER: &str = "google";

/// A linked OAuth account
///
/// Not `Serialize`: tokens must never reach a response body. `Debug` redacts them.
#[derive(Clone, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: String,
    pub provider_account_id: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,

    /// Access token expiry in unix seconds
    pub expires_at: Option<i64>,

    pub scope: Option<String>,
    pub token_type: Option<String>,
    pub id_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("provider", &self.provider)
            .field("provider_account_id", &self.provider_account_id)
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Tokens and identity returned by a completed OAuth exchange
#[derive(Clone)]
pub struct LinkAccount {
    pub user_id: Uuid,
    pub provider: String,
    pub provider_account_id: String,
    pub access_token: String,

    /// Google only returns this on consent; `None` keeps the stored one
    pub refresh_token: Option<String>,

    pub expires_at: Option<i64>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
    pub id_token: Option<String>,
}

impl Account {
    /// Finds the caller's account for a provider
    pub async fn find_by_user_and_provider(
        pool: &PgPool,
        user_id: Uuid,
        provider: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, user_id, provider, provider_account_id, access_token, refresh_token,
                   expires_at, scope, token_type, id_token, created_at, updated_at
            FROM accounts
            WHERE user_id = $1 AND provider = $2
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(provider)
        .fetch_optional(pool)
        .await
    }

    /// Inserts or refreshes the account for a provider identity
    pub async fn link(pool: &PgPool, data: LinkAccount) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (user_id, provider, provider_account_id, access_token,
                                  refresh_token, expires_at, scope, token_type, id_token)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (provider, provider_account_id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                access_token = EXCLUDED.access_token,
                refresh_token = COALESCE(EXCLUDED.refresh_token, accounts.refresh_token),
                expires_at = EXCLUDED.expires_at,
                scope = COALESCE(EXCLUDED.scope, accounts.scope),
                token_type = COALESCE(EXCLUDED.token_type, accounts.token_type),
                id_token = COALESCE(EXCLUDED.id_token, accounts.id_token),
                updated_at = NOW()
            RETURNING id, user_id, provider, provider_account_id, access_token, refresh_token,
                      expires_at, scope, token_type, id_token, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.provider)
        .bind(data.provider_account_id)
        .bind(data.access_token)
        .bind(data.refresh_token)
        .bind(data.expires_at)
        .bind(data.scope)
        .bind(data.token_type)
        .bind(data.id_token)
        .fetch_one(pool)
        .await
    }

    /// Stores a refreshed access token
    ///
    /// `refresh_token` is only replaced when the provider rotated it.
    pub async fn update_tokens(
        pool: &PgPool,
        id: Uuid,
        access_token: &str,
        expires_at: Option<i64>,
        refresh_token: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET access_token = $2,
                expires_at = $3,
                refresh_token = COALESCE($4, refresh_token),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(access_token)
        .bind(expires_at)
        .bind(refresh_token)
        .execute(pool)
        .await?;

        Ok(())
    }
}
