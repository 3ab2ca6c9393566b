//! Google credential resolution for sync.
//!
//! The access token comes from the user's linked `google` account. When the
//! stored expiry has passed and a refresh token is on file, the token is
//! refreshed first and the new one is written back to the account row.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use taskdeck_shared::models::account::{Account, GOOGLE_PROVIDER};

use crate::error::SyncError;
use crate::google::oauth::TokenRefresher;

/// Tokens a sync run authenticates with
#[derive(Clone)]
pub struct GoogleCredentials {
    pub account_id: Uuid,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
}

impl std::fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCredentials")
            .field("account_id", &self.account_id)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl GoogleCredentials {
    /// Extracts usable credentials from an account lookup
    pub fn from_account(account: Option<&Account>) -> Result<Self, SyncError> {
        let account = account.ok_or(SyncError::AccountNotFound)?;
        let access_token = account
            .access_token
            .clone()
            .filter(|token| !token.is_empty())
            .ok_or(SyncError::MissingAccessToken)?;

        Ok(Self {
            account_id: account.id,
            access_token,
            refresh_token: account.refresh_token.clone().filter(|token| !token.is_empty()),
            expires_at: account.expires_at,
        })
    }

    /// True when the token is past its expiry and can be refreshed
    ///
    /// A token without a recorded expiry is treated as unexpired.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.can_refresh()
            && self
                .expires_at
                .map(|expires_at| expires_at <= now.timestamp())
                .unwrap_or(false)
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Refreshes the access token and persists it on the account
    pub async fn refresh(
        &mut self,
        pool: &PgPool,
        refresher: &dyn TokenRefresher,
    ) -> Result<(), SyncError> {
        let Some(refresh_token) = self.refresh_token.clone() else {
            return Err(SyncError::MissingAccessToken);
        };

        let tokens = refresher.refresh(&refresh_token).await?;
        let expires_at = tokens.expires_at(Utc::now());

        Account::update_tokens(
            pool,
            self.account_id,
            &tokens.access_token,
            expires_at,
            tokens.refresh_token.as_deref(),
        )
        .await?;

        info!(account_id = %self.account_id, "Refreshed Google access token");

        self.access_token = tokens.access_token;
        self.expires_at = expires_at;
        if let Some(rotated) = tokens.refresh_token {
            self.refresh_token = Some(rotated);
        }

        Ok(())
    }
}

/// Loads the user's Google credentials, refreshing them if expired
pub async fn resolve_credentials(
    pool: &PgPool,
    refresher: &dyn TokenRefresher,
    user_id: Uuid,
) -> Result<GoogleCredentials, SyncError> {
    let account = Account::find_by_user_and_provider(pool, user_id, GOOGLE_PROVIDER).await?;

    debug!(
        user_id = %user_id,
        account_found = account.is_some(),
        has_access_token = account.as_ref().map(|a| a.access_token.is_some()).unwrap_or(false),
        has_refresh_token = account.as_ref().map(|a| a.refresh_token.is_some()).unwrap_or(false),
        "Resolving Google credentials"
    );

    let mut credentials = GoogleCredentials::from_account(account.as_ref())?;

    if credentials.needs_refresh(Utc::now()) {
        credentials.refresh(pool, refresher).await?;
    }

    Ok(credentials)
}
