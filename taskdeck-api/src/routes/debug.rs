/// Linked-account diagnostics
///
/// Helps tell "never connected Google" apart from "connected but the token
/// pair is incomplete" when a calendar sync fails. Token values never leave
/// the server; only their presence and length do.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use serde::Serialize;
use taskdeck_shared::{
    auth::session::AuthContext,
    models::account::{Account, GOOGLE_PROVIDER},
};
use uuid::Uuid;

#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum AccountDiagnostics {
    Linked(LinkedAccount),
    Missing(MissingAccount),
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAccount {
    pub account_exists: bool,
    pub has_access_token: bool,
    pub has_refresh_token: bool,
    pub access_token_length: usize,
    pub refresh_token_length: usize,

    /// Unix seconds
    pub expires_at: Option<i64>,

    pub scope: Option<String>,
    pub provider: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MissingAccount {
    pub account_exists: bool,
    pub error: String,
    pub user_id: Uuid,
    pub message: String,
}

impl AccountDiagnostics {
    pub fn describe(user_id: Uuid, account: Option<&Account>) -> Self {
        let Some(account) = account else {
            return Self::Missing(MissingAccount {
                account_exists: false,
                error: "Google account not found".to_string(),
                user_id,
                message: "No Google account linked. Sign in with Google to connect your calendar."
                    .to_string(),
            });
        };

        let length = |token: &Option<String>| token.as_deref().map_or(0, str::len);

        Self::Linked(LinkedAccount {
            account_exists: true,
            has_access_token: account.access_token.as_deref().is_some_and(|t| !t.is_empty()),
            has_refresh_token: account.refresh_token.as_deref().is_some_and(|t| !t.is_empty()),
            access_token_length: length(&account.access_token),
            refresh_token_length: length(&account.refresh_token),
            expires_at: account.expires_at,
            scope: account.scope.clone(),
            provider: account.provider.clone(),
        })
    }
}

/// `GET /debug/account`
pub async fn account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<AccountDiagnostics>> {
    let account =
        Account::find_by_user_and_provider(&state.db, auth.user_id, GOOGLE_PROVIDER).await?;

    Ok(Json(AccountDiagnostics::describe(auth.user_id, account.as_ref())))
}
