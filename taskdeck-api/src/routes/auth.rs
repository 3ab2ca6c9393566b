/// Authentication endpoints
///
/// Sign-in is Google OAuth2 only. A successful callback creates a
/// database-backed session and hands its token to the browser in the
/// `taskdeck.session_token` cookie.
///
/// # Endpoints
///
/// - `GET /auth/signin/google` - Redirect to Google's consent page
/// - `GET /auth/callback/google` - Finish sign-in and set the session cookie
/// - `POST /auth/signout` - End the current session
/// - `GET /auth/session` - Current user and session expiry

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::{cleared_session_cookie, session_cookie},
    routes::SuccessResponse,
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Redirect,
    Extension, Json,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{session::AuthContext, session_token::generate_session_token},
    models::{
        account::{Account, LinkAccount, GOOGLE_PROVIDER},
        session::Session,
        user::{UpsertUser, User},
    },
};
use tower_cookies::{
    cookie::{time, SameSite},
    Cookie, Cookies,
};
use uuid::Uuid;

/// Cookie holding the nonce of an in-flight sign-in
pub const OAUTH_STATE_COOKIE: &str = "taskdeck.oauth_state";

/// How long a sign-in attempt stays valid
const STATE_TTL_MINUTES: i64 = 10;

const NONCE_LENGTH: usize = 32;

/// Claims of the signed `state` parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthState {
    pub nonce: String,
    pub iat: i64,
    pub exp: i64,
}

impl OAuthState {
    pub fn new(now: DateTime<Utc>) -> Self {
        let nonce = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LENGTH)
            .map(char::from)
            .collect();

        Self {
            nonce,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(STATE_TTL_MINUTES)).timestamp(),
        }
    }

    /// HS256-signed token for the `state` query parameter
    pub fn sign(&self, secret: &[u8]) -> Result<String, ApiError> {
        encode(&Header::new(Algorithm::HS256), self, &EncodingKey::from_secret(secret))
            .map_err(|e| ApiError::InternalError(format!("Failed to sign OAuth state: {}", e)))
    }

    /// Checks the signature and expiry of a returned `state`
    pub fn verify(token: &str, secret: &[u8]) -> Result<Self, ApiError> {
        decode::<OAuthState>(
            token,
            &DecodingKey::from_secret(secret),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!(error = %e, "Rejected OAuth state");
            ApiError::Unauthorized("Invalid sign-in state".to_string())
        })
    }
}

fn state_cookie(nonce: String, secure: bool) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, nonce))
        .path("/auth")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(STATE_TTL_MINUTES))
        .build()
}

/// Query Google appends to the redirect URL
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,

    /// Set when the user declined consent
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// `GET /auth/session` response
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
}

/// Start Google sign-in
pub async fn signin_google(
    State(state): State<AppState>,
    cookies: Cookies,
) -> ApiResult<Redirect> {
    let oauth_state = OAuthState::new(Utc::now());
    let signed = oauth_state.sign(state.session_secret())?;
    let url = state.oauth.authorization_url(&signed)?;

    cookies.add(state_cookie(oauth_state.nonce, state.config.api.production));

    Ok(Redirect::to(&url))
}

/// Finish Google sign-in
///
/// # Errors
///
/// - `400 Bad Request`: no authorization code
/// - `401 Unauthorized`: consent declined, state mismatch, or Google rejected the code
pub async fn callback_google(
    State(state): State<AppState>,
    cookies: Cookies,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> ApiResult<Redirect> {
    let Query(query) = query?;

    if let Some(error) = query.error {
        tracing::info!(error = %error, "Google sign-in declined");
        return Err(ApiError::Unauthorized("Google sign-in was cancelled".to_string()));
    }

    let claims = OAuthState::verify(
        query.state.as_deref().unwrap_or_default(),
        state.session_secret(),
    )?;

    let expected_nonce = cookies.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    cookies.remove(Cookie::build((OAUTH_STATE_COOKIE, "")).path("/auth").build());

    if expected_nonce.as_deref() != Some(claims.nonce.as_str()) {
        tracing::warn!("OAuth state nonce does not match the browser cookie");
        return Err(ApiError::Unauthorized("Invalid sign-in state".to_string()));
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing authorization code".to_string()))?;

    let now = Utc::now();
    let tokens = state.oauth.exchange_code(&code).await?;
    let profile = state.oauth.user_info(&tokens.access_token).await?;

    let user = User::upsert_by_email(
        &state.db,
        UpsertUser {
            email: profile.email,
            name: profile.name,
            image: profile.picture,
            email_verified: profile.verified_email,
        },
    )
    .await?;

    Account::link(
        &state.db,
        LinkAccount {
            user_id: user.id,
            provider: GOOGLE_PROVIDER.to_string(),
            provider_account_id: profile.id,
            expires_at: tokens.expires_at(now),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            scope: tokens.scope,
            token_type: tokens.token_type,
            id_token: tokens.id_token,
        },
    )
    .await?;

    let ttl_days = state.config.session.ttl_days;
    let (token, token_hash) = generate_session_token();
    Session::create(&state.db, user.id, &token_hash, now + Duration::days(ttl_days)).await?;

    cookies.add(session_cookie(token, ttl_days, state.config.api.production));

    tracing::info!(user_id = %user.id, "User signed in with Google");

    Ok(Redirect::to(&state.config.api.post_login_redirect))
}

/// End the current session
pub async fn signout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    cookies: Cookies,
) -> ApiResult<Json<SuccessResponse>> {
    Session::delete(&state.db, auth.session_id).await?;
    cookies.remove(cleared_session_cookie());

    tracing::info!(user_id = %auth.user_id, "User signed out");

    Ok(SuccessResponse::ok())
}

/// Current user and session expiry
pub async fn session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<SessionResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

    Ok(Json(SessionResponse {
        user: SessionUser {
            id: user.id,
            email: user.email,
            name: user.name,
            image: user.image,
        },
        expires: auth.expires_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_state_round_trips_with_the_same_secret() {
        let state = OAuthState::new(Utc::now());
        assert_eq!(state.nonce.len(), NONCE_LENGTH);

        let signed = state.sign(SECRET).unwrap();
        assert_eq!(OAuthState::verify(&signed, SECRET).unwrap(), state);
    }

    #[test]
    fn test_state_rejects_other_secret() {
        let signed = OAuthState::new(Utc::now()).sign(SECRET).unwrap();
        let result = OAuthState::verify(&signed, b"another-secret-another-secret-xx");
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_state_rejects_expired_token() {
        let issued = Utc::now() - Duration::hours(1);
        let signed = OAuthState::new(issued).sign(SECRET).unwrap();
        assert!(OAuthState::verify(&signed, SECRET).is_err());
    }

    #[test]
    fn test_state_rejects_garbage() {
        assert!(OAuthState::verify("", SECRET).is_err());
        assert!(OAuthState::verify("not.a.jwt", SECRET).is_err());
    }

    #[test]
    fn test_state_cookie_is_scoped_to_auth_routes() {
        let cookie = state_cookie("nonce".to_string(), false);
        assert_eq!(cookie.name(), OAUTH_STATE_COOKIE);
        assert_eq!(cookie.path(), Some("/auth"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn test_session_response_shape() {
        let body = serde_json::to_value(SessionResponse {
            user: SessionUser {
                id: Uuid::nil(),
                email: "ada@example.com".to_string(),
                name: Some("Ada".to_string()),
                image: None,
            },
            expires: Utc::now(),
        })
        .unwrap();

        assert_eq!(body["user"]["email"], "ada@example.com");
        assert!(body["user"]["image"].is_null());
        assert!(body["expires"].is_string());
    }
}
