/// Session authentication middleware
///
/// Protected routes sit behind [`require_session`]. The session token is read
/// from `Authorization: Bearer <token>` first, then from the
/// `taskdeck.session_token` cookie. A valid token puts an [`AuthContext`] into
/// the request extensions; anything else is answered with 401 before the
/// handler runs.
///
/// # Example
///
/// ```no_run
/// use axum::{Extension, Json};
/// use taskdeck_shared::auth::session::AuthContext;
///
/// async fn whoami(Extension(auth): Extension<AuthContext>) -> Json<AuthContext> {
///     Json(auth)
/// }
/// ```

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use taskdeck_shared::auth::session::{authenticate, bearer_token, SessionError, SESSION_COOKIE};
use tower_cookies::{
    cookie::{time::Duration, SameSite},
    Cookie, Cookies,
};

use crate::{app::AppState, error::ApiError};

/// Rejects the request with 401 unless it carries a live session
pub async fn require_session(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(req.headers(), &cookies).ok_or(SessionError::Missing)?;

    let auth = authenticate(&state.db, &token).await?;
    tracing::debug!(user_id = %auth.user_id, "Authenticated session");

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}

/// Plaintext session token from the bearer header or the session cookie
pub fn session_token(headers: &HeaderMap, cookies: &Cookies) -> Option<String> {
    bearer_token(headers).map(str::to_string).or_else(|| {
        cookies
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Cookie carrying a freshly issued session token
pub fn session_cookie(token: String, ttl_days: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::days(ttl_days))
        .build()
}

/// Cookie that clears the session token in the browser
pub fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tds_abc".to_string(), 30, true);

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "tds_abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(Duration::days(30)));
    }

    #[test]
    fn test_cleared_cookie_matches_session_path() {
        let cookie = cleared_session_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.path(), Some("/"));
    }
}
