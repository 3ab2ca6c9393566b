/// Router tests that need no database
///
/// The app runs over a pool pointed at a closed port, so anything that
/// reaches the store would fail; these requests must be answered before that.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{offline_app, send};
use serde_json::json;
use tower::ServiceExt;

const PROTECTED: &[(&str, &str)] = &[
    ("POST", "/auth/signout"),
    ("GET", "/auth/session"),
    ("GET", "/projects"),
    ("POST", "/projects"),
    ("GET", "/projects/5f0c6c3e-8a61-4d5c-9a57-1f1d3b2a7c10"),
    ("PATCH", "/projects/5f0c6c3e-8a61-4d5c-9a57-1f1d3b2a7c10"),
    ("DELETE", "/projects/5f0c6c3e-8a61-4d5c-9a57-1f1d3b2a7c10"),
    ("GET", "/tasks"),
    ("POST", "/tasks"),
    ("GET", "/tasks/5f0c6c3e-8a61-4d5c-9a57-1f1d3b2a7c10"),
    ("PATCH", "/tasks/5f0c6c3e-8a61-4d5c-9a57-1f1d3b2a7c10"),
    ("DELETE", "/tasks/5f0c6c3e-8a61-4d5c-9a57-1f1d3b2a7c10"),
    ("GET", "/calendar/events"),
    ("GET", "/calendar/summary"),
    ("POST", "/calendar/sync"),
    ("GET", "/dashboard"),
    ("GET", "/debug/account"),
];

#[tokio::test]
async fn test_protected_routes_require_a_session() {
    let app = offline_app();

    for (method, uri) in PROTECTED {
        let method = Method::from_bytes(method.as_bytes()).unwrap();
        let (status, body) = send(&app, method.clone(), uri, None, Some(json!({}))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body, json!({ "error": "Unauthorized" }), "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_malformed_bearer_token_is_rejected() {
    let app = offline_app();

    for token in ["not-a-session", "tds_short", "Bearer"] {
        let (status, _) = send(&app, Method::GET, "/projects", Some(token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "token {:?}", token);
    }
}

#[tokio::test]
async fn test_malformed_session_cookie_is_rejected() {
    let request = Request::builder()
        .uri("/dashboard")
        .header(header::COOKIE, "taskdeck.session_token=garbage")
        .body(Body::empty())
        .unwrap();

    let response = offline_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, _) = send(&offline_app(), Method::GET, "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_degraded_database() {
    let (status, body) = send(&offline_app(), Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_responses_carry_security_headers() {
    let request = Request::builder().uri("/projects").body(Body::empty()).unwrap();
    let response = offline_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    // HSTS is production-only
    assert!(response.headers().get("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_signin_redirects_to_google_with_state_cookie() {
    let request = Request::builder()
        .uri("/auth/signin/google")
        .body(Body::empty())
        .unwrap();
    let response = offline_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
    assert!(location.contains("access_type=offline"));
    assert!(location.contains("prompt=consent"));
    assert!(location.contains("state="));

    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("taskdeck.oauth_state="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_callback_rejects_forged_state() {
    let app = offline_app();

    let (status, _) = send(
        &app,
        Method::GET,
        "/auth/callback/google?code=abc&state=forged",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::GET,
        "/auth/callback/google?error=access_denied",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
