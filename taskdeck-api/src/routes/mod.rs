/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Google sign-in, sign-out, current session
/// - `projects`, `tasks`: ownership-scoped CRUD
/// - `calendar`: imported events, time summary, sync trigger
/// - `dashboard`: per-user aggregates
/// - `debug`: Google account diagnostics

pub mod auth;
pub mod calendar;
pub mod dashboard;
pub mod debug;
pub mod health;
pub mod projects;
pub mod tasks;

use serde::Serialize;

/// `{"success": true}` body for deletes and sign-out
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> axum::Json<Self> {
        axum::Json(Self { success: true })
    }
}
