//! # TaskDeck Shared Library
//!
//! This crate contains shared types, persistence, and authorization logic used
//! across the TaskDeck API server and the calendar sync crate.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their queries
//! - `db`: Connection pooling, migrations, and data resets
//! - `auth`: Session tokens, request auth context, and ownership checks
//! - `patch`: Serde helpers for partial-update request bodies

pub mod auth;
pub mod db;
pub mod models;
pub mod patch;

/// Current version of the TaskDeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
