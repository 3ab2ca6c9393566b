//! # TaskDeck API Server Library
//!
//! This library provides the HTTP surface of TaskDeck.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `input`: Lenient parsing of dates and numbers in request bodies
//! - `middleware`: Security headers and session authentication
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod input;
pub mod middleware;
pub mod routes;
