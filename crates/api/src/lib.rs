//! eYantra API Library
//!
//! This crate contains the HTTP server components for the eYantra lab
//! backend: admin authentication, events, developer profiles and contact
//! submissions.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod security;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
