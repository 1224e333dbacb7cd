//! eYantra Shared Types and Utilities
//!
//! This crate contains ids, domain models, store errors and database helpers
//! shared by the eYantra backend crates.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod db;
pub mod error;
pub mod types;

pub use db::*;
pub use error::*;
pub use types::*;
