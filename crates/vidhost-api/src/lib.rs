//! Axum HTTP API server.
//!
//! This crate provides:
//! - Video upload with validation ahead of any storage call
//! - Fail-open video listing and single-video lookup
//! - Rate limiting and security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

#[cfg(test)]
mod router_tests;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
