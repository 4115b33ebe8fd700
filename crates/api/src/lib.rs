//! # Goal Achiever Pro API
//!
//! HTTP layer - axum routes and application wiring.
//!
//! This crate contains:
//! - The axum router and its handlers
//! - Application context (dependency injection)
//! - Request identity middleware
//! - The server binary
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - Maps domain errors to HTTP responses

pub mod context;
pub mod error;
pub mod identity;
pub mod routes;
pub mod utils;

// Re-export for convenience
pub use context::{AppContext, BackgroundTasks};
pub use error::{ApiError, ApiResult};
pub use routes::router;
