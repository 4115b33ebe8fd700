//! # Goal Achiever Pro Domain
//!
//! Business domain types for the calendar synchronization service.
//!
//! This crate contains:
//! - Sync ledger, settings, channel and credential records
//! - Request principals
//! - Domain error types and the `Result` alias
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other Goal Achiever Pro crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
