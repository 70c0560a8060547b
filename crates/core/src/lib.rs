//! Charla Core Library
//!
//! This crate provides the foundational utilities for the Charla chat core:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - Text normalization and keyword extraction

pub mod config;
pub mod error;
pub mod logging;
pub mod text;

// Re-export commonly used types
pub use config::{AppConfig, Budgets};
pub use error::{AppError, AppResult};
