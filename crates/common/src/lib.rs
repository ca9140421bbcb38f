//! CiteForge Common Library
//!
//! Shared code for the CiteForge crates including:
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability
//! - Tracing subscriber setup

pub mod config;
pub mod errors;
pub mod metrics;
pub mod telemetry;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use config::AppConfig;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
