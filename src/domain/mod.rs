//! Domain layer for the Maven verification harness
//!
//! This module contains the core models, log analysis, and port traits.

pub mod errors;
pub mod log_scan;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{ConfigError, LauncherError, VerifyError, VerifyResult};
