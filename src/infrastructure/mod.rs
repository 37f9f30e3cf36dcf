//! Infrastructure layer module
//!
//! This module contains the adapters behind the domain ports:
//! - Launchers (forked process and embedded runtime)
//! - Configuration management
//! - Maven settings parsing
//!
//! Infrastructure implementations satisfy the port traits defined in the
//! domain layer.

pub mod config;
pub mod launcher;
pub mod settings;
