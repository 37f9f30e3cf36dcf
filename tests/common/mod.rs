//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration
//! test files.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Create a fake Maven installation under `dir`.
///
/// The installation's `bin/mvn` is a shell script running `script_body`,
/// so tests can control output and exit codes without a real Maven.
#[cfg(unix)]
#[allow(dead_code)]
pub fn fake_maven_home(dir: &Path, script_body: &str) -> PathBuf {
    let home = dir.join("maven-home");
    let bin = home.join("bin");
    std::fs::create_dir_all(&bin).expect("Failed to create bin directory");
    write_executable(&bin.join("mvn"), script_body);
    home
}

/// Write an executable shell script.
#[cfg(unix)]
#[allow(dead_code)]
pub fn write_executable(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
    let mut permissions = std::fs::metadata(path)
        .expect("Failed to stat script")
        .permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(path, permissions).expect("Failed to set permissions");
}
