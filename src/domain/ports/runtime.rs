use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::LauncherError;

/// Result of one in-process runtime invocation: the exit code and the
/// combined output bytes.
#[derive(Debug, Clone)]
pub struct RuntimeOutcome {
    pub exit_code: i32,
    pub output: Vec<u8>,
}

/// An in-process Maven runtime.
///
/// Unlike a forked process, an in-process runtime shares the harness
/// environment and cannot be given per-invocation environment variables.
#[async_trait]
pub trait MavenRuntime: Send + Sync {
    /// Run the given command line and capture the combined output.
    async fn invoke(
        &self,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<RuntimeOutcome, LauncherError>;
}

/// Loads an in-process runtime.
///
/// Loading is expensive, so the result is cached process-wide; a factory is
/// consulted at most once per cache, with the installation and resources of
/// whichever caller gets there first.
pub trait MavenRuntimeFactory: Send + Sync {
    /// Load a runtime for the given installation and extra resources.
    fn load(
        &self,
        maven_home: Option<&Path>,
        resources: &[PathBuf],
    ) -> Result<Arc<dyn MavenRuntime>, LauncherError>;
}
