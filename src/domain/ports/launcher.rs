use async_trait::async_trait;

use crate::domain::errors::LauncherError;
use crate::domain::models::InvocationRequest;

/// Launch strategy for build invocations.
///
/// Implementations run one complete build and report the raw exit code;
/// interpreting that code is the verifier's job. The combined build output
/// always lands in the request's log file, whatever the strategy.
#[async_trait]
pub trait MavenLauncher: Send + Sync {
    /// Run one build to completion and return its exit code.
    async fn run(&self, request: &InvocationRequest) -> Result<i32, LauncherError>;

    /// Query the underlying Maven for its version string.
    async fn maven_version(&self) -> Result<String, LauncherError>;
}

impl std::fmt::Debug for dyn MavenLauncher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn MavenLauncher")
    }
}
