//! mvnverify - Maven Integration-Test Harness
//!
//! mvnverify launches Maven builds against a project workspace and verifies
//! their outcomes: artifacts installed into the local repository, files and
//! archive entries produced by the build, and the content of the build log.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure business logic and domain models
//! - **Service Layer** (`services`): Build execution and verification
//! - **Infrastructure Layer** (`infrastructure`): Process and runtime adapters
//!
//! Builds run either in a forked Maven process or on an embedded runtime
//! shared process-wide. When the launch mode is `auto` or `embedded` and the
//! embedded runtime cannot be initialized, the harness quietly falls back to
//! forking; only an explicit `fork_jvm: false` makes that failure fatal.
//!
//! # Example
//!
//! ```ignore
//! use mvnverify::services::Verifier;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let verifier = Verifier::new("/path/to/project")?;
//!     verifier.execute_goal("install").await?;
//!     verifier.verify(true)?;
//!     Ok(())
//! }
//! ```

pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{ConfigError, LauncherError, VerifyError, VerifyResult};
pub use domain::models::{
    ArtifactCoordinate, BuildConfig, HarnessConfig, InvocationRequest, LauncherConfig,
    LocalRepository, RepositoryLayout,
};
pub use domain::ports::{MavenLauncher, MavenRuntime, MavenRuntimeFactory, RuntimeOutcome};
pub use infrastructure::config::ConfigLoader;
pub use infrastructure::launcher::{EmbeddedCache, EmbeddedLauncher, ForkedLauncher};
pub use services::Verifier;
