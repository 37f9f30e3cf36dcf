//! Embedded-runtime launcher
//!
//! Runs builds through an in-process Maven runtime instead of forking.
//! Loading a runtime is expensive, so loaded launchers are shared through a
//! process-wide cache keyed by nothing: the first caller's installation
//! wins for the lifetime of the process.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::domain::errors::LauncherError;
use crate::domain::log_scan;
use crate::domain::models::InvocationRequest;
use crate::domain::ports::{MavenLauncher, MavenRuntime, MavenRuntimeFactory};

/// Launcher that drives an in-process Maven runtime.
pub struct EmbeddedLauncher {
    runtime: Arc<dyn MavenRuntime>,
}

impl std::fmt::Debug for EmbeddedLauncher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedLauncher").finish_non_exhaustive()
    }
}

impl EmbeddedLauncher {
    pub fn new(runtime: Arc<dyn MavenRuntime>) -> Self {
        Self { runtime }
    }

    /// Load a launcher through the given factory.
    pub fn load(
        factory: &dyn MavenRuntimeFactory,
        maven_home: Option<&Path>,
        resources: &[PathBuf],
    ) -> Result<Self, LauncherError> {
        let runtime = factory.load(maven_home, resources)?;
        Ok(Self::new(runtime))
    }
}

#[async_trait]
impl MavenLauncher for EmbeddedLauncher {
    async fn run(&self, request: &InvocationRequest) -> Result<i32, LauncherError> {
        // An in-process runtime shares this process's environment and
        // cannot honor per-invocation variables.
        if !request.environment().is_empty() {
            return Err(LauncherError::EnvironmentUnsupported);
        }

        let outcome = self
            .runtime
            .invoke(&request.render_args(), request.working_dir())
            .await?;
        tokio::fs::write(request.log_file(), &outcome.output).await?;
        Ok(outcome.exit_code)
    }

    async fn maven_version(&self) -> Result<String, LauncherError> {
        let args = vec!["--version".to_string()];
        let outcome = self.runtime.invoke(&args, None).await?;
        let output = String::from_utf8_lossy(&outcome.output);
        log_scan::extract_maven_version(output.lines()).ok_or_else(|| {
            LauncherError::VersionNotFound {
                output: output.into_owned(),
            }
        })
    }
}

/// Once-per-process store for the embedded launcher.
///
/// A failed load leaves the cell empty, so a later caller may retry with a
/// different factory or installation.
pub struct EmbeddedCache {
    cell: OnceCell<Arc<EmbeddedLauncher>>,
}

impl EmbeddedCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// The cache shared by every verifier in this process.
    pub fn process() -> &'static Self {
        static PROCESS: EmbeddedCache = EmbeddedCache::new();
        &PROCESS
    }

    /// Return the cached launcher, loading it on first use.
    pub async fn get_or_init(
        &self,
        factory: &dyn MavenRuntimeFactory,
        maven_home: Option<&Path>,
        resources: &[PathBuf],
    ) -> Result<Arc<EmbeddedLauncher>, LauncherError> {
        self.cell
            .get_or_try_init(|| async {
                debug!(
                    maven_home = ?maven_home.map(Path::display),
                    "Loading embedded Maven runtime"
                );
                EmbeddedLauncher::load(factory, maven_home, resources).map(Arc::new)
            })
            .await
            .cloned()
    }
}

impl Default for EmbeddedCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct StubRuntime {
        exit_code: i32,
        output: &'static str,
        invocations: Mutex<Vec<Vec<String>>>,
    }

    impl StubRuntime {
        fn new(exit_code: i32, output: &'static str) -> Arc<Self> {
            Arc::new(Self {
                exit_code,
                output,
                invocations: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl MavenRuntime for StubRuntime {
        async fn invoke(
            &self,
            args: &[String],
            _working_dir: Option<&Path>,
        ) -> Result<crate::domain::ports::RuntimeOutcome, LauncherError> {
            self.invocations
                .lock()
                .expect("invocation log poisoned")
                .push(args.to_vec());
            Ok(crate::domain::ports::RuntimeOutcome {
                exit_code: self.exit_code,
                output: self.output.as_bytes().to_vec(),
            })
        }
    }

    struct StubFactory {
        runtime: Arc<StubRuntime>,
        loads: AtomicUsize,
        fail: bool,
    }

    impl StubFactory {
        fn new(runtime: Arc<StubRuntime>) -> Self {
            Self {
                runtime,
                loads: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing(runtime: Arc<StubRuntime>) -> Self {
            Self {
                runtime,
                loads: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    impl MavenRuntimeFactory for StubFactory {
        fn load(
            &self,
            _maven_home: Option<&Path>,
            _resources: &[PathBuf],
        ) -> Result<Arc<dyn MavenRuntime>, LauncherError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LauncherError::RuntimeInit("no runtime classes".to_string()));
            }
            Ok(self.runtime.clone())
        }
    }

    #[tokio::test]
    async fn test_run_writes_log_and_returns_exit_code() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let log_file = dir.path().join("log.txt");
        let runtime = StubRuntime::new(1, "[INFO] BUILD FAILURE\n");
        let launcher = EmbeddedLauncher::new(runtime.clone());

        let request = InvocationRequest::new(&log_file)
            .with_property("skip", "true")
            .with_args(["install"]);
        let exit_code = launcher.run(&request).await.expect("run should succeed");

        assert_eq!(1, exit_code);
        let log = std::fs::read_to_string(&log_file).expect("log should exist");
        assert_eq!("[INFO] BUILD FAILURE\n", log);
        let invocations = runtime.invocations.lock().expect("invocation log poisoned");
        assert_eq!(vec![vec!["-Dskip=true".to_string(), "install".to_string()]], *invocations);
    }

    #[tokio::test]
    async fn test_run_rejects_environment_variables() {
        let runtime = StubRuntime::new(0, "");
        let launcher = EmbeddedLauncher::new(runtime.clone());

        let request = InvocationRequest::new("log.txt").with_env("MAVEN_OPTS", "-Xmx64m");
        let err = launcher.run(&request).await.expect_err("env must be rejected");

        assert!(matches!(err, LauncherError::EnvironmentUnsupported));
        assert!(runtime.invocations.lock().expect("invocation log poisoned").is_empty());
    }

    #[tokio::test]
    async fn test_maven_version() {
        let runtime = StubRuntime::new(0, "Apache Maven 3.9.6 (bc0240f3c744dd6b6ec2920b3cd08dcc295161ae)\nJava version: 17.0.2\n");
        let launcher = EmbeddedLauncher::new(runtime);

        let version = launcher.maven_version().await.expect("version should parse");
        assert_eq!("3.9.6", version);
    }

    #[tokio::test]
    async fn test_maven_version_missing_banner() {
        let runtime = StubRuntime::new(0, "no banner here\n");
        let launcher = EmbeddedLauncher::new(runtime);

        let err = launcher.maven_version().await.expect_err("no version to find");
        assert!(matches!(err, LauncherError::VersionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_cache_loads_once() {
        let cache = EmbeddedCache::new();
        let first = StubFactory::new(StubRuntime::new(0, ""));
        let second = StubFactory::new(StubRuntime::new(0, ""));

        let a = cache
            .get_or_init(&first, Some(Path::new("/opt/maven")), &[])
            .await
            .expect("first load succeeds");
        let b = cache
            .get_or_init(&second, Some(Path::new("/other/maven")), &[])
            .await
            .expect("cached launcher returned");

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(1, first.loads.load(Ordering::SeqCst));
        assert_eq!(0, second.loads.load(Ordering::SeqCst), "Second factory never consulted");
    }

    #[tokio::test]
    async fn test_cache_retries_after_failed_load() {
        let cache = EmbeddedCache::new();
        let broken = StubFactory::failing(StubRuntime::new(0, ""));
        let working = StubFactory::new(StubRuntime::new(0, ""));

        let err = cache
            .get_or_init(&broken, None, &[])
            .await
            .expect_err("broken factory fails");
        assert!(matches!(err, LauncherError::RuntimeInit(_)));

        cache
            .get_or_init(&working, None, &[])
            .await
            .expect("retry succeeds after failure");
        assert_eq!(1, working.loads.load(Ordering::SeqCst));
    }
}
