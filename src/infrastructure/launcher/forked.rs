//! Forked-process launcher
//!
//! Runs each build in a fresh `mvn` child process with stdout and stderr
//! redirected into the request's log file.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::LauncherError;
use crate::domain::log_scan;
use crate::domain::models::InvocationRequest;
use crate::domain::ports::MavenLauncher;

const MAVEN_HOME_VAR: &str = "M2_HOME";
const TERMINATE_VAR: &str = "MAVEN_TERMINATE_CMD";
/// Stops the EMMA runtime controller from binding a port during version
/// probes.
const VERSION_PROBE_OPTS: (&str, &str) = ("MAVEN_OPTS", "-Demma.rt.control=false");

/// Launcher that forks one Maven process per build.
#[derive(Debug)]
pub struct ForkedLauncher {
    maven_home: Option<PathBuf>,
    executable: PathBuf,
}

impl ForkedLauncher {
    /// Create a launcher for the given installation, without wrapper or
    /// debug scripts.
    pub fn new(maven_home: Option<PathBuf>) -> Self {
        Self::with_options(maven_home, false, false)
    }

    /// Create a launcher, choosing the startup script variant.
    ///
    /// The wrapper script lives in the working directory and takes
    /// precedence over the installation; `debug_jvm` selects the `Debug`
    /// variant of whichever script applies.
    pub fn with_options(maven_home: Option<PathBuf>, debug_jvm: bool, wrapper: bool) -> Self {
        let executable = Self::executable_path(maven_home.as_deref(), debug_jvm, wrapper);
        Self {
            maven_home,
            executable,
        }
    }

    /// The script this launcher will execute.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn executable_path(maven_home: Option<&Path>, debug_jvm: bool, wrapper: bool) -> PathBuf {
        let script = Self::script_name(wrapper, debug_jvm, cfg!(windows));
        if wrapper {
            // Resolved against the build's working directory, never the
            // installation.
            return PathBuf::from(script);
        }
        match maven_home {
            Some(home) => home.join("bin").join(script),
            None => PathBuf::from(script),
        }
    }

    fn script_name(wrapper: bool, debug_jvm: bool, windows: bool) -> String {
        let mut name = String::new();
        if wrapper && !windows {
            name.push_str("./");
        }
        name.push_str(if wrapper { "mvnw" } else { "mvn" });
        if debug_jvm {
            name.push_str("Debug");
        }
        if windows {
            name.push_str(".cmd");
        }
        name
    }
}

#[async_trait]
impl MavenLauncher for ForkedLauncher {
    async fn run(&self, request: &InvocationRequest) -> Result<i32, LauncherError> {
        let log = std::fs::File::create(request.log_file())?;
        let log_err = log.try_clone()?;

        let mut command = Command::new(&self.executable);
        if let Some(home) = &self.maven_home {
            command.env(MAVEN_HOME_VAR, home);
        }
        command.envs(request.environment());
        command.env(TERMINATE_VAR, "on");
        if let Some(dir) = request.working_dir() {
            command.current_dir(dir);
        }
        command
            .args(request.render_args())
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err));

        debug!(
            executable = %self.executable.display(),
            log_file = %request.log_file().display(),
            "Forking build process"
        );

        let status = command
            .status()
            .await
            .map_err(|source| LauncherError::Spawn {
                command: self.executable.display().to_string(),
                source,
            })?;

        Ok(status.code().unwrap_or(-1))
    }

    async fn maven_version(&self) -> Result<String, LauncherError> {
        let scratch = tempfile::Builder::new()
            .prefix("maven")
            .suffix(".log")
            .tempfile()?;

        let request = InvocationRequest::new(scratch.path())
            .with_args(["--version"])
            .with_env(VERSION_PROBE_OPTS.0, VERSION_PROBE_OPTS.1);

        // The probe ignores the exit code; only the banner matters.
        self.run(&request).await?;

        let bytes = std::fs::read(scratch.path())?;
        let output = String::from_utf8_lossy(&bytes);
        log_scan::extract_maven_version(output.lines()).ok_or_else(|| {
            LauncherError::VersionNotFound {
                output: output.into_owned(),
            }
        })
    }
}
