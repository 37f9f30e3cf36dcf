//! Error taxonomy for the mvnverify harness.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Caller-configuration mistakes. These fail immediately and loudly and are
/// never downgraded or retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown repository layout: {0}. Must be one of: default, legacy")]
    UnknownLayout(String),

    #[error("{0} requires the default repository layout")]
    DefaultLayoutOnly(String),

    #[error(
        "Malformed artifact marker: {0}. Expected groupId:artifactId:version:extension"
    )]
    MalformedArtifactMarker(String),

    #[error("Expectation line has an unterminated artifact marker: {0}")]
    UnterminatedArtifactMarker(String),

    #[error("Log file name cannot be empty")]
    EmptyLogFileName,

    #[error("Invalid file pattern: {0}")]
    InvalidPattern(String),

    #[error("Cannot resolve placeholder ${{{0}}} in settings file")]
    UnresolvedPlaceholder(String),

    #[error("Cannot determine the user home directory")]
    NoHomeDirectory,

    #[error("Environment variables are not supported in embedded mode")]
    EmbeddedWithEnvironment,

    #[error("Cannot read settings file {}", .path.display())]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot parse settings file {}: {reason}", .path.display())]
    SettingsParse { path: PathBuf, reason: String },

    #[error("Settings file contains an empty <localRepository> element: {}", .0.display())]
    EmptyLocalRepository(PathBuf),

    #[error("Workspace root {} cannot be resolved", .path.display())]
    InvalidWorkspace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to extract configuration: {0}")]
    Extraction(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Extraction(err.to_string())
    }
}

/// Failures to start or talk to the build tool.
///
/// A failed launch is reported once and never retried here; the one
/// sanctioned downgrade (embedded to forked) happens in the selection policy
/// before any build runs.
#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("Failed to start `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O failure during launch: {0}")]
    Io(#[from] io::Error),

    #[error("Embedded runtime initialization failed: {0}")]
    RuntimeInit(String),

    #[error("No embedded runtime factory is registered")]
    NoRuntimeFactory,

    #[error("Environment variables are not supported by the embedded launcher")]
    EnvironmentUnsupported,

    #[error("No Maven version in `--version` output:\n{output}")]
    VersionNotFound { output: String },
}

/// Top-level harness error, covering the four failure categories a
/// verification session can produce.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The build tool could not be launched at all.
    #[error("Launch failed: {0}")]
    Launch(#[from] LauncherError),

    /// The build ran to completion but exited non-zero. Carries everything
    /// needed to diagnose the run without re-running it.
    #[error("Exit code was non-zero: {exit_code}; command line and log =\n{command}\n{log}")]
    Build {
        exit_code: i32,
        command: String,
        log: String,
    },

    /// An expected condition about files, archives, or log content did not
    /// hold. Checks are fail-fast: the first failure aborts the remaining
    /// checks of that call, and nothing is rolled back.
    #[error("{reason}")]
    Verification {
        reason: String,
        #[source]
        source: Option<io::Error>,
    },

    /// The caller misconfigured the harness.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl VerifyError {
    /// A verification failure with no underlying I/O cause.
    pub fn verification(reason: impl Into<String>) -> Self {
        Self::Verification {
            reason: reason.into(),
            source: None,
        }
    }

    /// A verification failure wrapping the I/O error that produced it.
    pub fn verification_io(reason: impl Into<String>, source: io::Error) -> Self {
        Self::Verification {
            reason: reason.into(),
            source: Some(source),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type VerifyResult<T> = Result<T, VerifyError>;
