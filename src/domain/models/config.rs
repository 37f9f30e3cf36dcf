use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::models::layout::RepositoryLayout;

/// Main configuration structure for the harness
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HarnessConfig {
    /// Maven installation to launch; discovered from `M2_HOME` or `~/m2`
    /// when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maven_home: Option<PathBuf>,

    /// User settings file consulted for the local repository location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings_file: Option<PathBuf>,

    /// Local repository root, overriding the settings file and the `~/.m2`
    /// default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_repo: Option<PathBuf>,

    /// Layout of the local repository
    #[serde(default)]
    pub layout: RepositoryLayout,

    /// Launch strategy configuration
    #[serde(default)]
    pub launcher: LauncherConfig,

    /// Build invocation configuration
    #[serde(default)]
    pub build: BuildConfig,

    /// Resources handed to the embedded runtime factory on first load
    #[serde(default)]
    pub runtime_resources: Vec<PathBuf>,
}

/// Launch strategy configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LauncherConfig {
    /// Launch mode: `auto`, `fork`, or `embedded`. Defaults to `fork`
    /// unless no Maven installation was resolved, in which case `auto`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fork_mode: Option<String>,

    /// Hard override: `true` always forks, `false` requires the embedded
    /// runtime and fails when it cannot be initialized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fork_jvm: Option<bool>,

    /// Launch forked builds through the debug variant of the startup script
    #[serde(default)]
    pub debug_jvm: bool,
}

/// Build invocation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BuildConfig {
    /// Arguments placed before everything else on every command line
    #[serde(default = "default_cli_arguments")]
    pub default_cli_arguments: Vec<String>,

    /// Run the clean goal ahead of the requested goals
    #[serde(default = "default_autoclean")]
    pub autoclean: bool,

    /// Pass `--debug` to the build
    #[serde(default)]
    pub maven_debug: bool,

    /// Pin `-Dmaven.repo.local` to the resolved local repository
    #[serde(default = "default_use_local_repo_arg")]
    pub use_local_repo_arg: bool,

    /// Name of the build log file below the workspace directory
    #[serde(default = "default_log_file_name")]
    pub log_file_name: String,
}

fn default_cli_arguments() -> Vec<String> {
    vec!["-e".to_string(), "--batch-mode".to_string()]
}

const fn default_autoclean() -> bool {
    true
}

const fn default_use_local_repo_arg() -> bool {
    true
}

fn default_log_file_name() -> String {
    "log.txt".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            default_cli_arguments: default_cli_arguments(),
            autoclean: default_autoclean(),
            maven_debug: false,
            use_local_repo_arg: default_use_local_repo_arg(),
            log_file_name: default_log_file_name(),
        }
    }
}
