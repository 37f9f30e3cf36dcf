//! Build execution and outcome verification.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{ConfigError, LauncherError, VerifyError, VerifyResult};
use crate::domain::log_scan;
use crate::domain::models::{
    is_metadata_file_name, ArtifactCoordinate, HarnessConfig, InvocationRequest, LocalRepository,
    RepositoryLayout,
};
use crate::domain::ports::{MavenLauncher, MavenRuntimeFactory};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::launcher::{EmbeddedCache, EmbeddedLauncher, ForkedLauncher};
use crate::infrastructure::settings;

/// File listing the artifacts a build is expected to install (or, with a
/// leading `!`, not install).
const EXPECTED_RESULTS_FILE: &str = "expected-results.txt";
const CLEAN_GOAL: &str = "org.apache.maven.plugins:maven-clean-plugin:clean";
const ARTIFACT_MARKER: &str = "${artifact:";
const LOCAL_REPO_PROPERTY: &str = "maven.repo.local";

/// How the next build will be launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LaunchMode {
    Forked,
    Embedded,
}

/// One verification session against a project workspace.
///
/// Coordinates launch strategy selection, build execution, and verification
/// of build outcomes against the local repository and the build log.
///
/// # Examples
///
/// ```no_run
/// use mvnverify::services::Verifier;
///
/// # async fn example() -> mvnverify::domain::VerifyResult<()> {
/// let verifier = Verifier::new("/path/to/project")?;
/// verifier.execute_goal("install").await?;
/// verifier.verify(true)?;
/// # Ok(())
/// # }
/// ```
pub struct Verifier {
    basedir: PathBuf,
    config: HarnessConfig,
    local_repo: LocalRepository,
    maven_home: Option<PathBuf>,
    use_wrapper: bool,
    fork_mode: String,
    cli_arguments: Vec<String>,
    system_properties: Vec<(String, String)>,
    environment: HashMap<String, String>,
    embedded_cache: &'static EmbeddedCache,
    runtime_factory: Option<Arc<dyn MavenRuntimeFactory>>,
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("basedir", &self.basedir)
            .field("config", &self.config)
            .field("local_repo", &self.local_repo)
            .field("maven_home", &self.maven_home)
            .field("use_wrapper", &self.use_wrapper)
            .field("fork_mode", &self.fork_mode)
            .field("cli_arguments", &self.cli_arguments)
            .field("system_properties", &self.system_properties)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

impl Verifier {
    /// Create a verifier for the given workspace, loading configuration
    /// from the usual sources.
    pub fn new(basedir: impl Into<PathBuf>) -> VerifyResult<Self> {
        Self::with_config(basedir, ConfigLoader::load()?)
    }

    /// Create a verifier with an explicit configuration.
    ///
    /// Resolves the Maven installation, the wrapper, the launch mode
    /// default, and the local repository root. The repository root directory
    /// is created eagerly; a failure to create it is only logged, matching
    /// the behavior of builds that create it on demand.
    pub fn with_config(basedir: impl Into<PathBuf>, config: HarnessConfig) -> VerifyResult<Self> {
        ConfigLoader::validate(&config)?;

        let basedir = basedir.into();
        let basedir =
            std::path::absolute(&basedir).map_err(|source| ConfigError::InvalidWorkspace {
                path: basedir.clone(),
                source,
            })?;

        let maven_home = resolve_maven_home(&config);
        let use_wrapper = config.maven_home.is_none() && basedir.join("mvnw").exists();
        let fork_mode = config.launcher.fork_mode.clone().unwrap_or_else(|| {
            if maven_home.is_none() { "auto" } else { "fork" }.to_string()
        });

        let root = resolve_repository_root(&config)?;
        let root = std::path::absolute(&root).unwrap_or(root);
        if let Err(err) = std::fs::create_dir_all(&root) {
            debug!(path = %root.display(), error = %err, "Could not create local repository root");
        }
        let local_repo = LocalRepository::new(root, config.layout);

        debug!(
            basedir = %basedir.display(),
            maven_home = ?maven_home,
            fork_mode = %fork_mode,
            use_wrapper,
            repository = %local_repo.root().display(),
            "Verifier ready"
        );

        Ok(Self {
            basedir,
            local_repo,
            maven_home,
            use_wrapper,
            fork_mode,
            cli_arguments: Vec::new(),
            system_properties: Vec::new(),
            environment: HashMap::new(),
            embedded_cache: EmbeddedCache::process(),
            runtime_factory: None,
            config,
        })
    }

    /// Replace the process-wide embedded cache with a caller-owned one.
    #[must_use]
    pub fn with_embedded_cache(mut self, cache: &'static EmbeddedCache) -> Self {
        self.embedded_cache = cache;
        self
    }

    // ------------------------------------------------------------------
    // Build execution
    // ------------------------------------------------------------------

    /// Run a build with the accumulated arguments and no extra goals.
    pub async fn execute(&self) -> VerifyResult<()> {
        self.run_build(Vec::new()).await
    }

    /// Run a build for a single goal.
    pub async fn execute_goal(&self, goal: &str) -> VerifyResult<()> {
        self.run_build(vec![goal.to_string()]).await
    }

    /// Run a build for the given goals.
    pub async fn execute_goals<I, S>(&self, goals: I) -> VerifyResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_build(goals.into_iter().map(Into::into).collect())
            .await
    }

    /// Query the version of the Maven that would run the build.
    pub async fn maven_version(&self) -> VerifyResult<String> {
        let launcher = self.select_launcher(true).await?;
        Ok(launcher.maven_version().await?)
    }

    #[instrument(skip(self), fields(basedir = %self.basedir.display()), err)]
    async fn run_build(&self, goals: Vec<String>) -> VerifyResult<()> {
        let request = InvocationRequest::new(self.log_file())
            .with_properties(self.system_properties.iter().cloned())
            .with_args(self.assemble_args(&goals))
            .with_env_vars(self.environment.clone())
            .with_working_dir(self.basedir.clone());

        let launcher = self.select_launcher(self.environment.is_empty()).await?;
        info!(log_file = %self.log_file().display(), "Executing build");
        let exit_code = launcher.run(&request).await?;
        debug!(exit_code, "Build finished");

        if exit_code != 0 {
            return Err(self.build_failure(exit_code, &request));
        }
        Ok(())
    }

    /// The full argument list for one build, in launch order: defaults,
    /// debug flag, repository pin, clean goal, caller arguments, goals.
    fn assemble_args(&self, goals: &[String]) -> Vec<String> {
        let mut args = self.config.build.default_cli_arguments.clone();
        if self.config.build.maven_debug {
            args.push("--debug".to_string());
        }
        if self.config.build.use_local_repo_arg {
            args.push(format!(
                "-D{}={}",
                LOCAL_REPO_PROPERTY,
                self.local_repo.root().display()
            ));
        }
        if self.config.build.autoclean {
            args.push(CLEAN_GOAL.to_string());
        }
        let basedir = self.basedir.display().to_string();
        for arg in &self.cli_arguments {
            args.push(arg.replace("${basedir}", &basedir));
        }
        args.extend(goals.iter().cloned());
        args
    }

    fn build_failure(&self, exit_code: i32, request: &InvocationRequest) -> VerifyError {
        let mut command = self.maven_executable().display().to_string();
        for arg in request.render_args() {
            command.push(' ');
            command.push_str(&arg);
        }
        let log = match std::fs::read(request.log_file()) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => format!("(log file unreadable: {err})"),
        };
        VerifyError::Build {
            exit_code,
            command,
            log,
        }
    }

    /// The script a forked build would execute, used for diagnostics even
    /// when the build ran embedded.
    fn maven_executable(&self) -> PathBuf {
        ForkedLauncher::with_options(
            self.maven_home.clone(),
            self.config.launcher.debug_jvm,
            self.use_wrapper,
        )
        .executable()
        .to_path_buf()
    }

    // ------------------------------------------------------------------
    // Launch strategy selection
    // ------------------------------------------------------------------

    /// Decide how to launch, in strict precedence order:
    /// 1. A wrapper script always forks.
    /// 2. An explicit `fork_jvm` setting is obeyed unconditionally.
    /// 3. `auto` with no caller environment, and `embedded`, try the
    ///    embedded runtime and quietly fall back to forking when it cannot
    ///    be initialized.
    /// 4. Everything else forks.
    async fn launch_mode(&self, env_empty: bool) -> LaunchMode {
        if self.use_wrapper {
            return LaunchMode::Forked;
        }
        if let Some(fork) = self.config.launcher.fork_jvm {
            return if fork {
                LaunchMode::Forked
            } else {
                LaunchMode::Embedded
            };
        }
        if (env_empty && self.fork_mode == "auto") || self.fork_mode == "embedded" {
            match self.embedded_launcher().await {
                Ok(_) => return LaunchMode::Embedded,
                Err(err) => {
                    debug!(error = %err, "Embedded runtime unavailable, falling back to forked launcher");
                    return LaunchMode::Forked;
                }
            }
        }
        LaunchMode::Forked
    }

    async fn select_launcher(&self, env_empty: bool) -> VerifyResult<Arc<dyn MavenLauncher>> {
        match self.launch_mode(env_empty).await {
            LaunchMode::Forked => {
                let launcher: Arc<dyn MavenLauncher> = Arc::new(ForkedLauncher::with_options(
                    self.maven_home.clone(),
                    self.config.launcher.debug_jvm,
                    self.use_wrapper,
                ));
                Ok(launcher)
            }
            LaunchMode::Embedded => {
                if !env_empty {
                    return Err(ConfigError::EmbeddedWithEnvironment.into());
                }
                let launcher: Arc<dyn MavenLauncher> = self.embedded_launcher().await?;
                Ok(launcher)
            }
        }
    }

    async fn embedded_launcher(&self) -> Result<Arc<EmbeddedLauncher>, LauncherError> {
        let factory = self
            .runtime_factory
            .as_deref()
            .ok_or(LauncherError::NoRuntimeFactory)?;
        self.embedded_cache
            .get_or_init(
                factory,
                self.maven_home.as_deref(),
                &self.config.runtime_resources,
            )
            .await
    }

    // ------------------------------------------------------------------
    // Verification
    // ------------------------------------------------------------------

    /// Check every expectation in `expected-results.txt`, then optionally
    /// scan the build log for error lines.
    ///
    /// Checks are fail-fast: the first violation aborts the rest.
    #[instrument(skip(self), err)]
    pub fn verify(&self, check_error_free_log: bool) -> VerifyResult<()> {
        let expectations = self.load_expectation_lines(EXPECTED_RESULTS_FILE, false)?;
        for expectation in &expectations {
            self.verify_expectation(expectation)?;
        }
        if check_error_free_log {
            self.verify_error_free_log()?;
        }
        Ok(())
    }

    fn verify_expectation(&self, line: &str) -> VerifyResult<()> {
        match line.strip_prefix('!') {
            Some(rest) => self.verify_file_presence(rest, false),
            None => self.verify_file_presence(line, true),
        }
    }

    /// Assert that a file, glob, or archive entry exists.
    pub fn verify_file_present(&self, file_path: &str) -> VerifyResult<()> {
        self.verify_file_presence(file_path, true)
    }

    /// Assert that a file, glob, or archive entry does not exist.
    pub fn verify_file_not_present(&self, file_path: &str) -> VerifyResult<()> {
        self.verify_file_presence(file_path, false)
    }

    /// The shared presence check behind expectations and the public
    /// assertions.
    ///
    /// Three forms are recognized: `archive!/entry` probes inside an
    /// archive, a path containing `*` matches entry names in the parent
    /// directory, and anything else is a plain existence check. Relative
    /// paths resolve against the workspace.
    fn verify_file_presence(&self, file_path: &str, wanted: bool) -> VerifyResult<()> {
        if let Some(index) = file_path.find("!/").filter(|index| *index > 0) {
            let archive = self.resolve_path(&file_path[..index]);
            let entry = &file_path[index + 2..];
            let found = match archive_entry_exists(&archive, entry) {
                Ok(found) => found,
                Err(err) if wanted => {
                    return Err(VerifyError::verification_io(
                        format!("Error looking for archive entry: {file_path}"),
                        err,
                    ));
                }
                // An unreadable archive cannot contain the entry, which is
                // exactly what an absence check wants.
                Err(_) => false,
            };
            if found != wanted {
                return Err(presence_failure("archive entry", wanted, file_path));
            }
        } else if file_path.contains('*') {
            let resolved = self.resolve_path(file_path);
            let parent = resolved.parent().map(Path::to_path_buf).unwrap_or_default();
            if !parent.is_dir() {
                return if wanted {
                    Err(presence_failure("file pattern", true, file_path))
                } else {
                    Ok(())
                };
            }
            let name_pattern = resolved
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .replace('*', ".*");
            let regex = Regex::new(&format!(r"\A(?:{name_pattern})\z"))
                .map_err(|_| ConfigError::InvalidPattern(file_path.to_string()))?;
            let found = directory_entry_matches(&parent, &regex);
            if found != wanted {
                return Err(presence_failure("file pattern", wanted, file_path));
            }
        } else {
            let found = self.resolve_path(file_path).exists();
            if found != wanted {
                return Err(presence_failure("file", wanted, file_path));
            }
        }
        Ok(())
    }

    /// Assert that the artifact and its sibling metadata files exist.
    pub fn verify_artifact_present(&self, coordinate: &ArtifactCoordinate) -> VerifyResult<()> {
        self.verify_artifact_presence(coordinate, true)
    }

    /// Assert that neither the artifact nor its sibling metadata files
    /// exist.
    pub fn verify_artifact_not_present(&self, coordinate: &ArtifactCoordinate) -> VerifyResult<()> {
        self.verify_artifact_presence(coordinate, false)
    }

    fn verify_artifact_presence(
        &self,
        coordinate: &ArtifactCoordinate,
        wanted: bool,
    ) -> VerifyResult<()> {
        for path in self.artifact_paths(coordinate) {
            self.verify_file_presence(&path, wanted)?;
        }
        Ok(())
    }

    /// Assert that the installed artifact's content equals `content`
    /// exactly.
    pub fn verify_artifact_content(
        &self,
        coordinate: &ArtifactCoordinate,
        content: &str,
    ) -> VerifyResult<()> {
        let path = self.local_repo.artifact_path(coordinate);
        let actual = std::fs::read_to_string(&path).map_err(|err| {
            VerifyError::verification_io(format!("Cannot read {}", path.display()), err)
        })?;
        if actual != content {
            return Err(VerifyError::verification(format!(
                "Content of {} does not match {content}",
                path.display()
            )));
        }
        Ok(())
    }

    /// Assert that a file's entire content matches the given pattern.
    pub fn verify_file_content_matches(&self, file_path: &str, pattern: &str) -> VerifyResult<()> {
        let path = self.resolve_path(file_path);
        let content = std::fs::read_to_string(&path).map_err(|err| {
            VerifyError::verification_io(format!("Cannot read {}", path.display()), err)
        })?;
        let regex = Regex::new(&format!(r"\A(?:{pattern})\z"))
            .map_err(|_| ConfigError::InvalidPattern(pattern.to_string()))?;
        if !regex.is_match(&content) {
            return Err(VerifyError::verification(format!(
                "Content of {} does not match {pattern}",
                path.display()
            )));
        }
        Ok(())
    }

    /// Scan the build log for error lines, ignoring the known Velocity
    /// false positives.
    pub fn verify_error_free_log(&self) -> VerifyResult<()> {
        for line in self.load_lines(&self.config.build.log_file_name)? {
            if log_scan::is_build_error(&line) {
                warn!(line = %line, "Error in build log");
                return Err(VerifyError::verification(format!("Error in execution: {line}")));
            }
        }
        Ok(())
    }

    /// Assert that some log line contains `text` after ANSI stripping.
    pub fn verify_text_in_log(&self, text: &str) -> VerifyResult<()> {
        let found = self
            .load_lines(&self.config.build.log_file_name)?
            .iter()
            .any(|line| log_scan::strip_ansi(line).contains(text));
        if !found {
            return Err(VerifyError::verification(format!("Text not found in log: {text}")));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Expectation files and artifact paths
    // ------------------------------------------------------------------

    /// Load a text file below the workspace as trimmed lines, dropping
    /// blanks and `#` comments. A missing file yields no lines.
    pub fn load_lines(&self, name: &str) -> VerifyResult<Vec<String>> {
        let path = self.resolve_path(name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let bytes = std::fs::read(&path).map_err(|err| {
            VerifyError::verification_io(format!("Cannot read {}", path.display()), err)
        })?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(ToString::to_string)
            .collect())
    }

    /// Load an expectations file, expanding artifact markers.
    ///
    /// When `has_command` is set, each line is a `command path` pair and the
    /// command prefix is carried onto generated metadata lines.
    pub fn load_expectation_lines(
        &self,
        name: &str,
        has_command: bool,
    ) -> VerifyResult<Vec<String>> {
        let mut expanded = Vec::new();
        for line in self.load_lines(name)? {
            self.expand_expectation_line(&line, has_command, &mut expanded)?;
        }
        Ok(expanded)
    }

    /// Expand the first `${artifact:g:a:v:e}` marker on a line into the
    /// repository path, then append expectations for every metadata file in
    /// the artifact's directory and its parent.
    fn expand_expectation_line(
        &self,
        line: &str,
        has_command: bool,
        out: &mut Vec<String>,
    ) -> VerifyResult<()> {
        let Some(start) = line.find(ARTIFACT_MARKER) else {
            out.push(line.to_string());
            return Ok(());
        };
        let Some(end) = line[start..].find('}').map(|offset| start + offset) else {
            return Err(ConfigError::UnterminatedArtifactMarker(line.to_string()).into());
        };
        let coordinate = ArtifactCoordinate::parse(&line[start + ARTIFACT_MARKER.len()..end])?;
        let artifact_path = self.local_repo.artifact_path(&coordinate);
        let expanded = format!(
            "{}{}{}",
            &line[..start],
            artifact_path.display(),
            &line[end + 1..]
        );

        let (command, filespec) = if has_command {
            match expanded.split_once(' ') {
                Some((command, filespec)) => (Some(command.to_string()), filespec.to_string()),
                None => (None, expanded.clone()),
            }
        } else {
            (None, expanded.clone())
        };
        out.push(expanded);

        let filespec = PathBuf::from(filespec);
        if let Some(dir) = filespec.parent() {
            push_metadata_expectations(dir, command.as_deref(), out);
            if let Some(grandparent) = dir.parent() {
                push_metadata_expectations(grandparent, command.as_deref(), out);
            }
        }
        Ok(())
    }

    /// The repository paths an installed artifact accounts for: the
    /// artifact file plus every metadata file currently beside it and one
    /// level up.
    pub fn artifact_paths(&self, coordinate: &ArtifactCoordinate) -> Vec<String> {
        let artifact_path = self.local_repo.artifact_path(coordinate);
        let mut paths = vec![artifact_path.display().to_string()];
        if let Some(dir) = artifact_path.parent() {
            push_metadata_expectations(dir, None, &mut paths);
            if let Some(grandparent) = dir.parent() {
                push_metadata_expectations(grandparent, None, &mut paths);
            }
        }
        paths
    }

    // ------------------------------------------------------------------
    // Repository and workspace maintenance
    // ------------------------------------------------------------------

    /// Delete an installed artifact and its sibling metadata files.
    /// Missing files are ignored.
    pub fn delete_artifact(&self, coordinate: &ArtifactCoordinate) -> VerifyResult<()> {
        for path in self.artifact_paths(coordinate) {
            let path = PathBuf::from(path);
            if !path.exists() {
                continue;
            }
            std::fs::remove_file(&path).map_err(|err| {
                VerifyError::verification_io(format!("Cannot delete {}", path.display()), err)
            })?;
        }
        Ok(())
    }

    /// Delete every artifact below a group id.
    pub fn delete_artifacts(&self, group_id: &str) -> VerifyResult<()> {
        remove_dir_all_if_present(&self.local_repo.artifact_directory(group_id, None))
    }

    /// Delete one version directory of an artifact. Version directories
    /// only exist under the default layout.
    pub fn delete_artifact_version(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: &str,
    ) -> VerifyResult<()> {
        if self.local_repo.layout() != RepositoryLayout::Default {
            return Err(
                ConfigError::DefaultLayoutOnly("Deleting artifact versions".to_string()).into(),
            );
        }
        let mut dir = self.local_repo.artifact_directory(group_id, Some(artifact_id));
        dir.push(version);
        remove_dir_all_if_present(&dir)
    }

    /// Delete a directory below the workspace. Missing directories are
    /// ignored.
    pub fn delete_directory(&self, path: &str) -> VerifyResult<()> {
        remove_dir_all_if_present(&self.basedir.join(path))
    }

    /// Write a file below the workspace, creating parent directories.
    pub fn write_file(&self, path: &str, content: &str) -> VerifyResult<()> {
        let target = self.basedir.join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                VerifyError::verification_io(format!("Cannot create {}", parent.display()), err)
            })?;
        }
        std::fs::write(&target, content).map_err(|err| {
            VerifyError::verification_io(format!("Cannot write {}", target.display()), err)
        })
    }

    /// Copy a workspace file to a new location, replacing every occurrence
    /// of each token. Returns the destination path.
    pub fn filter_file(
        &self,
        src: &str,
        dst: &str,
        replacements: &HashMap<String, String>,
    ) -> VerifyResult<PathBuf> {
        let src_path = self.basedir.join(src);
        let mut data = std::fs::read_to_string(&src_path).map_err(|err| {
            VerifyError::verification_io(format!("Cannot read {}", src_path.display()), err)
        })?;
        for (token, value) in replacements {
            data = data.replace(token.as_str(), value);
        }
        let dst_path = self.basedir.join(dst);
        if let Some(parent) = dst_path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                VerifyError::verification_io(format!("Cannot create {}", parent.display()), err)
            })?;
        }
        std::fs::write(&dst_path, data).map_err(|err| {
            VerifyError::verification_io(format!("Cannot write {}", dst_path.display()), err)
        })?;
        Ok(dst_path)
    }

    /// The standard filter tokens: `@basedir@` and a `file://` form
    /// `@baseurl@`.
    pub fn default_filter_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        let basedir = self.basedir.display().to_string().replace('\\', "/");
        let baseurl = if basedir.starts_with('/') {
            format!("file://{basedir}")
        } else {
            format!("file:///{basedir}")
        };
        map.insert("@basedir@".to_string(), basedir);
        map.insert("@baseurl@".to_string(), baseurl);
        map
    }

    // ------------------------------------------------------------------
    // Session mutation and accessors
    // ------------------------------------------------------------------

    /// Add one argument to every subsequent build. `${basedir}` expands to
    /// the workspace path at launch time.
    pub fn add_cli_argument(&mut self, arg: impl Into<String>) {
        self.cli_arguments.push(arg.into());
    }

    /// Add several arguments to every subsequent build.
    pub fn add_cli_arguments<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cli_arguments.extend(args.into_iter().map(Into::into));
    }

    /// Set a system property for every subsequent build. Re-setting a key
    /// updates it in place, keeping its original position.
    pub fn set_system_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.system_properties.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.system_properties.push((key, value)),
        }
    }

    /// Set an environment variable for every subsequent build. A non-empty
    /// environment rules out the embedded launcher.
    pub fn set_environment_variable(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.environment.insert(key.into(), value.into());
    }

    /// Toggle the clean goal that precedes every build.
    pub fn set_autoclean(&mut self, autoclean: bool) {
        self.config.build.autoclean = autoclean;
    }

    /// Toggle `--debug` output for every subsequent build.
    pub fn set_maven_debug(&mut self, maven_debug: bool) {
        self.config.build.maven_debug = maven_debug;
    }

    /// Force the launch decision, overriding mode-based selection.
    pub fn set_fork_jvm(&mut self, fork_jvm: bool) {
        self.config.launcher.fork_jvm = Some(fork_jvm);
    }

    /// Rename the build log file. Blank names are rejected.
    pub fn set_log_file_name(&mut self, name: impl Into<String>) -> VerifyResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyLogFileName.into());
        }
        self.config.build.log_file_name = name;
        Ok(())
    }

    /// Point the session at a different local repository root, keeping the
    /// layout.
    pub fn set_local_repository(&mut self, root: impl Into<PathBuf>) {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        if let Err(err) = std::fs::create_dir_all(&root) {
            debug!(path = %root.display(), error = %err, "Could not create local repository root");
        }
        self.local_repo = LocalRepository::new(root, self.local_repo.layout());
    }

    /// Switch the repository layout by name.
    pub fn set_repository_layout(&mut self, layout: &str) -> VerifyResult<()> {
        let layout = RepositoryLayout::parse(layout)?;
        self.config.layout = layout;
        self.local_repo = LocalRepository::new(self.local_repo.root().to_path_buf(), layout);
        Ok(())
    }

    /// Register the factory that loads the embedded runtime.
    pub fn set_runtime_factory(&mut self, factory: Arc<dyn MavenRuntimeFactory>) {
        self.runtime_factory = Some(factory);
    }

    /// The absolute workspace directory.
    pub fn basedir(&self) -> &Path {
        &self.basedir
    }

    /// The local repository this session verifies against.
    pub fn local_repository(&self) -> &LocalRepository {
        &self.local_repo
    }

    /// The resolved Maven installation, if any.
    pub fn maven_home(&self) -> Option<&Path> {
        self.maven_home.as_deref()
    }

    /// The accumulated caller arguments.
    pub fn cli_arguments(&self) -> &[String] {
        &self.cli_arguments
    }

    /// The accumulated system properties, in insertion order.
    pub fn system_properties(&self) -> &[(String, String)] {
        &self.system_properties
    }

    /// The build log file name.
    pub fn log_file_name(&self) -> &str {
        &self.config.build.log_file_name
    }

    /// The build log path below the workspace.
    pub fn log_file(&self) -> PathBuf {
        self.basedir.join(&self.config.build.log_file_name)
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.has_root() {
            candidate.to_path_buf()
        } else {
            self.basedir.join(candidate)
        }
    }
}

/// The Maven installation for a session: explicit configuration, then the
/// `M2_HOME` environment variable, then a conventional `~/m2` installation.
fn resolve_maven_home(config: &HarnessConfig) -> Option<PathBuf> {
    if let Some(home) = &config.maven_home {
        return Some(home.clone());
    }
    if let Ok(home) = std::env::var("M2_HOME") {
        if !home.is_empty() {
            return Some(PathBuf::from(home));
        }
    }
    if let Some(user_home) = home::home_dir() {
        let candidate = user_home.join("m2");
        if candidate.join("bin").join("mvn").is_file() {
            return Some(candidate);
        }
    }
    None
}

/// The local repository root: explicit configuration, then the settings
/// file, then `~/.m2/repository`.
fn resolve_repository_root(config: &HarnessConfig) -> Result<PathBuf, ConfigError> {
    if let Some(repo) = &config.local_repo {
        return Ok(repo.clone());
    }
    if let Some(settings_path) = &config.settings_file {
        if let Some(repo) = settings::local_repository_from(settings_path)? {
            return Ok(repo);
        }
    }
    home::home_dir()
        .map(|user_home| user_home.join(".m2").join("repository"))
        .ok_or(ConfigError::NoHomeDirectory)
}

fn presence_failure(kind: &str, wanted: bool, description: &str) -> VerifyError {
    if wanted {
        VerifyError::verification(format!("Expected {kind} was not found: {description}"))
    } else {
        VerifyError::verification(format!("Unwanted {kind} was found: {description}"))
    }
}

fn archive_entry_exists(archive: &Path, entry: &str) -> io::Result<bool> {
    let file = std::fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file).map_err(io::Error::other)?;
    let exists = match zip.by_name(entry) {
        Ok(_) => Ok(true),
        Err(zip::result::ZipError::FileNotFound) => Ok(false),
        Err(err) => Err(io::Error::other(err)),
    };
    exists
}

fn directory_entry_matches(dir: &Path, regex: &Regex) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    for entry in entries.flatten() {
        if let Some(name) = entry.file_name().to_str() {
            if regex.is_match(name) {
                return true;
            }
        }
    }
    false
}

/// Append an expectation for every metadata file in `dir`, carrying the
/// optional command prefix of the originating line.
fn push_metadata_expectations(dir: &Path, command: Option<&str>, out: &mut Vec<String>) {
    if !dir.is_dir() {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !is_metadata_file_name(name) {
            continue;
        }
        let path = dir.join(name);
        match command {
            Some(command) => out.push(format!("{command} {}", path.display())),
            None => out.push(path.display().to_string()),
        }
    }
}

fn remove_dir_all_if_present(dir: &Path) -> VerifyResult<()> {
    if !dir.exists() {
        return Ok(());
    }
    std::fs::remove_dir_all(dir).map_err(|err| {
        VerifyError::verification_io(format!("Cannot delete {}", dir.display()), err)
    })
}
