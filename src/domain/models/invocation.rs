//! A single build invocation, assembled by the verifier and consumed by a
//! launcher.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Everything a launcher needs for one build run: arguments, system
/// properties, extra environment, working directory, and where to write the
/// combined output.
///
/// System properties are kept separate from plain arguments so launchers can
/// render them in a stable position, and they preserve insertion order.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    cli_args: Vec<String>,
    system_properties: Vec<(String, String)>,
    environment: HashMap<String, String>,
    working_dir: Option<PathBuf>,
    log_file: PathBuf,
}

impl InvocationRequest {
    pub fn new(log_file: impl Into<PathBuf>) -> Self {
        Self {
            cli_args: Vec::new(),
            system_properties: Vec::new(),
            environment: HashMap::new(),
            working_dir: None,
            log_file: log_file.into(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cli_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.system_properties.push((key.into(), value.into()));
        self
    }

    pub fn with_properties<I, K, V>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.system_properties
            .extend(properties.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn with_env_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.environment.extend(vars);
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn cli_args(&self) -> &[String] {
        &self.cli_args
    }

    pub fn system_properties(&self) -> &[(String, String)] {
        &self.system_properties
    }

    pub fn environment(&self) -> &HashMap<String, String> {
        &self.environment
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// The full command line: one `-Dkey=value` per system property in
    /// insertion order, followed by the plain arguments.
    pub fn render_args(&self) -> Vec<String> {
        let mut rendered = Vec::with_capacity(self.system_properties.len() + self.cli_args.len());
        for (key, value) in &self.system_properties {
            rendered.push(format!("-D{key}={value}"));
        }
        rendered.extend(self.cli_args.iter().cloned());
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_properties_before_args() {
        let request = InvocationRequest::new("log.txt")
            .with_property("skip", "true")
            .with_args(["clean", "install"]);
        assert_eq!(vec!["-Dskip=true", "clean", "install"], request.render_args());
    }

    #[test]
    fn test_render_preserves_property_order() {
        let request = InvocationRequest::new("log.txt")
            .with_property("b", "2")
            .with_property("a", "1");
        assert_eq!(vec!["-Db=2", "-Da=1"], request.render_args());
    }

    #[test]
    fn test_environment_not_rendered() {
        let request = InvocationRequest::new("log.txt")
            .with_env("MAVEN_OPTS", "-Xmx64m")
            .with_args(["validate"]);
        assert_eq!(vec!["validate"], request.render_args());
        assert_eq!(
            Some("-Xmx64m"),
            request.environment().get("MAVEN_OPTS").map(String::as_str)
        );
    }
}
