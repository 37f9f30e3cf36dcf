//! Maven user settings: the `<localRepository>` lookup.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::domain::errors::ConfigError;

const PLACEHOLDER_PATTERN: &str = r"\$\{([^}]+)\}";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern compiles"))
}

/// Reads the local repository root from a Maven settings file.
///
/// Returns `Ok(None)` when the file does not exist or carries no
/// `<localRepository>` element. An element that is present but empty is a
/// configuration error, as are placeholders that cannot be resolved.
pub fn local_repository_from(path: &Path) -> Result<Option<PathBuf>, ConfigError> {
    if !path.is_file() {
        debug!(path = %path.display(), "No settings file, skipping local repository lookup");
        return Ok(None);
    }

    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::SettingsRead {
        path: path.to_path_buf(),
        source,
    })?;
    let document = roxmltree::Document::parse(&text).map_err(|err| ConfigError::SettingsParse {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    // Matched by local name so namespaced settings files work too.
    let Some(node) = document
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "localRepository")
    else {
        return Ok(None);
    };

    let raw = node.text().map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Err(ConfigError::EmptyLocalRepository(path.to_path_buf()));
    }

    let resolved = resolve_placeholders(raw)?;
    debug!(path = %path.display(), repository = %resolved, "Resolved local repository from settings");
    Ok(Some(PathBuf::from(resolved)))
}

/// Expands every `${name}` occurrence in the configured value.
fn resolve_placeholders(raw: &str) -> Result<String, ConfigError> {
    let mut resolved = String::with_capacity(raw.len());
    let mut last = 0;
    for caps in placeholder_regex().captures_iter(raw) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        resolved.push_str(&raw[last..whole.start()]);
        resolved.push_str(&resolve_placeholder(name.as_str())?);
        last = whole.end();
    }
    resolved.push_str(&raw[last..]);
    Ok(resolved)
}

/// `${env.NAME}` reads the environment, `${user.home}` reads the home
/// directory, and any other name is tried as an environment variable.
fn resolve_placeholder(name: &str) -> Result<String, ConfigError> {
    if let Some(var) = name.strip_prefix("env.") {
        return env::var(var).map_err(|_| ConfigError::UnresolvedPlaceholder(name.to_string()));
    }
    if name == "user.home" {
        return home::home_dir()
            .map(|dir| dir.display().to_string())
            .ok_or(ConfigError::NoHomeDirectory);
    }
    env::var(name).map_err(|_| ConfigError::UnresolvedPlaceholder(name.to_string()))
}
