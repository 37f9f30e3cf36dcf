use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};

use crate::domain::errors::ConfigError;
use crate::domain::models::config::HarnessConfig;

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. mvnverify.yaml in the current directory
    /// 3. Environment variables (MVNVERIFY_* prefix, highest priority)
    ///
    /// Nested fields use `__` in environment variable names, so
    /// `MVNVERIFY_BUILD__AUTOCLEAN=false` overrides `build.autoclean`.
    pub fn load() -> Result<HarnessConfig, ConfigError> {
        let config: HarnessConfig = Figment::new()
            // 1. Start with programmatic defaults
            .merge(Serialized::defaults(HarnessConfig::default()))
            // 2. Merge the project config file
            .merge(Yaml::file("mvnverify.yaml"))
            // 3. Merge environment variables (highest priority)
            .merge(Env::prefixed("MVNVERIFY_").split("__"))
            .extract()?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<HarnessConfig, ConfigError> {
        let config: HarnessConfig = Figment::new()
            .merge(Serialized::defaults(HarnessConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &HarnessConfig) -> Result<(), ConfigError> {
        if config.build.log_file_name.trim().is_empty() {
            return Err(ConfigError::EmptyLogFileName);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::domain::models::config::BuildConfig;
    use crate::domain::models::layout::RepositoryLayout;

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.maven_home, None);
        assert_eq!(config.layout, RepositoryLayout::Default);
        assert_eq!(config.launcher.fork_mode, None);
        assert_eq!(config.launcher.fork_jvm, None);
        assert!(!config.launcher.debug_jvm);
        assert_eq!(config.build.default_cli_arguments, vec!["-e", "--batch-mode"]);
        assert!(config.build.autoclean);
        assert!(!config.build.maven_debug);
        assert!(config.build.use_local_repo_arg);
        assert_eq!(config.build.log_file_name, "log.txt");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
maven_home: /opt/maven
layout: legacy
launcher:
  fork_mode: embedded
  fork_jvm: false
build:
  autoclean: false
  log_file_name: build.log
";

        let config: HarnessConfig = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.maven_home, Some("/opt/maven".into()));
        assert_eq!(config.layout, RepositoryLayout::Legacy);
        assert_eq!(config.launcher.fork_mode.as_deref(), Some("embedded"));
        assert_eq!(config.launcher.fork_jvm, Some(false));
        assert!(!config.build.autoclean);
        assert_eq!(config.build.log_file_name, "build.log");
        // Untouched fields keep their defaults
        assert_eq!(config.build.default_cli_arguments, vec!["-e", "--batch-mode"]);
        assert!(config.build.use_local_repo_arg);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_empty_log_file_name() {
        let config = HarnessConfig {
            build: BuildConfig {
                log_file_name: "   ".to_string(),
                ..BuildConfig::default()
            },
            ..HarnessConfig::default()
        };

        let result = ConfigLoader::validate(&config);
        assert!(matches!(result, Err(ConfigError::EmptyLogFileName)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "local_repo: /tmp/it-repo\nbuild:\n  maven_debug: true")
            .expect("Failed to write config");
        file.flush().expect("Failed to flush config");

        let config = ConfigLoader::load_from_file(file.path()).expect("Config should load");
        assert_eq!(config.local_repo, Some("/tmp/it-repo".into()));
        assert!(config.build.maven_debug);
        assert!(config.build.autoclean, "Defaults persist for absent fields");
    }

    #[test]
    fn test_load_from_file_rejects_unknown_layout() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "layout: flat").expect("Failed to write config");
        file.flush().expect("Failed to flush config");

        let result = ConfigLoader::load_from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Extraction(_))));
    }

    #[test]
    fn test_env_override() {
        let config: HarnessConfig = temp_env::with_vars(
            [
                ("MVNVERIFY_LOCAL_REPO", Some("/tmp/env-repo")),
                ("MVNVERIFY_BUILD__AUTOCLEAN", Some("false")),
                ("MVNVERIFY_LAUNCHER__FORK_MODE", Some("embedded")),
            ],
            || {
                Figment::new()
                    .merge(Serialized::defaults(HarnessConfig::default()))
                    .merge(Env::prefixed("MVNVERIFY_").split("__"))
                    .extract()
                    .expect("Config should extract")
            },
        );

        assert_eq!(config.local_repo, Some("/tmp/env-repo".into()));
        assert!(!config.build.autoclean);
        assert_eq!(config.launcher.fork_mode.as_deref(), Some("embedded"));
    }

    #[test]
    fn test_hierarchical_merging() {
        // Create base config
        let mut base_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(
            base_file,
            "layout: legacy\nbuild:\n  autoclean: false\n  log_file_name: base.log"
        )
        .expect("Failed to write base config");
        base_file.flush().expect("Failed to flush base config");

        // Create override config
        let mut override_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(override_file, "build:\n  log_file_name: override.log")
            .expect("Failed to write override config");
        override_file.flush().expect("Failed to flush override config");

        let config: HarnessConfig = Figment::new()
            .merge(Serialized::defaults(HarnessConfig::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .expect("Config should extract");

        assert_eq!(config.build.log_file_name, "override.log", "Override should win");
        assert!(
            !config.build.autoclean,
            "Base value should persist when not overridden"
        );
        assert_eq!(
            config.layout,
            RepositoryLayout::Legacy,
            "Base value should persist when not overridden"
        );
    }
}
