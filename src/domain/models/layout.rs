//! Local repository layouts and path arithmetic.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::errors::ConfigError;
use crate::domain::models::coordinate::ArtifactCoordinate;

const METADATA_PREFIX: &str = "maven-metadata";
const METADATA_SUFFIX: &str = ".xml";
const LOCAL_METADATA_FILE: &str = "maven-metadata-local.xml";

/// How artifacts are arranged below the local repository root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryLayout {
    /// `group/id/as/dirs/artifactId/version/artifactId-version.ext`
    #[default]
    Default,
    /// `group.id/exts/artifactId-version.ext`
    Legacy,
}

impl RepositoryLayout {
    /// Parses a layout name. Anything other than `default` or `legacy` is
    /// rejected.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::Default),
            "legacy" => Ok(Self::Legacy),
            other => Err(ConfigError::UnknownLayout(other.to_string())),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Legacy => "legacy",
        }
    }
}

/// Whether a directory entry name is a repository metadata file.
pub fn is_metadata_file_name(name: &str) -> bool {
    name.starts_with(METADATA_PREFIX) && name.ends_with(METADATA_SUFFIX)
}

/// A local artifact repository: a root directory plus the layout that maps
/// coordinates to paths beneath it.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
    layout: RepositoryLayout,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>, layout: RepositoryLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    pub const fn layout(&self) -> RepositoryLayout {
        self.layout
    }

    /// The path of an artifact file under this repository.
    ///
    /// The legacy layout keeps the group id as one directory segment, groups
    /// files by extension, and ignores classifiers.
    pub fn artifact_path(&self, coordinate: &ArtifactCoordinate) -> PathBuf {
        let mut path = self.root.clone();
        match self.layout {
            RepositoryLayout::Default => {
                for segment in coordinate.group_id().split('.') {
                    path.push(segment);
                }
                path.push(coordinate.artifact_id());
                path.push(coordinate.version());
                path.push(coordinate.file_name());
            }
            RepositoryLayout::Legacy => {
                path.push(coordinate.group_id());
                path.push(format!("{}s", coordinate.extension()));
                path.push(format!(
                    "{}-{}.{}",
                    coordinate.artifact_id(),
                    coordinate.version(),
                    coordinate.extension()
                ));
            }
        }
        path
    }

    /// The directory holding every version of an artifact, or the group
    /// directory when `artifact_id` is absent.
    pub fn artifact_directory(&self, group_id: &str, artifact_id: Option<&str>) -> PathBuf {
        let mut path = self.root.clone();
        match self.layout {
            RepositoryLayout::Default => {
                for segment in group_id.split('.') {
                    path.push(segment);
                }
            }
            RepositoryLayout::Legacy => path.push(group_id),
        }
        if let Some(artifact_id) = artifact_id {
            path.push(artifact_id);
        }
        path
    }

    /// The path of a metadata file at group, artifact, or version level.
    ///
    /// Metadata lives at fixed spots of the default layout only.
    pub fn metadata_path(
        &self,
        group_id: &str,
        artifact_id: Option<&str>,
        version: Option<&str>,
        file_name: &str,
    ) -> Result<PathBuf, ConfigError> {
        if self.layout == RepositoryLayout::Legacy {
            return Err(ConfigError::DefaultLayoutOnly(
                "Metadata path resolution".to_string(),
            ));
        }
        let mut path = self.root.clone();
        for segment in group_id.split('.') {
            path.push(segment);
        }
        if let Some(artifact_id) = artifact_id {
            path.push(artifact_id);
        }
        if let Some(version) = version {
            path.push(version);
        }
        path.push(file_name);
        Ok(path)
    }

    /// The path of the locally generated metadata file
    /// (`maven-metadata-local.xml`) at the given level.
    pub fn local_metadata_path(
        &self,
        group_id: &str,
        artifact_id: Option<&str>,
        version: Option<&str>,
    ) -> Result<PathBuf, ConfigError> {
        self.metadata_path(group_id, artifact_id, version, LOCAL_METADATA_FILE)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn repo(layout: RepositoryLayout) -> LocalRepository {
        LocalRepository::new("/repo", layout)
    }

    #[test]
    fn test_parse_layout() {
        assert_eq!(
            RepositoryLayout::Default,
            RepositoryLayout::parse("default").expect("valid layout")
        );
        assert_eq!(
            RepositoryLayout::Legacy,
            RepositoryLayout::parse("legacy").expect("valid layout")
        );
        assert!(matches!(
            RepositoryLayout::parse("flat"),
            Err(ConfigError::UnknownLayout(_))
        ));
    }

    #[test]
    fn test_default_artifact_path() {
        let coordinate = ArtifactCoordinate::new("org.apache.maven.its", "core-it", "1.0", "jar");
        assert_eq!(
            Path::new("/repo/org/apache/maven/its/core-it/1.0/core-it-1.0.jar"),
            repo(RepositoryLayout::Default).artifact_path(&coordinate)
        );
    }

    #[test]
    fn test_default_artifact_path_with_classifier() {
        let coordinate = ArtifactCoordinate::with_classifier(
            "org.apache.maven.its",
            "core-it",
            "1.0",
            "jar",
            Some("sources"),
        );
        assert_eq!(
            Path::new("/repo/org/apache/maven/its/core-it/1.0/core-it-1.0-sources.jar"),
            repo(RepositoryLayout::Default).artifact_path(&coordinate)
        );
    }

    #[test]
    fn test_legacy_artifact_path() {
        let coordinate = ArtifactCoordinate::new("org.apache.maven.its", "core-it", "1.0", "jar");
        assert_eq!(
            Path::new("/repo/org.apache.maven.its/jars/core-it-1.0.jar"),
            repo(RepositoryLayout::Legacy).artifact_path(&coordinate)
        );
    }

    #[test]
    fn test_legacy_artifact_path_ignores_classifier() {
        let coordinate = ArtifactCoordinate::with_classifier(
            "org.apache.maven.its",
            "core-it",
            "1.0",
            "war",
            Some("sources"),
        );
        assert_eq!(
            Path::new("/repo/org.apache.maven.its/wars/core-it-1.0.war"),
            repo(RepositoryLayout::Legacy).artifact_path(&coordinate)
        );
    }

    #[test]
    fn test_legacy_path_after_alias_rewrite() {
        // The alias applies before layout arithmetic, so the legacy path
        // uses the rewritten extension.
        let coordinate =
            ArtifactCoordinate::new("org.apache.maven.its", "core-it-plugin", "1.0", "maven-plugin");
        assert_eq!(
            Path::new("/repo/org.apache.maven.its/jars/core-it-plugin-1.0.jar"),
            repo(RepositoryLayout::Legacy).artifact_path(&coordinate)
        );
    }

    #[test]
    fn test_metadata_path_levels() {
        let repo = repo(RepositoryLayout::Default);
        assert_eq!(
            Path::new("/repo/org/apache/maven/its/core-it/1.0/maven-metadata-local.xml"),
            repo.local_metadata_path("org.apache.maven.its", Some("core-it"), Some("1.0"))
                .expect("default layout")
        );
        assert_eq!(
            Path::new("/repo/org/apache/maven/its/core-it/maven-metadata-local.xml"),
            repo.local_metadata_path("org.apache.maven.its", Some("core-it"), None)
                .expect("default layout")
        );
        assert_eq!(
            Path::new("/repo/org/apache/maven/its/maven-metadata.xml"),
            repo.metadata_path("org.apache.maven.its", None, None, "maven-metadata.xml")
                .expect("default layout")
        );
    }

    #[test]
    fn test_metadata_path_rejects_legacy_layout() {
        assert!(matches!(
            repo(RepositoryLayout::Legacy).local_metadata_path("org", Some("a"), Some("1.0")),
            Err(ConfigError::DefaultLayoutOnly(_))
        ));
    }

    #[test]
    fn test_artifact_directory() {
        assert_eq!(
            Path::new("/repo/org/apache/maven/its/core-it"),
            repo(RepositoryLayout::Default).artifact_directory("org.apache.maven.its", Some("core-it"))
        );
        assert_eq!(
            Path::new("/repo/org.apache.maven.its"),
            repo(RepositoryLayout::Legacy).artifact_directory("org.apache.maven.its", None)
        );
    }

    #[test]
    fn test_metadata_file_names() {
        assert!(is_metadata_file_name("maven-metadata-local.xml"));
        assert!(is_metadata_file_name("maven-metadata.xml"));
        assert!(is_metadata_file_name("maven-metadata-central.xml"));
        assert!(!is_metadata_file_name("maven-metadata.xml.sha1"));
        assert!(!is_metadata_file_name("core-it-1.0.pom"));
    }
}
