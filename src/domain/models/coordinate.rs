//! Maven artifact coordinates.

use crate::domain::errors::ConfigError;

/// A fully qualified artifact coordinate: group, artifact, version,
/// extension, and optional classifier.
///
/// Legacy extension aliases are rewritten on construction, so a coordinate
/// always holds the extension and classifier that appear in the repository:
/// `maven-plugin` becomes `jar`, `coreit-artifact` becomes `jar` with the
/// `it` classifier, and `test-jar` becomes `jar` with the `tests`
/// classifier. An empty classifier is treated as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCoordinate {
    group_id: String,
    artifact_id: String,
    version: String,
    extension: String,
    classifier: Option<String>,
}

impl ArtifactCoordinate {
    /// Creates a coordinate without a classifier.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self::with_classifier(group_id, artifact_id, version, extension, None::<String>)
    }

    /// Creates a coordinate, applying extension aliases and dropping an
    /// empty classifier.
    pub fn with_classifier(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        extension: impl Into<String>,
        classifier: Option<impl Into<String>>,
    ) -> Self {
        let mut extension = extension.into();
        let mut classifier = classifier.map(Into::into).filter(|c: &String| !c.is_empty());

        match extension.as_str() {
            "maven-plugin" => extension = "jar".to_string(),
            "coreit-artifact" => {
                extension = "jar".to_string();
                classifier = Some("it".to_string());
            }
            "test-jar" => {
                extension = "jar".to_string();
                classifier = Some("tests".to_string());
            }
            _ => {}
        }

        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            extension,
            classifier,
        }
    }

    /// Parses a `groupId:artifactId:version:extension` marker body.
    ///
    /// Exactly four non-empty colon-separated segments are required.
    pub fn parse(marker: &str) -> Result<Self, ConfigError> {
        let segments: Vec<&str> = marker.split(':').collect();
        if segments.len() != 4 || segments.iter().any(|s| s.is_empty()) {
            return Err(ConfigError::MalformedArtifactMarker(marker.to_string()));
        }
        Ok(Self::new(segments[0], segments[1], segments[2], segments[3]))
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// The file name of the artifact:
    /// `artifactId-version[-classifier].extension`.
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, classifier, self.extension
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.extension),
        }
    }
}
