//! API entries discovered in a repository.

use super::protocol::Protocol;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One specification candidate listed in a repository's metadata descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApiEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "api-spec-type")]
    pub protocol: Protocol,
    /// Path of the specification inside the repository
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_path: Option<String>,
    /// Explicit file name override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_file: Option<String>,
}

impl ApiEntry {
    pub fn new(name: impl Into<String>, protocol: Protocol) -> Self {
        Self {
            name: name.into(),
            version: None,
            protocol,
            definition_path: None,
            definition_file: None,
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_definition_path(mut self, path: impl Into<String>) -> Self {
        self.definition_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_definition_file(mut self, file: impl Into<String>) -> Self {
        self.definition_file = Some(file.into());
        self
    }

    /// Name shown in logs and error records
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unnamed"
        } else {
            &self.name
        }
    }

    /// Resolve the specification file name inside a working directory.
    ///
    /// Order: explicit `definition-file`, the protocol default (AsyncAPI),
    /// then the base name of `definition-path`.
    #[must_use]
    pub fn resolve_file_name(&self) -> Option<String> {
        if let Some(file) = self.definition_file.as_deref().filter(|f| !f.is_empty()) {
            return Some(file.to_string());
        }
        if let Some(default) = self.protocol.default_file_name() {
            return Some(default.to_string());
        }
        self.definition_path
            .as_deref()
            .and_then(|p| Path::new(p).file_name())
            .map(|name| name.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_explicit_file() {
        let entry = ApiEntry::new("pets", Protocol::Event)
            .with_definition_path("specs/events.yml")
            .with_definition_file("custom.yml");
        assert_eq!(entry.resolve_file_name().as_deref(), Some("custom.yml"));
    }

    #[test]
    fn test_resolve_event_default() {
        let entry = ApiEntry::new("pets", Protocol::Event).with_definition_path("specs/events.yml");
        assert_eq!(entry.resolve_file_name().as_deref(), Some("asyncapi.yml"));
    }

    #[test]
    fn test_resolve_definition_path_basename() {
        let entry =
            ApiEntry::new("pets", Protocol::Rest).with_definition_path("api/v1/openapi.yml");
        assert_eq!(entry.resolve_file_name().as_deref(), Some("openapi.yml"));
    }

    #[test]
    fn test_resolve_nothing() {
        let entry = ApiEntry::new("pets", Protocol::Grpc);
        assert_eq!(entry.resolve_file_name(), None);
        let entry = ApiEntry::new("pets", Protocol::Grpc).with_definition_file("");
        assert_eq!(entry.resolve_file_name(), None);
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(ApiEntry::new("", Protocol::Rest).display_name(), "Unnamed");
    }
}
