//! Protocol, dimension and validation-type tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Specification protocol, resolved once at discovery time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    /// OpenAPI
    Rest,
    /// AsyncAPI
    Event,
    /// Protobuf
    Grpc,
    Graphql,
}

impl Protocol {
    pub const ALL: [Self; 4] = [Self::Rest, Self::Event, Self::Grpc, Self::Graphql];

    /// Tag used in metadata descriptors and reports
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Rest => "REST",
            Self::Event => "EVENT",
            Self::Grpc => "GRPC",
            Self::Graphql => "GRAPHQL",
        }
    }

    /// Parse a metadata tag, ignoring case and surrounding whitespace
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let upper = tag.trim().to_uppercase();
        Self::ALL.into_iter().find(|p| p.tag() == upper)
    }

    /// Whether the security dimension takes part in the overall score.
    ///
    /// Transport security is only assessable from OpenAPI documents.
    #[must_use]
    pub const fn scores_security(&self) -> bool {
        matches!(self, Self::Rest)
    }

    /// File name assumed when metadata names no definition file
    #[must_use]
    pub const fn default_file_name(&self) -> Option<&'static str> {
        match self {
            Self::Event => Some("asyncapi.yml"),
            _ => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| {
            format!("Unknown API protocol: {s}. Valid options: REST, EVENT, GRPC, GRAPHQL")
        })
    }
}

/// Quality axis scored independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Dimension {
    Design,
    Security,
    Documentation,
}

impl Dimension {
    pub const ALL: [Self; 3] = [Self::Design, Self::Security, Self::Documentation];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Design => "DESIGN",
            Self::Security => "SECURITY",
            Self::Documentation => "DOCUMENTATION",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Caller-selectable validation type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationType {
    Design,
    Security,
    Documentation,
    /// All applicable dimensions
    #[default]
    OverallScore,
}

impl ValidationType {
    /// The single dimension requested, `None` for the overall score
    #[must_use]
    pub const fn dimension(&self) -> Option<Dimension> {
        match self {
            Self::Design => Some(Dimension::Design),
            Self::Security => Some(Dimension::Security),
            Self::Documentation => Some(Dimension::Documentation),
            Self::OverallScore => None,
        }
    }

    /// Whether `dimension` is computed for this validation type
    #[must_use]
    pub fn includes(&self, dimension: Dimension) -> bool {
        self.dimension().map_or(true, |d| d == dimension)
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Design => "DESIGN",
            Self::Security => "SECURITY",
            Self::Documentation => "DOCUMENTATION",
            Self::OverallScore => "OVERALL_SCORE",
        }
    }
}

impl From<Dimension> for ValidationType {
    fn from(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Design => Self::Design,
            Dimension::Security => Self::Security,
            Dimension::Documentation => Self::Documentation,
        }
    }
}

impl fmt::Display for ValidationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValidationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "DESIGN" => Ok(Self::Design),
            "SECURITY" => Ok(Self::Security),
            "DOCUMENTATION" => Ok(Self::Documentation),
            "OVERALL_SCORE" | "OVERALL" => Ok(Self::OverallScore),
            _ => Err(format!(
                "Unknown validation type: {s}. Valid options: DESIGN, SECURITY, DOCUMENTATION, OVERALL_SCORE"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_tags_are_case_insensitive() {
        assert_eq!(Protocol::from_tag("rest"), Some(Protocol::Rest));
        assert_eq!(Protocol::from_tag(" Event "), Some(Protocol::Event));
        assert_eq!(Protocol::from_tag("gRPC"), Some(Protocol::Grpc));
        assert_eq!(Protocol::from_tag("GraphQL"), Some(Protocol::Graphql));
        assert_eq!(Protocol::from_tag("soap"), None);
        assert_eq!(Protocol::from_tag(""), None);
    }

    #[test]
    fn test_only_rest_scores_security() {
        let scoring: Vec<_> = Protocol::ALL
            .into_iter()
            .filter(Protocol::scores_security)
            .collect();
        assert_eq!(scoring, vec![Protocol::Rest]);
    }

    #[test]
    fn test_event_default_file() {
        assert_eq!(Protocol::Event.default_file_name(), Some("asyncapi.yml"));
        assert_eq!(Protocol::Rest.default_file_name(), None);
    }

    #[test]
    fn test_validation_type_parse_and_includes() {
        assert_eq!("overall-score".parse(), Ok(ValidationType::OverallScore));
        assert_eq!("design".parse(), Ok(ValidationType::Design));
        assert!("lint".parse::<ValidationType>().is_err());

        assert!(ValidationType::OverallScore.includes(Dimension::Security));
        assert!(ValidationType::Design.includes(Dimension::Design));
        assert!(!ValidationType::Design.includes(Dimension::Documentation));
    }

    #[test]
    fn test_validation_type_serde_names() {
        let json = serde_json::to_string(&ValidationType::OverallScore).expect("serialize");
        assert_eq!(json, "\"OVERALL_SCORE\"");
        let json = serde_json::to_string(&Protocol::Graphql).expect("serialize");
        assert_eq!(json, "\"GRAPHQL\"");
    }
}
