//! Engine-specific issue formats and their normalization.
//!
//! Each linter reports issues in its own JSON shape with its own severity
//! codes and position base. [`RawIssue::normalize`] maps them onto the
//! canonical [`Issue`]; unknown severities are rejected, never coerced.

use crate::error::{CertifyError, EngineErrorKind, Result};
use crate::model::{Issue, IssueSource, PathSegment, Position, Range, Severity};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Report format produced by a linter command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    /// `spectral lint -f json`
    Spectral,
    /// `protolint lint -reporter json`
    Protolint,
    /// `eslint -f json` with the GraphQL plugin
    Eslint,
    /// `markdownlint --json`
    Markdownlint,
}

impl ReportFormat {
    #[must_use]
    pub const fn source(&self) -> IssueSource {
        match self {
            Self::Spectral => IssueSource::Spectral,
            Self::Protolint => IssueSource::Protolint,
            Self::Eslint => IssueSource::GraphqlEslint,
            Self::Markdownlint => IssueSource::Markdownlint,
        }
    }

    /// Decode a JSON report into raw issues
    pub fn decode(&self, report: &str) -> Result<Vec<RawIssue>> {
        let invalid = |e: serde_json::Error| {
            CertifyError::engine(
                self.source().name(),
                "decoding report",
                EngineErrorKind::InvalidReport(e.to_string()),
            )
        };

        let issues = match self {
            Self::Spectral => serde_json::from_str::<Vec<SpectralIssue>>(report)
                .map_err(invalid)?
                .into_iter()
                .map(RawIssue::Spectral)
                .collect(),
            Self::Protolint => serde_json::from_str::<ProtolintReport>(report)
                .map_err(invalid)?
                .lints
                .into_iter()
                .map(RawIssue::Protolint)
                .collect(),
            Self::Eslint => serde_json::from_str::<Vec<EslintFileResult>>(report)
                .map_err(invalid)?
                .into_iter()
                .flat_map(|file| file.messages)
                .map(RawIssue::Eslint)
                .collect(),
            Self::Markdownlint => serde_json::from_str::<Vec<MarkdownlintIssue>>(report)
                .map_err(invalid)?
                .into_iter()
                .map(RawIssue::Markdownlint)
                .collect(),
        };
        Ok(issues)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpectralPosition {
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub character: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpectralRange {
    #[serde(default)]
    pub start: SpectralPosition,
    #[serde(default)]
    pub end: SpectralPosition,
}

/// Spectral issue: severities 0-3, 0-based positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralIssue {
    pub code: String,
    pub message: String,
    pub severity: i64,
    #[serde(default)]
    pub range: Option<SpectralRange>,
    #[serde(default)]
    pub path: Vec<PathSegment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ProtolintReport {
    #[serde(default)]
    lints: Vec<ProtolintIssue>,
}

/// protolint issue: textual severity, 1-based line and column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtolintIssue {
    pub rule: String,
    pub message: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub column: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct EslintFileResult {
    #[serde(default)]
    messages: Vec<EslintIssue>,
}

/// ESLint message: severity 1 or 2, 1-based positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EslintIssue {
    #[serde(default)]
    pub rule_id: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    pub message: String,
    pub severity: i64,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub column: Option<u32>,
    #[serde(default)]
    pub end_line: Option<u32>,
    #[serde(default)]
    pub end_column: Option<u32>,
}

/// markdownlint result: line only, rule aliases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownlintIssue {
    #[serde(default)]
    pub file_name: Option<String>,
    pub line_number: u32,
    #[serde(default)]
    pub rule_names: Vec<String>,
    pub rule_description: String,
    #[serde(default)]
    pub rule_information: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
}

/// Issue as reported by one engine, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum RawIssue {
    Spectral(SpectralIssue),
    Protolint(ProtolintIssue),
    Eslint(EslintIssue),
    Markdownlint(MarkdownlintIssue),
}

impl RawIssue {
    #[must_use]
    pub const fn source(&self) -> IssueSource {
        match self {
            Self::Spectral(_) => IssueSource::Spectral,
            Self::Protolint(_) => IssueSource::Protolint,
            Self::Eslint(_) => IssueSource::GraphqlEslint,
            Self::Markdownlint(_) => IssueSource::Markdownlint,
        }
    }

    /// Convert to a canonical issue reported against `file_name`
    pub fn normalize(self, file_name: &str) -> Result<Issue> {
        match self {
            Self::Spectral(raw) => {
                let severity = spectral_severity(raw.severity)?;
                let range = raw.range.unwrap_or_default();
                Ok(
                    Issue::new(file_name, raw.code, raw.message, severity, IssueSource::Spectral)
                        .with_range(Range::new(
                            one_based(range.start),
                            one_based(range.end),
                        ))
                        .with_path(raw.path),
                )
            }
            Self::Protolint(raw) => {
                let severity = protolint_severity(raw.severity.as_deref())?;
                let position = Position::new(raw.line, raw.column);
                Ok(
                    Issue::new(file_name, raw.rule, raw.message, severity, IssueSource::Protolint)
                        .with_range(Range::point(position)),
                )
            }
            Self::Eslint(raw) => {
                let severity = eslint_severity(raw.severity)?;
                let code = raw
                    .message_id
                    .filter(|id| !id.is_empty())
                    .or(raw.rule_id)
                    .unwrap_or_default();
                Ok(
                    Issue::new(file_name, code, raw.message, severity, IssueSource::GraphqlEslint)
                        .with_range(Range::new(
                            Position::new(raw.line, raw.column),
                            Position::new(raw.end_line, raw.end_column),
                        )),
                )
            }
            Self::Markdownlint(raw) => {
                let severity = markdownlint_severity(raw.severity.as_deref())?;
                let position = Position::at(raw.line_number, 1);
                let mut issue = Issue::new(
                    file_name,
                    raw.rule_names.join(", "),
                    raw.rule_description,
                    severity,
                    IssueSource::Markdownlint,
                )
                .with_range(Range::point(position));
                issue.rule_information = raw.rule_information;
                Ok(issue)
            }
        }
    }
}

fn one_based(position: SpectralPosition) -> Position {
    Position::new(
        position.line.map(|l| l.saturating_add(1)),
        position.character.map(|c| c.saturating_add(1)),
    )
}

fn unknown_severity(source: IssueSource, value: impl Into<String>) -> CertifyError {
    CertifyError::engine(
        source.name(),
        "normalizing issue",
        EngineErrorKind::UnknownSeverity(value.into()),
    )
}

fn spectral_severity(code: i64) -> Result<Severity> {
    match code {
        0 => Ok(Severity::Error),
        1 => Ok(Severity::Warn),
        // 3 is Spectral's "hint"
        2 | 3 => Ok(Severity::Info),
        other => Err(unknown_severity(IssueSource::Spectral, other.to_string())),
    }
}

fn protolint_severity(label: Option<&str>) -> Result<Severity> {
    // protolint omits the field when running without a severity config
    let Some(label) = label else {
        return Ok(Severity::Error);
    };
    match label.to_lowercase().as_str() {
        "error" => Ok(Severity::Error),
        "warning" | "warn" => Ok(Severity::Warn),
        "info" | "note" => Ok(Severity::Info),
        _ => Err(unknown_severity(IssueSource::Protolint, label)),
    }
}

fn eslint_severity(code: i64) -> Result<Severity> {
    match code {
        2 => Ok(Severity::Error),
        1 => Ok(Severity::Warn),
        other => Err(unknown_severity(IssueSource::GraphqlEslint, other.to_string())),
    }
}

fn markdownlint_severity(label: Option<&str>) -> Result<Severity> {
    let Some(label) = label else {
        return Ok(Severity::Warn);
    };
    match label.to_lowercase().as_str() {
        "error" => Ok(Severity::Error),
        "warning" | "warn" => Ok(Severity::Warn),
        _ => Err(unknown_severity(IssueSource::Markdownlint, label)),
    }
}
