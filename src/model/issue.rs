//! Canonical rule-violation record.
//!
//! Every rule engine reports issues in its own shape; adapters translate them
//! into [`Issue`] so that scoring never depends on which engine ran.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a rule violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    /// Uppercase label used in reports
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 1-based position inside a specification document.
///
/// Both fields are optional: some engines report lines without columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<u32>,
}

impl Position {
    #[must_use]
    pub const fn new(line: Option<u32>, character: Option<u32>) -> Self {
        Self { line, character }
    }

    /// Position known down to the column
    #[must_use]
    pub const fn at(line: u32, character: u32) -> Self {
        Self {
            line: Some(line),
            character: Some(character),
        }
    }
}

/// Start/end span of an issue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Zero-width range at a single position
    #[must_use]
    pub const fn point(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }
}

/// One step of a structural path into the document (`paths./pets.get` or an
/// array index).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(u64),
    Key(String),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<u64> for PathSegment {
    fn from(index: u64) -> Self {
        Self::Index(index)
    }
}

/// Engine or plugin that produced an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueSource {
    Spectral,
    Protolint,
    GraphqlEslint,
    Markdownlint,
}

impl IssueSource {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Spectral => "spectral",
            Self::Protolint => "protolint",
            Self::GraphqlEslint => "graphql-eslint",
            Self::Markdownlint => "markdownlint",
        }
    }
}

impl fmt::Display for IssueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single rule violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// File name relative to the working directory
    pub file_name: String,
    /// Rule identifier
    pub code: String,
    pub message: String,
    pub severity: Severity,
    pub range: Range,
    #[serde(default)]
    pub path: Vec<PathSegment>,
    pub source: IssueSource,
    /// Link to the rule documentation, when the engine provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_information: Option<String>,
}

impl Issue {
    /// Create an issue without position or path
    pub fn new(
        file_name: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        source: IssueSource,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            code: code.into(),
            message: message.into(),
            severity,
            range: Range::default(),
            path: Vec::new(),
            source,
            rule_information: None,
        }
    }

    #[must_use]
    pub fn with_range(mut self, range: Range) -> Self {
        self.range = range;
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

/// True iff at least one issue has ERROR severity
pub fn has_errors<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> bool {
    issues.into_iter().any(Issue::is_error)
}
