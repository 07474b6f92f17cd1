//! Validation results: per-dimension, per-API and per-repository.

use super::issue::{has_errors, Issue};
use super::protocol::{Dimension, Protocol, ValidationType};
use crate::scoring::{calculate_rating, Rating, RatingInfo};
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;

/// Score of one quality dimension and the issues behind it
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationDimension {
    pub validation_type: Dimension,
    pub score: f64,
    pub rating: Rating,
    pub rating_description: String,
    pub issues: Vec<Issue>,
}

impl ValidationDimension {
    /// Dimension rated from its score
    #[must_use]
    pub fn scored(dimension: Dimension, score: f64, issues: Vec<Issue>) -> Self {
        let RatingInfo {
            rating,
            description,
        } = calculate_rating(score);
        Self {
            validation_type: dimension,
            score,
            rating,
            rating_description: description.to_string(),
            issues,
        }
    }

    /// Dimension that was not evaluated: score 0, rating N/A
    #[must_use]
    pub fn not_applicable(dimension: Dimension) -> Self {
        let info = RatingInfo::not_applicable();
        Self {
            validation_type: dimension,
            score: 0.0,
            rating: info.rating,
            rating_description: info.description.to_string(),
            issues: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_applicable(&self) -> bool {
        self.rating.is_applicable()
    }
}

/// The three dimensions of one API
#[derive(Debug, Clone, PartialEq)]
pub struct Dimensions {
    pub design: ValidationDimension,
    pub security: ValidationDimension,
    pub documentation: ValidationDimension,
}

impl Dimensions {
    #[must_use]
    pub const fn get(&self, dimension: Dimension) -> &ValidationDimension {
        match dimension {
            Dimension::Design => &self.design,
            Dimension::Security => &self.security,
            Dimension::Documentation => &self.documentation,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationDimension> {
        [&self.design, &self.security, &self.documentation].into_iter()
    }

    /// Issues of every dimension, design first
    pub fn all_issues(&self) -> impl Iterator<Item = &Issue> {
        self.iter().flat_map(|d| d.issues.iter())
    }
}

/// Stage of the per-API validation state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStage {
    ResolvingFile,
    Linting,
    Scoring,
    Done,
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResolvingFile => "RESOLVING_FILE",
            Self::Linting => "LINTING",
            Self::Scoring => "SCORING",
            Self::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Successful validation of one API
#[derive(Debug, Clone, PartialEq)]
pub struct ApiValidationResult {
    pub api_name: String,
    pub api_version: Option<String>,
    pub api_protocol: Protocol,
    pub validation_type: ValidationType,
    pub validation_date_time: DateTime<Utc>,
    pub dimensions: Dimensions,
    pub overall_score: f64,
    pub overall_rating: Rating,
    pub overall_rating_description: String,
    pub has_errors: bool,
}

impl Serialize for ApiValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Only the requested dimensions are reported
        let reported: Vec<&ValidationDimension> = self
            .dimensions
            .iter()
            .filter(|d| self.validation_type.includes(d.validation_type))
            .collect();

        let mut state = serializer.serialize_struct("ApiValidationResult", 10)?;
        state.serialize_field("apiName", &self.api_name)?;
        match &self.api_version {
            Some(version) => state.serialize_field("apiVersion", version)?,
            None => state.skip_field("apiVersion")?,
        }
        state.serialize_field("apiProtocol", &self.api_protocol)?;
        state.serialize_field("validationType", &self.validation_type)?;
        state.serialize_field("validationDateTime", &self.validation_date_time)?;
        state.serialize_field("result", &reported)?;
        state.serialize_field("score", &self.overall_score)?;
        state.serialize_field("rating", &self.overall_rating)?;
        state.serialize_field("ratingDescription", &self.overall_rating_description)?;
        state.serialize_field("hasErrors", &self.has_errors)?;
        state.end()
    }
}

impl ApiValidationResult {
    /// Assemble a result, deriving the overall rating and `has_errors`
    #[must_use]
    pub fn new(
        api_name: impl Into<String>,
        api_version: Option<String>,
        api_protocol: Protocol,
        validation_type: ValidationType,
        dimensions: Dimensions,
        overall_score: f64,
    ) -> Self {
        let info = calculate_rating(overall_score);
        let has_errors = has_errors(dimensions.all_issues());
        Self {
            api_name: api_name.into(),
            api_version,
            api_protocol,
            validation_type,
            validation_date_time: Utc::now(),
            dimensions,
            overall_score,
            overall_rating: info.rating,
            overall_rating_description: info.description.to_string(),
            has_errors,
        }
    }

    /// Score, rating and description reported in summaries: the requested
    /// dimension's, or the overall ones
    #[must_use]
    pub fn headline(&self) -> (f64, Rating, &str) {
        match self.validation_type.dimension() {
            Some(dimension) => {
                let d = self.dimensions.get(dimension);
                (d.score, d.rating, d.rating_description.as_str())
            }
            None => (
                self.overall_score,
                self.overall_rating,
                self.overall_rating_description.as_str(),
            ),
        }
    }
}

/// Terminal record for an API whose validation failed
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorRecord {
    validation_type: &'static str,
    pub api_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition_path: Option<String>,
    pub error: String,
    /// Stage that was running when the failure happened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<ValidationStage>,
}

impl ApiErrorRecord {
    pub const VALIDATION_TYPE: &'static str = "ERROR";

    pub fn new(
        api_name: impl Into<String>,
        definition_path: Option<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            validation_type: Self::VALIDATION_TYPE,
            api_name: api_name.into(),
            definition_path,
            error: error.into(),
            failed_stage: None,
        }
    }

    #[must_use]
    pub fn at_stage(mut self, stage: ValidationStage) -> Self {
        self.failed_stage = Some(stage);
        self
    }
}

/// Outcome of validating one API: a result or an error record
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome {
    Validated(Box<ApiValidationResult>),
    Failed(ApiErrorRecord),
}

/// Full (verbose) shape of one repository result entry
pub type FullResult = ApiOutcome;

impl ApiOutcome {
    #[must_use]
    pub fn api_name(&self) -> &str {
        match self {
            Self::Validated(result) => &result.api_name,
            Self::Failed(record) => &record.api_name,
        }
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// True for failures and for results carrying ERROR issues
    #[must_use]
    pub fn has_errors(&self) -> bool {
        match self {
            Self::Validated(result) => result.has_errors,
            Self::Failed(_) => true,
        }
    }

    #[must_use]
    pub fn as_validated(&self) -> Option<&ApiValidationResult> {
        match self {
            Self::Validated(result) => Some(result),
            Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn as_failed(&self) -> Option<&ApiErrorRecord> {
        match self {
            Self::Validated(_) => None,
            Self::Failed(record) => Some(record),
        }
    }

    /// Reduce to the non-verbose summary shape
    #[must_use]
    pub fn summarize(&self) -> SummaryResult {
        match self {
            Self::Validated(result) => {
                let (score, rating, description) = result.headline();
                SummaryResult {
                    validation_type: result.validation_type.name().to_string(),
                    rating: Some(rating),
                    rating_description: Some(description.to_string()),
                    score: Some(score),
                    error: None,
                    api_name: result.api_name.clone(),
                }
            }
            Self::Failed(record) => SummaryResult {
                validation_type: ApiErrorRecord::VALIDATION_TYPE.to_string(),
                rating: None,
                rating_description: None,
                score: None,
                error: Some(record.error.clone()),
                api_name: record.api_name.clone(),
            },
        }
    }
}

impl From<ApiValidationResult> for ApiOutcome {
    fn from(result: ApiValidationResult) -> Self {
        Self::Validated(Box::new(result))
    }
}

impl From<ApiErrorRecord> for ApiOutcome {
    fn from(record: ApiErrorRecord) -> Self {
        Self::Failed(record)
    }
}

impl Serialize for ApiOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Validated(result) => result.serialize(serializer),
            Self::Failed(record) => record.serialize(serializer),
        }
    }
}

/// Non-verbose shape of one repository result entry
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub validation_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub api_name: String,
}

/// Ordered outcomes of a repository run, one per discovered entry
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryReport {
    pub outcomes: Vec<ApiOutcome>,
    /// Serialize full results instead of summaries
    pub verbose: bool,
    /// Discovery notes (dropped entries, missing metadata)
    pub diagnostics: Vec<String>,
}

impl RepositoryReport {
    #[must_use]
    pub const fn new(outcomes: Vec<ApiOutcome>, verbose: bool) -> Self {
        Self {
            outcomes,
            verbose,
            diagnostics: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Vec<String>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    #[must_use]
    pub fn summaries(&self) -> Vec<SummaryResult> {
        self.outcomes.iter().map(ApiOutcome::summarize).collect()
    }

    /// True when any API failed or reported ERROR issues
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.outcomes.iter().any(ApiOutcome::has_errors)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl Serialize for RepositoryReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.verbose {
            serializer.collect_seq(&self.outcomes)
        } else {
            serializer.collect_seq(self.summaries())
        }
    }
}

/// Design-only lint of a single file
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileValidation {
    pub issues: Vec<Issue>,
    pub has_errors: bool,
}

impl FileValidation {
    #[must_use]
    pub fn new(issues: Vec<Issue>) -> Self {
        let has_errors = has_errors(&issues);
        Self { issues, has_errors }
    }
}
