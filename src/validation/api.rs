//! Validation of a single API inside its working directory.

use crate::config::CertifyConfig;
use crate::engines::{panic_message, EngineRegistry, EngineSlot};
use crate::error::{CertifyError, Result};
use crate::model::{
    ApiEntry, ApiErrorRecord, ApiOutcome, ApiValidationResult, Dimension, Dimensions, Issue,
    ValidationDimension, ValidationStage, ValidationType,
};
use crate::scoring::{calculate_average_score, score_linting_with};
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// What to validate and where
#[derive(Debug, Clone, Copy)]
pub struct ApiRequest<'a> {
    pub entry: &'a ApiEntry,
    /// Directory holding the specification file
    pub work_dir: &'a Path,
    pub validation_type: ValidationType,
    /// Markdown file scored for documentation, if any
    pub documentation: Option<&'a Path>,
    /// Passed to every engine call
    pub deadline: Option<Instant>,
}

impl<'a> ApiRequest<'a> {
    #[must_use]
    pub const fn new(
        entry: &'a ApiEntry,
        work_dir: &'a Path,
        validation_type: ValidationType,
    ) -> Self {
        Self {
            entry,
            work_dir,
            validation_type,
            documentation: None,
            deadline: None,
        }
    }

    #[must_use]
    pub const fn with_documentation(mut self, documentation: Option<&'a Path>) -> Self {
        self.documentation = documentation;
        self
    }

    #[must_use]
    pub const fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Issues gathered per dimension; `None` documentation means not evaluated
struct Findings {
    design: Vec<Issue>,
    security: Vec<Issue>,
    documentation: Option<Vec<Issue>>,
}

/// Runs the per-API state machine:
/// `RESOLVING_FILE -> LINTING -> SCORING -> DONE`, failing into an error
/// record from any stage.
#[derive(Debug, Clone)]
pub struct ApiValidator {
    registry: Arc<EngineRegistry>,
    config: Arc<CertifyConfig>,
}

impl ApiValidator {
    pub fn new(registry: Arc<EngineRegistry>, config: Arc<CertifyConfig>) -> Self {
        Self { registry, config }
    }

    /// Validate one API. Never fails: errors become an [`ApiErrorRecord`]
    /// naming the stage that failed. Engine panics arrive here as engine
    /// errors; any other panic is caught as well.
    pub fn validate(&self, request: ApiRequest<'_>) -> ApiOutcome {
        let entry = request.entry;
        tracing::info!(
            "Validating API '{}/{}'",
            entry.display_name(),
            entry.protocol
        );

        let stage = Cell::new(ValidationStage::ResolvingFile);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(&request, &stage)));

        match outcome {
            Ok(Ok(result)) => {
                tracing::info!(
                    "Finished '{}': score {:.2}, rating {}",
                    entry.display_name(),
                    result.overall_score,
                    result.overall_rating
                );
                ApiOutcome::from(result)
            }
            Ok(Err(e)) => self.failure(entry, stage.get(), &e.to_string()),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                self.failure(entry, stage.get(), &format!("internal error: {message}"))
            }
        }
    }

    fn failure(&self, entry: &ApiEntry, stage: ValidationStage, message: &str) -> ApiOutcome {
        let error = match stage {
            ValidationStage::ResolvingFile => message.to_string(),
            _ => format!("Validation process failed during {stage}: {message}"),
        };
        tracing::error!("Validation of '{}' failed: {error}", entry.display_name());
        ApiErrorRecord::new(entry.display_name(), entry.definition_path.clone(), error)
            .at_stage(stage)
            .into()
    }

    fn run(
        &self,
        request: &ApiRequest<'_>,
        stage: &Cell<ValidationStage>,
    ) -> Result<ApiValidationResult> {
        let entry = request.entry;

        let (file_name, spec_path) = resolve_spec(entry, request.work_dir)?;
        tracing::debug!("Using specification file {}", spec_path.display());

        stage.set(ValidationStage::Linting);
        let findings = self.lint(request, &file_name, &spec_path)?;

        stage.set(ValidationStage::Scoring);
        let result = self.score(request, findings);

        stage.set(ValidationStage::Done);
        Ok(result)
    }

    fn lint(
        &self,
        request: &ApiRequest<'_>,
        file_name: &str,
        spec_path: &Path,
    ) -> Result<Findings> {
        let engines = self.registry.for_protocol(request.entry.protocol);
        let wants = |d| request.validation_type.includes(d);
        let deadline = request.deadline;

        let design = if wants(Dimension::Design) {
            engines
                .design
                .lint_issues_until(spec_path, file_name, request.work_dir, deadline)?
        } else {
            Vec::new()
        };

        let security = match &engines.security {
            Some(slot) if wants(Dimension::Security) => {
                slot.lint_issues_until(spec_path, file_name, request.work_dir, deadline)?
            }
            _ => Vec::new(),
        };

        let documentation = match (self.documentation_slot(), request.documentation) {
            (Some(slot), Some(doc)) if wants(Dimension::Documentation) => {
                let name = doc
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let dir = doc.parent().unwrap_or(request.work_dir);
                Some(slot.lint_issues_until(doc, &name, dir, deadline)?)
            }
            _ => None,
        };

        tracing::debug!(
            "Linting found {} design, {} security and {} documentation issue(s)",
            design.len(),
            security.len(),
            documentation.as_ref().map_or(0, Vec::len)
        );
        Ok(Findings {
            design,
            security,
            documentation,
        })
    }

    fn documentation_slot(&self) -> Option<&EngineSlot> {
        if self.config.documentation.enabled {
            self.registry.documentation.as_ref()
        } else {
            None
        }
    }

    fn score(&self, request: &ApiRequest<'_>, findings: Findings) -> ApiValidationResult {
        let entry = request.entry;
        let protocol = entry.protocol;
        let validation_type = request.validation_type;
        let weights = &self.config.scoring.severity;
        let engines = self.registry.for_protocol(protocol);

        // Dimensions not requested are held at a neutral 100
        let design_score = if validation_type.includes(Dimension::Design) {
            score_linting_with(&findings.design, engines.design.rule_count, weights)
        } else {
            100.0
        };

        let security_score = if !validation_type.includes(Dimension::Security) {
            100.0
        } else if let Some(slot) = &engines.security {
            score_linting_with(&findings.security, slot.rule_count, weights)
        } else {
            score_linting_with(&findings.security, 0, weights)
        };

        let documentation = match findings.documentation {
            Some(issues) => {
                let count = self.documentation_slot().map_or(0, |s| s.rule_count);
                let score = score_linting_with(&issues, count, weights);
                ValidationDimension::scored(Dimension::Documentation, score, issues)
            }
            None => ValidationDimension::not_applicable(Dimension::Documentation),
        };

        let dimensions = Dimensions {
            design: ValidationDimension::scored(Dimension::Design, design_score, findings.design),
            security: ValidationDimension::scored(
                Dimension::Security,
                security_score,
                findings.security,
            ),
            documentation,
        };

        let mut scored = vec![(dimensions.design.score, Dimension::Design)];
        if protocol.scores_security() {
            scored.push((dimensions.security.score, Dimension::Security));
        }
        // N/A documentation still counts at score 0 unless configured otherwise
        let documentation_counts = dimensions.documentation.is_applicable()
            || self.config.scoring.count_unscored_documentation;
        if documentation_counts {
            scored.push((dimensions.documentation.score, Dimension::Documentation));
        }
        let dimension_weights = self.config.scoring.weights.for_protocol(protocol);
        let overall = calculate_average_score(&scored, dimension_weights);

        ApiValidationResult::new(
            entry.display_name(),
            entry.version.clone(),
            protocol,
            validation_type,
            dimensions,
            overall,
        )
    }
}

/// Resolve the specification file name and check it exists in `work_dir`
fn resolve_spec(entry: &ApiEntry, work_dir: &Path) -> Result<(String, PathBuf)> {
    let file_name = entry.resolve_file_name().ok_or_else(|| {
        CertifyError::file_resolution(
            entry.display_name(),
            "missing 'definition-file' or 'definition-path' in metadata",
        )
    })?;

    let spec_path = work_dir.join(&file_name);
    if !spec_path.is_file() {
        return Err(CertifyError::spec_not_found(file_name, spec_path));
    }
    Ok((file_name, spec_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::{
        LintOptions, ProtocolEngines, RawIssue, RuleEngine, Ruleset, SpectralIssue,
    };
    use crate::model::{Protocol, Severity};
    use crate::scoring::Rating;
    use tempfile::TempDir;

    struct Scripted(Vec<i64>);

    impl RuleEngine for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn lint(&self, _spec_path: &Path, _options: &LintOptions) -> Result<Vec<RawIssue>> {
            Ok(self
                .0
                .iter()
                .map(|severity| {
                    RawIssue::Spectral(SpectralIssue {
                        code: format!("rule-{severity}"),
                        message: "violation".to_string(),
                        severity: *severity,
                        range: None,
                        path: Vec::new(),
                    })
                })
                .collect())
        }
    }

    struct Panicking;

    impl RuleEngine for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn lint(&self, _spec_path: &Path, _options: &LintOptions) -> Result<Vec<RawIssue>> {
            panic!("parser exploded")
        }
    }

    fn slot(engine: impl RuleEngine + 'static, count: u32) -> EngineSlot {
        EngineSlot::new(Arc::new(engine), Ruleset::RestGeneral, count)
    }

    fn validator(rest_design: EngineSlot, grpc_design: EngineSlot) -> ApiValidator {
        validator_with(rest_design, grpc_design, CertifyConfig::default())
    }

    fn validator_with(
        rest_design: EngineSlot,
        grpc_design: EngineSlot,
        config: CertifyConfig,
    ) -> ApiValidator {
        let registry = EngineRegistry {
            rest: ProtocolEngines::new(rest_design).with_security(slot(Scripted(vec![]), 15)),
            event: ProtocolEngines::new(slot(Scripted(vec![]), 18)),
            grpc: ProtocolEngines::new(grpc_design),
            graphql: ProtocolEngines::new(slot(Scripted(vec![]), 20)),
            documentation: None,
        };
        ApiValidator::new(Arc::new(registry), Arc::new(config))
    }

    fn work_dir_with(file: &str) -> TempDir {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join(file), "content").expect("write");
        dir
    }

    #[test]
    fn test_clean_rest_api_without_documentation_rates_b() {
        let dir = work_dir_with("openapi.yml");
        let entry = ApiEntry::new("pets", Protocol::Rest).with_definition_path("apis/openapi.yml");
        let v = validator(slot(Scripted(vec![]), 42), slot(Scripted(vec![]), 33));

        let outcome = v.validate(ApiRequest::new(&entry, dir.path(), ValidationType::OverallScore));
        let result = outcome.as_validated().expect("validated");
        assert_eq!(result.dimensions.design.score, 100.0);
        assert_eq!(result.dimensions.design.rating, Rating::A);
        assert_eq!(result.dimensions.documentation.rating, Rating::NotApplicable);
        // Documentation weighs 0.2 at score 0
        assert!((result.overall_score - 80.0).abs() < 1e-9);
        assert_eq!(result.overall_rating, Rating::B);
        assert!(!result.has_errors);
    }

    #[test]
    fn test_unscored_documentation_can_be_left_out() {
        let dir = work_dir_with("openapi.yml");
        let entry = ApiEntry::new("pets", Protocol::Rest).with_definition_path("openapi.yml");
        let config = CertifyConfig::builder()
            .count_unscored_documentation(false)
            .build();
        let v = validator_with(slot(Scripted(vec![]), 42), slot(Scripted(vec![]), 33), config);

        let outcome = v.validate(ApiRequest::new(&entry, dir.path(), ValidationType::OverallScore));
        let result = outcome.as_validated().expect("validated");
        assert_eq!(result.overall_score, 100.0);
        assert_eq!(result.overall_rating, Rating::A);
    }

    #[test]
    fn test_single_error_single_rule() {
        let dir = work_dir_with("openapi.yml");
        let entry = ApiEntry::new("pets", Protocol::Rest).with_definition_path("openapi.yml");
        let v = validator(slot(Scripted(vec![0]), 1), slot(Scripted(vec![]), 33));

        let outcome = v.validate(ApiRequest::new(&entry, dir.path(), ValidationType::Design));
        let result = outcome.as_validated().expect("validated");
        assert_eq!(result.dimensions.design.score, 0.0);
        assert_eq!(result.dimensions.design.rating, Rating::D);
        assert_eq!(result.dimensions.security.score, 100.0);
        assert!(result.has_errors);
        assert_eq!(result.headline().1, Rating::D);
    }

    #[test]
    fn test_grpc_security_is_neutral() {
        let dir = work_dir_with("service.proto");
        let entry =
            ApiEntry::new("svc", Protocol::Grpc).with_definition_path("proto/service.proto");
        let v = validator(slot(Scripted(vec![]), 42), slot(Scripted(vec![1, 1]), 33));

        let outcome = v.validate(ApiRequest::new(&entry, dir.path(), ValidationType::OverallScore));
        let result = outcome.as_validated().expect("validated");
        assert_eq!(result.dimensions.security.score, 100.0);
        // Security carries no weight; documentation counts at 0
        let expected = result.dimensions.design.score * 0.8;
        assert!((result.overall_score - expected).abs() < 1e-9);
        assert!(result.dimensions.design.issues.iter().all(|i| i.severity == Severity::Warn));
    }

    #[test]
    fn test_missing_file_name() {
        let dir = TempDir::new().expect("tempdir");
        let entry = ApiEntry::new("nameless", Protocol::Rest);
        let v = validator(slot(Scripted(vec![]), 42), slot(Scripted(vec![]), 33));

        let outcome = v.validate(ApiRequest::new(&entry, dir.path(), ValidationType::OverallScore));
        let record = outcome.as_failed().expect("failed");
        assert_eq!(record.failed_stage, Some(ValidationStage::ResolvingFile));
        assert!(record.error.contains("Cannot determine API file name"));
    }

    #[test]
    fn test_spec_not_in_work_dir() {
        let dir = TempDir::new().expect("tempdir");
        let entry = ApiEntry::new("events", Protocol::Event).with_definition_path("events.yml");
        let v = validator(slot(Scripted(vec![]), 42), slot(Scripted(vec![]), 33));

        let outcome = v.validate(ApiRequest::new(&entry, dir.path(), ValidationType::OverallScore));
        let record = outcome.as_failed().expect("failed");
        assert_eq!(
            record.error,
            "Specification file asyncapi.yml not found at expected location"
        );
    }

    #[test]
    fn test_engine_panic_becomes_record() {
        let dir = work_dir_with("openapi.yml");
        let entry = ApiEntry::new("pets", Protocol::Rest).with_definition_path("openapi.yml");
        let v = validator(slot(Panicking, 42), slot(Scripted(vec![]), 33));

        let outcome = v.validate(ApiRequest::new(&entry, dir.path(), ValidationType::OverallScore));
        let record = outcome.as_failed().expect("failed");
        assert_eq!(record.failed_stage, Some(ValidationStage::Linting));
        assert!(record.error.contains("Rule engine 'panicking' failed"));
        assert!(record.error.contains("panicked: parser exploded"));
        assert_eq!(record.definition_path.as_deref(), Some("openapi.yml"));
    }

    #[test]
    fn test_unknown_severity_fails_entry() {
        let dir = work_dir_with("openapi.yml");
        let entry = ApiEntry::new("pets", Protocol::Rest).with_definition_path("openapi.yml");
        let v = validator(slot(Scripted(vec![1, 42]), 42), slot(Scripted(vec![]), 33));

        let outcome = v.validate(ApiRequest::new(&entry, dir.path(), ValidationType::OverallScore));
        let record = outcome.as_failed().expect("failed");
        assert!(record.error.contains("unknown severity"));
    }
}
