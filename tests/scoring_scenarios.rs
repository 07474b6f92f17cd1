//! End-to-end scoring scenarios through the single-file entry points.

mod common;

use apicert::config::CertifyConfig;
use apicert::engines::{EngineSlot, Ruleset};
use apicert::{Certifier, Protocol, Rating, Severity, ValidationType};
use common::{registry_with, ScriptedEngine};
use std::sync::Arc;

fn certifier() -> Certifier {
    Certifier::with_registry(
        CertifyConfig::default(),
        registry_with(Arc::new(ScriptedEngine::new())),
    )
}

#[test]
fn test_clean_rest_spec_without_documentation_is_good() {
    let outcome = certifier()
        .score_single_file(b"openapi: 3.0.3\n", "openapi.yml", Protocol::Rest, None)
        .expect("score");
    let result = outcome.as_validated().expect("validated");

    assert_eq!(result.dimensions.design.score, 100.0);
    assert_eq!(result.dimensions.design.rating, Rating::A);
    assert_eq!(result.dimensions.security.score, 100.0);
    assert_eq!(result.dimensions.documentation.rating, Rating::NotApplicable);
    assert!((result.overall_score - 80.0).abs() < 1e-9);
    assert_eq!(result.overall_rating, Rating::B);
    assert_eq!(result.overall_rating_description, "Good");
    assert!(!result.has_errors);
}

#[test]
fn test_clean_rest_spec_is_excellent_when_documentation_is_left_out() {
    let config = CertifyConfig::builder()
        .count_unscored_documentation(false)
        .build();
    let outcome = Certifier::with_registry(config, registry_with(Arc::new(ScriptedEngine::new())))
        .score_single_file(b"openapi: 3.0.3\n", "openapi.yml", Protocol::Rest, None)
        .expect("score");
    let result = outcome.as_validated().expect("validated");

    assert_eq!(result.overall_score, 100.0);
    assert_eq!(result.overall_rating, Rating::A);
    assert_eq!(result.overall_rating_description, "Excellent");
}

#[test]
fn test_single_error_against_single_rule_is_poor() {
    let mut registry = registry_with(Arc::new(ScriptedEngine::new()));
    registry.grpc.design = EngineSlot::new(Arc::new(ScriptedEngine::new()), Ruleset::Grpc, 1);
    let certifier = Certifier::with_registry(CertifyConfig::default(), registry);

    let outcome = certifier
        .score_single_file(b"issue: 0\n", "service.proto", Protocol::Grpc, None)
        .expect("score");
    let result = outcome.as_validated().expect("validated");

    assert_eq!(result.dimensions.design.score, 0.0);
    assert_eq!(result.dimensions.design.rating, Rating::D);
    assert_eq!(result.overall_rating, Rating::D);
    assert!(result.has_errors);
    assert!(outcome.has_errors());
}

#[test]
fn test_grpc_security_is_excluded_from_overall() {
    let outcome = certifier()
        .score_single_file(b"issue: 1\nissue: 1\n", "service.proto", Protocol::Grpc, None)
        .expect("score");
    let result = outcome.as_validated().expect("validated");

    assert_eq!(result.dimensions.security.score, 100.0);
    assert!(result.dimensions.design.score < 100.0);
    let expected = result.dimensions.design.score * 0.8;
    assert!((result.overall_score - expected).abs() < 1e-9);
}

#[test]
fn test_rest_overall_weights_design_and_security() {
    // Both slots see the same file, so both report the same error
    let outcome = certifier()
        .score_single_file(b"issue: 0\n", "openapi.yml", Protocol::Rest, None)
        .expect("score");
    let result = outcome.as_validated().expect("validated");

    let design = result.dimensions.design.score;
    let security = result.dimensions.security.score;
    let expected = design * 0.5 + security * 0.3;
    assert!((result.overall_score - expected).abs() < 1e-9);
    assert!(security < design, "fewer security rules weigh each issue more");
}

#[test]
fn test_requested_dimension_holds_others_at_100() {
    let outcome = certifier()
        .score_single_file(
            b"issue: 0\n",
            "openapi.yml",
            Protocol::Rest,
            Some(ValidationType::Security),
        )
        .expect("score");
    let result = outcome.as_validated().expect("validated");

    assert_eq!(result.dimensions.design.score, 100.0);
    assert!(result.dimensions.design.issues.is_empty());
    assert!(result.dimensions.security.score < 100.0);
    let summary = outcome.summarize();
    assert_eq!(summary.validation_type, "SECURITY");
    assert_eq!(summary.score, Some(result.dimensions.security.score));
}

#[test]
fn test_verify_reports_design_issues_only() {
    let validation = certifier()
        .validate_single_file(b"issue: 0\nissue: 2\n", "schema.graphql", Protocol::Graphql)
        .expect("verify");
    assert_eq!(validation.issues.len(), 2);
    assert_eq!(validation.issues[0].severity, Severity::Error);
    assert_eq!(validation.issues[1].severity, Severity::Info);
    assert!(validation.has_errors);
}

#[test]
fn test_unknown_severity_is_an_error_record() {
    let outcome = certifier()
        .score_single_file(b"issue: 1\nissue: 12\n", "openapi.yml", Protocol::Rest, None)
        .expect("score");
    let record = outcome.as_failed().expect("failed");
    assert!(record.error.contains("unknown severity '12'"));
    assert_eq!(outcome.summarize().validation_type, "ERROR");
}
