//! Integration tests for repository validation: discovery, per-entry
//! isolation, working directory cleanup and output shapes.

mod common;

use apicert::config::CertifyConfig;
use apicert::{CertifyError, Certifier, Rating, RepositoryLocation, ValidationType};
use common::{entry_count, registry_with, RepoFixture, ScriptedEngine};
use serde_json::Value;
use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const THREE_APIS: &str = r"
apis:
  - name: pets
    version: 1.0.0
    api-spec-type: REST
    definition-path: apis/pets/openapi.yml
  - name: orders
    api-spec-type: GRPC
    definition-path: apis/orders/orders.proto
  - name: catalog
    api-spec-type: GRAPHQL
    definition-path: apis/catalog/schema.graphql
";

fn certifier(work: &Path, configure: impl FnOnce(&mut CertifyConfig)) -> Certifier {
    let mut config = CertifyConfig::builder()
        .work_dir(Some(work.to_path_buf()))
        .build();
    configure(&mut config);
    Certifier::with_registry(config, registry_with(Arc::new(ScriptedEngine::new())))
}

fn directory(fixture: &RepoFixture) -> RepositoryLocation {
    RepositoryLocation::Directory(fixture.path().to_path_buf())
}

fn healthy_repo() -> RepoFixture {
    RepoFixture::new(THREE_APIS)
        .with_file("apis/pets/openapi.yml", "openapi: 3.0.3\n")
        .with_file("apis/orders/orders.proto", "issue: 1\n")
        .with_file("apis/catalog/schema.graphql", "type Query { a: Int }\n")
}

// ============================================================================
// Batch isolation
// ============================================================================

mod isolation_tests {
    use super::*;

    #[test]
    fn test_missing_file_does_not_affect_other_entries() {
        let repo = RepoFixture::new(THREE_APIS)
            .with_file("apis/pets/openapi.yml", "openapi: 3.0.3\n")
            .with_file("apis/catalog/schema.graphql", "type Query { a: Int }\n");
        let work = TempDir::new().expect("tempdir");

        let report = certifier(work.path(), |_| {})
            .validate_repository(&directory(&repo), None, true)
            .expect("run");

        assert_eq!(report.len(), 3);
        assert!(!report.outcomes[0].is_failed());
        let failed = report.outcomes[1].as_failed().expect("orders failed");
        assert_eq!(
            failed.error,
            "Specification file not found in repository: apis/orders/orders.proto"
        );
        assert!(!report.outcomes[2].is_failed());
        assert!(report.has_errors());
    }

    #[test]
    fn test_engine_panic_is_contained() {
        let repo = RepoFixture::new(THREE_APIS)
            .with_file("apis/pets/openapi.yml", "openapi: 3.0.3\n")
            .with_file("apis/orders/orders.proto", "panic\n")
            .with_file("apis/catalog/schema.graphql", "type Query { a: Int }\n");
        let work = TempDir::new().expect("tempdir");

        let report = certifier(work.path(), |_| {})
            .validate_repository(&directory(&repo), None, false)
            .expect("run");

        let names: Vec<_> = report.outcomes.iter().map(|o| o.api_name()).collect();
        assert_eq!(names, ["pets", "orders", "catalog"]);
        let failed = report.outcomes[1].as_failed().expect("orders failed");
        assert!(failed.error.contains("engine crashed"));
        assert!(failed.error.starts_with("Validation process failed during LINTING"));
        assert_eq!(entry_count(work.path()), 0);
    }

    #[test]
    fn test_unsupported_entries_are_dropped() {
        let repo = RepoFixture::new(
            r"
apis:
  - name: legacy
    api-spec-type: SOAP
    definition-path: legacy.wsdl
  - name: pets
    api-spec-type: rest
    definition-path: openapi.yml
",
        )
        .with_file("openapi.yml", "openapi: 3.0.3\n");
        let work = TempDir::new().expect("tempdir");

        let report = certifier(work.path(), |_| {})
            .validate_repository(&directory(&repo), None, false)
            .expect("run");

        assert_eq!(report.len(), 1);
        assert_eq!(report.outcomes[0].api_name(), "pets");
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.diagnostics[0].contains("legacy"));
    }

    #[test]
    fn test_control_characters_in_name_do_not_abort_the_batch() {
        let repo = RepoFixture::new(
            r#"
apis:
  - name: "pe\0ts"
    api-spec-type: REST
    definition-path: apis/pets/openapi.yml
  - name: orders
    api-spec-type: GRPC
    definition-path: apis/orders/orders.proto
"#,
        )
        .with_file("apis/pets/openapi.yml", "openapi: 3.0.3\n")
        .with_file("apis/orders/orders.proto", "\n");
        let work = TempDir::new().expect("tempdir");

        let report = certifier(work.path(), |c| c.execution.entry_timeout_secs = Some(30))
            .validate_repository(&directory(&repo), None, false)
            .expect("run");

        assert_eq!(report.len(), 2);
        assert_eq!(report.outcomes[0].api_name(), "pe\0ts");
        assert!(!report.outcomes[0].is_failed());
        assert!(!report.outcomes[1].is_failed());
        assert_eq!(entry_count(work.path()), 0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let repo = healthy_repo();
        let work = TempDir::new().expect("tempdir");

        let sequential = certifier(work.path(), |_| {})
            .validate_repository(&directory(&repo), None, false)
            .expect("sequential");
        let parallel = certifier(work.path(), |c| c.execution.parallel = true)
            .validate_repository(&directory(&repo), None, false)
            .expect("parallel");

        assert_eq!(sequential.summaries(), parallel.summaries());
        assert_eq!(entry_count(work.path()), 0);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let repo = healthy_repo();
        let work = TempDir::new().expect("tempdir");
        let certifier = certifier(work.path(), |_| {});

        let first = certifier
            .validate_repository(&directory(&repo), None, false)
            .expect("first");
        let second = certifier
            .validate_repository(&directory(&repo), None, false)
            .expect("second");
        assert_eq!(first.summaries(), second.summaries());
    }

    #[test]
    fn test_timeout_yields_record_and_cleans_up() {
        let repo = RepoFixture::new(THREE_APIS)
            .with_file("apis/pets/openapi.yml", "sleep: 3000\n")
            .with_file("apis/orders/orders.proto", "\n")
            .with_file("apis/catalog/schema.graphql", "\n");
        let work = TempDir::new().expect("tempdir");

        let report = certifier(work.path(), |c| c.execution.entry_timeout_secs = Some(1))
            .validate_repository(&directory(&repo), None, false)
            .expect("run");

        let failed = report.outcomes[0].as_failed().expect("pets timed out");
        assert!(failed.error.contains("timed out after 1s"));
        assert!(!report.outcomes[1].is_failed());
        assert!(!report.outcomes[2].is_failed());
        assert_eq!(entry_count(work.path()), 0);
    }
}

// ============================================================================
// Repository sources
// ============================================================================

mod source_tests {
    use super::*;
    use zip::write::SimpleFileOptions;

    fn zip_repo(path: &Path) {
        let file = std::fs::File::create(path).expect("create");
        let mut writer = zip::ZipWriter::new(file);
        let files = [
            ("pets-main/metadata.yml", THREE_APIS),
            ("pets-main/apis/pets/openapi.yml", "openapi: 3.0.3\n"),
            ("pets-main/apis/orders/orders.proto", "issue: 0\n"),
            ("pets-main/apis/catalog/schema.graphql", "\n"),
        ];
        for (name, content) in files {
            writer
                .start_file(name, SimpleFileOptions::default())
                .expect("start");
            writer.write_all(content.as_bytes()).expect("write");
        }
        writer.finish().expect("finish");
    }

    #[test]
    fn test_archive_is_extracted_and_released() {
        let archives = TempDir::new().expect("tempdir");
        let archive = archives.path().join("pets.zip");
        zip_repo(&archive);
        let work = TempDir::new().expect("tempdir");

        let report = certifier(work.path(), |_| {})
            .validate_repository(&RepositoryLocation::Archive(archive), None, false)
            .expect("run");

        assert_eq!(report.len(), 3);
        assert!(report.outcomes[1].has_errors());
        assert_eq!(entry_count(work.path()), 0);
    }

    #[test]
    fn test_corrupt_archive_fails_the_run() {
        let archives = TempDir::new().expect("tempdir");
        let archive = archives.path().join("broken.zip");
        std::fs::write(&archive, b"PK not really").expect("write");
        let work = TempDir::new().expect("tempdir");

        let err = certifier(work.path(), |_| {})
            .validate_repository(&RepositoryLocation::Archive(archive), None, false)
            .unwrap_err();
        assert!(matches!(err, CertifyError::Extract(_)));
        assert_eq!(entry_count(work.path()), 0);
    }

    #[test]
    fn test_unparsable_metadata_fails_the_run() {
        let repo = RepoFixture::new("apis: [\n  - broken");
        let work = TempDir::new().expect("tempdir");
        let err = certifier(work.path(), |_| {})
            .validate_repository(&directory(&repo), None, false)
            .unwrap_err();
        assert!(err.to_string().contains("metadata"));
    }

    #[test]
    fn test_missing_metadata_yields_empty_report() {
        let repo = TempDir::new().expect("tempdir");
        let work = TempDir::new().expect("tempdir");
        let report = certifier(work.path(), |_| {})
            .validate_repository(
                &RepositoryLocation::Directory(repo.path().to_path_buf()),
                None,
                false,
            )
            .expect("run");
        assert!(report.is_empty());
        assert!(!report.has_errors());
        assert_eq!(report.diagnostics.len(), 1);
    }
}

// ============================================================================
// Output shapes
// ============================================================================

mod output_tests {
    use super::*;

    #[test]
    fn test_summary_shape() {
        let repo = RepoFixture::new(THREE_APIS)
            .with_file("apis/pets/openapi.yml", "openapi: 3.0.3\n")
            .with_file("apis/catalog/schema.graphql", "\n");
        let work = TempDir::new().expect("tempdir");

        let report = certifier(work.path(), |_| {})
            .validate_repository(&directory(&repo), None, false)
            .expect("run");
        let json: Value = serde_json::to_value(&report).expect("json");
        let items = json.as_array().expect("array");
        assert_eq!(items.len(), 3);

        assert_eq!(items[0]["validationType"], "OVERALL_SCORE");
        assert_eq!(items[0]["rating"], "B");
        assert_eq!(items[0]["ratingDescription"], "Good");
        let score = items[0]["score"].as_f64().expect("score");
        assert!((score - 80.0).abs() < 1e-9);
        assert_eq!(items[0]["apiName"], "pets");
        assert!(items[0].get("error").is_none());
        assert!(items[0].get("result").is_none());

        assert_eq!(items[1]["validationType"], "ERROR");
        assert_eq!(items[1]["apiName"], "orders");
        assert!(items[1]["error"].as_str().is_some());
        assert!(items[1].get("score").is_none());
        assert!(items[1].get("definitionPath").is_none());
    }

    #[test]
    fn test_verbose_single_dimension() {
        let repo = healthy_repo();
        let work = TempDir::new().expect("tempdir");

        let report = certifier(work.path(), |_| {})
            .validate_repository(&directory(&repo), Some(ValidationType::Design), true)
            .expect("run");
        let json: Value = serde_json::to_value(&report).expect("json");
        let orders = &json.as_array().expect("array")[1];

        assert_eq!(orders["validationType"], "DESIGN");
        let result = orders["result"].as_array().expect("result");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["validationType"], "DESIGN");
        assert_eq!(result[0]["issues"].as_array().expect("issues").len(), 1);
        assert_eq!(result[0]["issues"][0]["severity"], "WARN");
        assert_eq!(result[0]["issues"][0]["fileName"], "orders.proto");

        let summary = report.outcomes[1].summarize();
        let design = report.outcomes[1]
            .as_validated()
            .expect("validated")
            .dimensions
            .design
            .score;
        assert_eq!(summary.score, Some(design));
    }

    #[test]
    fn test_documentation_scored_when_enabled() {
        let repo = healthy_repo().with_file("README.md", "# Pets\nissue: 1\n");
        let work = TempDir::new().expect("tempdir");

        let report = certifier(work.path(), |c| c.documentation.enabled = true)
            .validate_repository(&directory(&repo), None, true)
            .expect("run");
        let pets = report.outcomes[0].as_validated().expect("validated");
        assert!(pets.dimensions.documentation.is_applicable());
        assert!(pets.dimensions.documentation.score < 100.0);
        assert_eq!(pets.dimensions.documentation.issues[0].file_name, "README.md");

        let disabled = certifier(work.path(), |_| {})
            .validate_repository(&directory(&repo), None, true)
            .expect("run");
        let pets = disabled.outcomes[0].as_validated().expect("validated");
        assert_eq!(pets.dimensions.documentation.rating, Rating::NotApplicable);
        assert_eq!(pets.dimensions.documentation.score, 0.0);
    }
}
