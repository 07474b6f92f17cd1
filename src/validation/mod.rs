//! Validation orchestration.
//!
//! [`ApiValidator`] scores one API inside a working directory,
//! [`RepositoryValidator`] runs it for every entry of a repository, and
//! [`Certifier`] wires both to configuration, engines and repository sources.

mod api;
mod file;
mod repository;

pub use api::{ApiRequest, ApiValidator};
pub use file::{score_single_file, validate_single_file};
pub use repository::RepositoryValidator;

use crate::config::CertifyConfig;
use crate::engines::EngineRegistry;
use crate::error::Result;
use crate::model::{ApiOutcome, FileValidation, Protocol, RepositoryReport, ValidationType};
use crate::repository::{
    default_fetcher, ArchiveExtractor, ArchiveFetcher, RepositoryDescriptor, RepositoryLocation,
    RepositorySource, ZipExtractor,
};
use std::sync::Arc;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Entry point for all validation use cases
pub struct Certifier {
    config: Arc<CertifyConfig>,
    registry: Arc<EngineRegistry>,
    fetcher: Box<dyn ArchiveFetcher>,
    extractor: Box<dyn ArchiveExtractor>,
}

impl Certifier {
    /// Build from configuration with command engines and the default
    /// fetcher and extractor
    pub fn new(config: CertifyConfig) -> Result<Self> {
        let registry = EngineRegistry::from_config(&config.engines, &config.rules)?;
        Ok(Self::with_registry(config, registry)
            .with_fetcher(default_fetcher(FETCH_TIMEOUT)?))
    }

    /// Build with a caller-supplied engine registry
    pub fn with_registry(config: CertifyConfig, registry: EngineRegistry) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            fetcher: Box::new(crate::repository::OfflineFetcher),
            extractor: Box::new(ZipExtractor),
        }
    }

    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Box<dyn ArchiveFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Box<dyn ArchiveExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub fn config(&self) -> &CertifyConfig {
        &self.config
    }

    fn api_validator(&self) -> ApiValidator {
        ApiValidator::new(Arc::clone(&self.registry), Arc::clone(&self.config))
    }

    /// Validate every API of the repository at `location`.
    ///
    /// Fetch, extraction and metadata parse failures abort the run; anything
    /// going wrong for a single API ends up in that API's error record.
    pub fn validate_repository(
        &self,
        location: &RepositoryLocation,
        validation_type: Option<ValidationType>,
        verbose: bool,
    ) -> Result<RepositoryReport> {
        let validation_type = validation_type.unwrap_or_default();
        tracing::info!("Starting {} validation of {location}", validation_type.name());

        let source = RepositorySource::open(
            location,
            self.fetcher.as_ref(),
            self.extractor.as_ref(),
            self.config.execution.work_dir.as_deref(),
        )?;

        let report = RepositoryDescriptor::discover_with(
            source.root(),
            &self.config.documentation.file_name,
        )
        .map(|descriptor| {
            let validator =
                RepositoryValidator::new(self.api_validator(), Arc::clone(&self.config));
            let outcomes = validator.validate(&descriptor, validation_type);
            RepositoryReport::new(outcomes, verbose).with_diagnostics(descriptor.diagnostics)
        });

        if let Err(e) = source.close() {
            tracing::warn!("Failed to remove extracted repository: {e}");
        }

        let report = report?;
        let failed = report.outcomes.iter().filter(|o| o.is_failed()).count();
        tracing::info!(
            "Validated {} API(s), {failed} failed",
            report.len()
        );
        Ok(report)
    }

    /// Lint one file with the design ruleset of `protocol`
    pub fn validate_single_file(
        &self,
        bytes: &[u8],
        file_name: &str,
        protocol: Protocol,
    ) -> Result<FileValidation> {
        validate_single_file(
            &self.registry,
            self.config.execution.work_dir.as_deref(),
            bytes,
            file_name,
            protocol,
        )
    }

    /// Full score report for one file
    pub fn score_single_file(
        &self,
        bytes: &[u8],
        file_name: &str,
        protocol: Protocol,
        validation_type: Option<ValidationType>,
    ) -> Result<ApiOutcome> {
        score_single_file(
            &self.api_validator(),
            self.config.execution.work_dir.as_deref(),
            bytes,
            file_name,
            protocol,
            validation_type.unwrap_or_default(),
        )
    }
}
