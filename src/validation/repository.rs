//! Batch validation of every API listed in a repository.

use super::api::{ApiRequest, ApiValidator};
use crate::config::CertifyConfig;
use crate::error::CertifyError;
use crate::model::{ApiEntry, ApiErrorRecord, ApiOutcome, ValidationStage, ValidationType};
use crate::repository::{RepositoryDescriptor, WorkArea};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const WORKER_NAME: &str = "apicert-entry";
/// How long a timed-out worker gets to observe its deadline
const WORKER_GRACE: Duration = Duration::from_secs(5);

/// Runs the [`ApiValidator`] once per discovered entry, each inside its own
/// [`WorkArea`].
///
/// One outcome is produced per entry, in discovery order, whether entries run
/// sequentially or in parallel. A failing entry never affects the others.
#[derive(Debug, Clone)]
pub struct RepositoryValidator {
    api: ApiValidator,
    config: Arc<CertifyConfig>,
}

impl RepositoryValidator {
    pub fn new(api: ApiValidator, config: Arc<CertifyConfig>) -> Self {
        Self { api, config }
    }

    /// Validate every entry of `descriptor`
    pub fn validate(
        &self,
        descriptor: &RepositoryDescriptor,
        validation_type: ValidationType,
    ) -> Vec<ApiOutcome> {
        let root = descriptor.root_folder.as_path();
        let documentation = descriptor.documentation_file();
        let run =
            |entry: &ApiEntry| self.validate_entry(root, entry, validation_type, documentation);

        if self.config.execution.parallel {
            tracing::info!("Validating {} API(s) in parallel", descriptor.apis.len());
            descriptor.apis.par_iter().map(run).collect()
        } else {
            descriptor.apis.iter().map(run).collect()
        }
    }

    /// Validate one entry in a fresh working directory, releasing it on every
    /// path
    pub fn validate_entry(
        &self,
        root: &Path,
        entry: &ApiEntry,
        validation_type: ValidationType,
        documentation: Option<&Path>,
    ) -> ApiOutcome {
        let Some(definition_path) = entry.definition_path.as_deref() else {
            return resolution_failure(
                entry,
                &CertifyError::file_resolution(
                    entry.display_name(),
                    "missing 'definition-path' in metadata",
                ),
            );
        };

        let area = match WorkArea::allocate(self.config.execution.work_dir.as_deref()) {
            Ok(area) => area,
            Err(e) => return resolution_failure(entry, &e),
        };

        let outcome = match area.copy_spec(root, definition_path) {
            Ok(_) => self.run_bounded(entry, area.path(), validation_type, documentation),
            Err(e) => resolution_failure(entry, &e),
        };

        let path = area.path().to_path_buf();
        if let Err(e) = area.close() {
            tracing::warn!("Failed to remove working directory {}: {e}", path.display());
        }
        outcome
    }

    /// Run the validator under the configured per-entry deadline.
    ///
    /// The worker thread receives only paths; the working directory guard
    /// stays with the caller. Engines get the deadline and stop there, and
    /// the worker is joined before the caller removes the directory.
    fn run_bounded(
        &self,
        entry: &ApiEntry,
        work_dir: &Path,
        validation_type: ValidationType,
        documentation: Option<&Path>,
    ) -> ApiOutcome {
        let Some(timeout) = self.config.execution.entry_timeout() else {
            let request = ApiRequest::new(entry, work_dir, validation_type)
                .with_documentation(documentation);
            return self.api.validate(request);
        };

        let deadline = Instant::now() + timeout;
        let (tx, rx) = mpsc::channel();
        let api = self.api.clone();
        let owned_entry = entry.clone();
        let owned_dir = work_dir.to_path_buf();
        let owned_doc: Option<PathBuf> = documentation.map(Path::to_path_buf);

        let spawned = std::thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || {
                let request = ApiRequest::new(&owned_entry, &owned_dir, validation_type)
                    .with_documentation(owned_doc.as_deref())
                    .with_deadline(Some(deadline));
                // The receiver is gone when the deadline already passed
                let _ = tx.send(api.validate(request));
            });
        let worker = match spawned {
            Ok(worker) => worker,
            Err(e) => return resolution_failure(entry, &CertifyError::from(e)),
        };

        let timed_out = || {
            let err = CertifyError::Timeout {
                api: entry.display_name().to_string(),
                seconds: timeout.as_secs(),
            };
            tracing::error!("{err}");
            failure(entry, ValidationStage::Linting, &err)
        };

        match rx.recv_timeout(timeout) {
            // An entry that failed because its deadline passed timed out
            Ok(outcome) if outcome.is_failed() && Instant::now() >= deadline => {
                join(worker);
                timed_out()
            }
            Ok(outcome) => {
                join(worker);
                outcome
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                match rx.recv_timeout(WORKER_GRACE) {
                    Ok(_) | Err(mpsc::RecvTimeoutError::Disconnected) => join(worker),
                    Err(mpsc::RecvTimeoutError::Timeout) => tracing::warn!(
                        "Worker for '{}' ignored its deadline; leaving it behind",
                        entry.display_name()
                    ),
                }
                timed_out()
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                join(worker);
                failure(
                    entry,
                    ValidationStage::Linting,
                    &"validation worker exited without a result",
                )
            }
        }
    }
}

fn join(worker: JoinHandle<()>) {
    if worker.join().is_err() {
        tracing::warn!("Validation worker panicked");
    }
}

fn resolution_failure(entry: &ApiEntry, error: &CertifyError) -> ApiOutcome {
    tracing::error!("Skipping API '{}': {error}", entry.display_name());
    ApiErrorRecord::new(
        entry.display_name(),
        entry.definition_path.clone(),
        error.to_string(),
    )
    .at_stage(ValidationStage::ResolvingFile)
    .into()
}

fn failure(entry: &ApiEntry, stage: ValidationStage, error: &dyn std::fmt::Display) -> ApiOutcome {
    ApiErrorRecord::new(
        entry.display_name(),
        entry.definition_path.clone(),
        format!("Validation process failed during {stage}: {error}"),
    )
    .at_stage(stage)
    .into()
}
