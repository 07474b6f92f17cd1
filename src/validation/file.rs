//! Single-file use cases: lint or score one specification without a
//! repository around it.

use super::api::{ApiRequest, ApiValidator};
use crate::engines::EngineRegistry;
use crate::error::{CertifyError, Result};
use crate::model::{ApiEntry, ApiOutcome, FileValidation, Protocol, ValidationType};
use crate::repository::WorkArea;
use std::path::{Component, Path};

/// Lint `bytes` with the design ruleset of `protocol` only
pub fn validate_single_file(
    registry: &EngineRegistry,
    work_parent: Option<&Path>,
    bytes: &[u8],
    file_name: &str,
    protocol: Protocol,
) -> Result<FileValidation> {
    tracing::info!("Validating single {protocol} file {file_name}");
    let area = stage_file(work_parent, bytes, file_name)?;
    let slot = &registry.for_protocol(protocol).design;
    let issues = slot.lint_issues(&area.path().join(file_name), file_name, area.path());
    close_quietly(area);

    let validation = FileValidation::new(issues?);
    tracing::info!(
        "Found {} issue(s){}",
        validation.issues.len(),
        if validation.has_errors { ", including errors" } else { "" }
    );
    Ok(validation)
}

/// Produce a full score report for `bytes`, skipping repository discovery
pub fn score_single_file(
    validator: &ApiValidator,
    work_parent: Option<&Path>,
    bytes: &[u8],
    file_name: &str,
    protocol: Protocol,
    validation_type: ValidationType,
) -> Result<ApiOutcome> {
    let area = stage_file(work_parent, bytes, file_name)?;
    let name = Path::new(file_name)
        .file_stem()
        .map_or_else(|| file_name.to_string(), |s| s.to_string_lossy().into_owned());
    let entry = ApiEntry::new(name, protocol)
        .with_definition_path(file_name)
        .with_definition_file(file_name);

    let outcome = validator.validate(ApiRequest::new(&entry, area.path(), validation_type));
    close_quietly(area);
    Ok(outcome)
}

/// Write the submitted content into a fresh working area
fn stage_file(work_parent: Option<&Path>, bytes: &[u8], file_name: &str) -> Result<WorkArea> {
    let mut components = Path::new(file_name).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !plain {
        return Err(CertifyError::file_resolution(
            file_name,
            "file name must not contain directories",
        ));
    }

    let area = WorkArea::allocate(work_parent)?;
    let path = area.path().join(file_name);
    std::fs::write(&path, bytes).map_err(|e| CertifyError::io(&path, e))?;
    Ok(area)
}

fn close_quietly(area: WorkArea) {
    let path = area.path().to_path_buf();
    if let Err(e) = area.close() {
        tracing::warn!("Failed to remove working directory {}: {e}", path.display());
    }
}
