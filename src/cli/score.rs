//! Score command handler: full score report for a single file.

use super::output::{write_json, OutputTarget};
use super::{detect_protocol, exit_codes, file_name_of};
use crate::model::{Protocol, ValidationType};
use crate::validation::Certifier;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Run the score command
pub fn run_score(
    certifier: &Certifier,
    file: &Path,
    protocol: Option<Protocol>,
    validation_type: Option<ValidationType>,
    output_file: Option<PathBuf>,
    quiet: bool,
) -> Result<i32> {
    let bytes = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let protocol = protocol.unwrap_or_else(|| detect_protocol(file, &bytes));
    let file_name = file_name_of(file)?;

    let outcome = certifier.score_single_file(&bytes, &file_name, protocol, validation_type)?;
    if let Some(record) = outcome.as_failed() {
        tracing::error!("Scoring failed: {}", record.error);
    }
    write_json(&outcome, &OutputTarget::from_option(output_file), quiet)?;

    Ok(if outcome.has_errors() {
        exit_codes::ERRORS_FOUND
    } else {
        exit_codes::SUCCESS
    })
}
