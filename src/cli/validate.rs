//! Validate command handler.
//!
//! Implements the `validate` subcommand: certify every API in a repository.

use super::exit_codes;
use super::output::{write_json, OutputTarget};
use crate::model::ValidationType;
use crate::repository::RepositoryLocation;
use crate::validation::Certifier;
use anyhow::Result;
use std::path::PathBuf;

/// Run the validate command
pub fn run_validate(
    certifier: &Certifier,
    location: &str,
    validation_type: Option<ValidationType>,
    verbose_output: bool,
    output_file: Option<PathBuf>,
    quiet: bool,
) -> Result<i32> {
    let location = RepositoryLocation::parse(location);
    let report = certifier.validate_repository(&location, validation_type, verbose_output)?;

    tracing::debug!("{} discovery note(s)", report.diagnostics.len());
    write_json(&report, &OutputTarget::from_option(output_file), quiet)?;

    Ok(if report.has_errors() {
        exit_codes::ERRORS_FOUND
    } else {
        exit_codes::SUCCESS
    })
}
