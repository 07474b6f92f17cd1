//! Verify command handler: design lint of a single file.

use super::output::{write_json, OutputTarget};
use super::{detect_protocol, exit_codes, file_name_of};
use crate::model::Protocol;
use crate::validation::Certifier;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Run the verify command
pub fn run_verify(
    certifier: &Certifier,
    file: &Path,
    protocol: Option<Protocol>,
    output_file: Option<PathBuf>,
    quiet: bool,
) -> Result<i32> {
    let bytes = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let protocol = protocol.unwrap_or_else(|| detect_protocol(file, &bytes));
    let file_name = file_name_of(file)?;

    let validation = certifier.validate_single_file(&bytes, &file_name, protocol)?;
    write_json(&validation, &OutputTarget::from_option(output_file), quiet)?;

    Ok(if validation.has_errors {
        exit_codes::ERRORS_FOUND
    } else {
        exit_codes::SUCCESS
    })
}
