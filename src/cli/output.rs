//! Output writing for CLI handlers.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Output target for reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to stdout
    Stdout,
    /// Write to a file
    File(PathBuf),
}

impl OutputTarget {
    /// Create output target from optional path
    #[must_use]
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdout, Self::File)
    }
}

/// Serialize `value` as pretty JSON to the target
pub fn write_json<T: Serialize>(value: &T, target: &OutputTarget, quiet: bool) -> Result<()> {
    let content = serde_json::to_string_pretty(value).context("failed to serialize report")?;
    match target {
        OutputTarget::Stdout => {
            println!("{content}");
            Ok(())
        }
        OutputTarget::File(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            if !quiet {
                tracing::info!("Report written to {}", path.display());
            }
            Ok(())
        }
    }
}
