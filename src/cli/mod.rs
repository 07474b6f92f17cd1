//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler returns the process exit code.

mod output;
mod score;
mod validate;
mod verify;

pub use output::{write_json, OutputTarget};
pub use score::run_score;
pub use validate::run_validate;
pub use verify::run_verify;

use crate::model::Protocol;
use std::path::Path;

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Every API validated without ERROR issues
    pub const SUCCESS: i32 = 0;
    /// At least one API failed or reported ERROR issues
    pub const ERRORS_FOUND: i32 = 1;
    /// The run itself failed
    pub const ERROR: i32 = 3;
}

/// Guess the protocol of a specification file from its name and content.
///
/// `.proto` is gRPC, `.graphql`/`.gql` GraphQL; YAML or JSON documents with an
/// `asyncapi` key are event APIs, anything else REST.
#[must_use]
pub fn detect_protocol(path: &Path, content: &[u8]) -> Protocol {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "proto" => Protocol::Grpc,
        "graphql" | "graphqls" | "gql" => Protocol::Graphql,
        _ => {
            let head = String::from_utf8_lossy(&content[..content.len().min(4096)]);
            let is_async = head.lines().any(|line| {
                let line = line.trim_start().trim_start_matches(['{', '"']);
                line.starts_with("asyncapi")
            });
            if is_async {
                Protocol::Event
            } else {
                Protocol::Rest
            }
        }
    }
}

/// Base name of `path` as UTF-8 text
pub(crate) fn file_name_of(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow::anyhow!("{} does not name a file", path.display()))
}
