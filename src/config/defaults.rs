//! Default values and linter commands.

use crate::engines::{EngineCommand, ReportFormat, ReportStream};

/// Rules in the REST design ruleset
pub const REST_GENERAL_RULES: u32 = 42;
/// Rules in the REST security ruleset
pub const REST_SECURITY_RULES: u32 = 15;
/// Rules in the AsyncAPI ruleset
pub const EVENT_GENERAL_RULES: u32 = 12;
/// Rules in the Avro schema ruleset
pub const AVRO_GENERAL_RULES: u32 = 6;
/// Rules in the protobuf ruleset
pub const GRPC_RULES: u32 = 33;
/// GraphQL rules, excluding INFO-only ones
pub const GRAPHQL_RULES: u32 = 20;
/// Rules in the markdown ruleset
pub const DOCUMENTATION_RULES: u32 = 40;

/// Per-entry deadline
pub const ENTRY_TIMEOUT_SECS: u64 = 300;

/// Markdown file scored for documentation
pub const DOCUMENTATION_FILE: &str = "README.md";

/// Metadata descriptor names, in lookup order
pub const METADATA_FILES: &[&str] = &["metadata.yml", "metadata.yaml"];

/// Spectral for OpenAPI and AsyncAPI; picks up `.spectral.yaml` from the
/// working directory
#[must_use]
pub fn spectral_command() -> EngineCommand {
    EngineCommand::new(
        "spectral",
        &["lint", "{spec}", "--format", "json", "--quiet"],
        ReportFormat::Spectral,
    )
}

#[must_use]
pub fn protolint_command() -> EngineCommand {
    EngineCommand::new(
        "protolint",
        &["lint", "-reporter", "json", "{spec}"],
        ReportFormat::Protolint,
    )
}

#[must_use]
pub fn eslint_command() -> EngineCommand {
    EngineCommand::new(
        "eslint",
        &["--format", "json", "{spec}"],
        ReportFormat::Eslint,
    )
}

#[must_use]
pub fn markdownlint_command() -> EngineCommand {
    EngineCommand::new("markdownlint", &["--json", "{spec}"], ReportFormat::Markdownlint)
        .reporting_on(ReportStream::Stderr)
}
