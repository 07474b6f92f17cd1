//! Configuration types for certification runs.

use super::defaults;
use crate::engines::EngineCommand;
use crate::scoring::{SeverityWeights, WeightTable};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Top-level configuration, loaded from a YAML file or built in code.
///
/// Immutable once a run starts; validators share it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CertifyConfig {
    /// Severity and dimension weights
    pub scoring: ScoringConfig,
    /// Number of rules each ruleset applies
    pub rules: RulesConfig,
    /// Documentation dimension
    pub documentation: DocumentationConfig,
    /// Scheduling, timeouts and working directories
    pub execution: ExecutionConfig,
    /// Linter command per protocol slot
    pub engines: EnginesConfig,
}

impl CertifyConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> CertifyConfigBuilder {
        CertifyConfigBuilder::default()
    }
}

// ============================================================================
// Builder for CertifyConfig
// ============================================================================

/// Builder for constructing `CertifyConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct CertifyConfigBuilder {
    config: CertifyConfig,
}

impl CertifyConfigBuilder {
    /// Validate entries on the rayon pool instead of one by one.
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.config.execution.parallel = parallel;
        self
    }

    /// Per-entry deadline; `None` disables it.
    pub const fn entry_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.config.execution.entry_timeout_secs = secs;
        self
    }

    /// Parent directory for working directories.
    pub fn work_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config.execution.work_dir = dir;
        self
    }

    /// Enable documentation scoring.
    pub const fn documentation(mut self, enabled: bool) -> Self {
        self.config.documentation.enabled = enabled;
        self
    }

    pub const fn count_unscored_documentation(mut self, count: bool) -> Self {
        self.config.scoring.count_unscored_documentation = count;
        self
    }

    pub const fn severity_weights(mut self, weights: SeverityWeights) -> Self {
        self.config.scoring.severity = weights;
        self
    }

    pub const fn dimension_weights(mut self, weights: WeightTable) -> Self {
        self.config.scoring.weights = weights;
        self
    }

    pub const fn rules(mut self, rules: RulesConfig) -> Self {
        self.config.rules = rules;
        self
    }

    pub fn engines(mut self, engines: EnginesConfig) -> Self {
        self.config.engines = engines;
        self
    }

    pub fn build(self) -> CertifyConfig {
        self.config
    }
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScoringConfig {
    /// Deduction per issue severity
    pub severity: SeverityWeights,
    /// Dimension weights with and without security
    pub weights: WeightTable,
    /// Average documentation in at score 0 when it was not evaluated.
    /// When off, its weight is spread over the other dimensions.
    pub count_unscored_documentation: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            severity: SeverityWeights::default(),
            weights: WeightTable::default(),
            count_unscored_documentation: true,
        }
    }
}

/// Applicable rule count per ruleset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RulesConfig {
    pub rest_general: u32,
    pub rest_security: u32,
    pub event_general: u32,
    /// Avro schema rules applied alongside the event ruleset
    pub avro_general: u32,
    pub grpc: u32,
    pub graphql: u32,
    pub documentation: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            rest_general: defaults::REST_GENERAL_RULES,
            rest_security: defaults::REST_SECURITY_RULES,
            event_general: defaults::EVENT_GENERAL_RULES,
            avro_general: defaults::AVRO_GENERAL_RULES,
            grpc: defaults::GRPC_RULES,
            graphql: defaults::GRAPHQL_RULES,
            documentation: defaults::DOCUMENTATION_RULES,
        }
    }
}

impl RulesConfig {
    /// Rules applied to an AsyncAPI document
    #[must_use]
    pub const fn event_design_total(&self) -> u32 {
        self.event_general.saturating_add(self.avro_general)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DocumentationConfig {
    /// Score documentation instead of reporting it as N/A
    pub enabled: bool,
    /// Markdown file looked up at the repository root
    pub file_name: String,
}

impl Default for DocumentationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            file_name: defaults::DOCUMENTATION_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Validate entries concurrently
    pub parallel: bool,
    /// Deadline per entry in seconds (omit to disable)
    pub entry_timeout_secs: Option<u64>,
    /// Parent directory for extraction and working directories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            entry_timeout_secs: Some(defaults::ENTRY_TIMEOUT_SECS),
            work_dir: None,
        }
    }
}

impl ExecutionConfig {
    #[must_use]
    pub fn entry_timeout(&self) -> Option<Duration> {
        self.entry_timeout_secs.map(Duration::from_secs)
    }
}

/// Linter commands; a missing design slot makes the registry unusable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EnginesConfig {
    pub rest_design: Option<EngineCommand>,
    pub rest_security: Option<EngineCommand>,
    pub event: Option<EngineCommand>,
    pub grpc: Option<EngineCommand>,
    pub graphql: Option<EngineCommand>,
    pub documentation: Option<EngineCommand>,
}

impl Default for EnginesConfig {
    fn default() -> Self {
        Self {
            rest_design: Some(defaults::spectral_command()),
            rest_security: Some(defaults::spectral_command()),
            event: Some(defaults::spectral_command()),
            grpc: Some(defaults::protolint_command()),
            graphql: Some(defaults::eslint_command()),
            documentation: Some(defaults::markdownlint_command()),
        }
    }
}

impl EnginesConfig {
    /// Configured commands with their slot names
    pub fn slots(&self) -> impl Iterator<Item = (&'static str, &EngineCommand)> {
        [
            ("engines.rest_design", self.rest_design.as_ref()),
            ("engines.rest_security", self.rest_security.as_ref()),
            ("engines.event", self.event.as_ref()),
            ("engines.grpc", self.grpc.as_ref()),
            ("engines.graphql", self.graphql.as_ref()),
            ("engines.documentation", self.documentation.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, command)| command.map(|c| (name, c)))
    }
}
