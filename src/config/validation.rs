//! Configuration validation.
//!
//! Provides validation traits and implementations for all configuration types.

use super::types::{CertifyConfig, EnginesConfig, ExecutionConfig, ScoringConfig};
use crate::scoring::DimensionWeights;

const WEIGHT_TOLERANCE: f64 = 1e-6;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for CertifyConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.scoring.validate());
        errors.extend(self.execution.validate());
        errors.extend(self.engines.validate());

        if self.documentation.enabled && self.documentation.file_name.trim().is_empty() {
            errors.push(ConfigError::new(
                "documentation.file_name",
                "File name must not be empty when documentation is enabled",
            ));
        }

        errors
    }
}

impl Validatable for ScoringConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let severity = &self.severity;

        for (name, value) in [
            ("error", severity.error),
            ("warn", severity.warn),
            ("info", severity.info),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(ConfigError::new(
                    format!("scoring.severity.{name}"),
                    format!("Weight must be a non-negative number, got {value}"),
                ));
            }
        }
        if severity.error <= 0.0 {
            errors.push(ConfigError::new(
                "scoring.severity.error",
                "ERROR weight must be greater than 0",
            ));
        }
        if severity.warn > severity.error || severity.info > severity.warn {
            errors.push(ConfigError::new(
                "scoring.severity",
                format!(
                    "Weights must not increase as severity decreases (error {}, warn {}, info {})",
                    severity.error, severity.warn, severity.info
                ),
            ));
        }

        errors.extend(validate_weights(
            "scoring.weights.with_security",
            &self.weights.with_security,
        ));
        errors.extend(validate_weights(
            "scoring.weights.without_security",
            &self.weights.without_security,
        ));
        if self.weights.without_security.security != 0.0 {
            errors.push(ConfigError::new(
                "scoring.weights.without_security.security",
                "Security carries no weight for protocols without security scoring",
            ));
        }

        errors
    }
}

fn validate_weights(field: &str, weights: &DimensionWeights) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    for (name, value) in [
        ("design", weights.design),
        ("security", weights.security),
        ("documentation", weights.documentation),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::new(
                format!("{field}.{name}"),
                format!("Weight must be between 0.0 and 1.0, got {value}"),
            ));
        }
    }
    let total = weights.total();
    if (total - 1.0).abs() > WEIGHT_TOLERANCE {
        errors.push(ConfigError::new(
            field,
            format!("Weights must sum to 1.0, got {total}"),
        ));
    }
    errors
}

impl Validatable for ExecutionConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.entry_timeout_secs == Some(0) {
            errors.push(ConfigError::new(
                "execution.entry_timeout_secs",
                "Timeout must be at least 1 second; omit it to disable",
            ));
        }
        if let Some(dir) = &self.work_dir {
            if !dir.is_dir() {
                errors.push(ConfigError::new(
                    "execution.work_dir",
                    format!("Directory does not exist: {}", dir.display()),
                ));
            }
        }
        errors
    }
}

impl Validatable for EnginesConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for (field, command) in self.slots() {
            if command.program.trim().is_empty() {
                errors.push(ConfigError::new(
                    format!("{field}.program"),
                    "Program must not be empty",
                ));
            }
            if command.timeout_secs == 0 {
                errors.push(ConfigError::new(
                    format!("{field}.timeout_secs"),
                    "Process timeout must be at least 1 second",
                ));
            }
        }
        for (field, present) in [
            ("engines.rest_design", self.rest_design.is_some()),
            ("engines.rest_security", self.rest_security.is_some()),
            ("engines.event", self.event.is_some()),
            ("engines.grpc", self.grpc.is_some()),
            ("engines.graphql", self.graphql.is_some()),
        ] {
            if !present {
                errors.push(ConfigError::new(field, "Engine command is required"));
            }
        }
        errors
    }
}
