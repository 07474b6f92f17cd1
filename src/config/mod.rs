//! Configuration module for apicert.
//!
//! This module provides:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use apicert::config::{CertifyConfig, Validatable};
//!
//! let config = CertifyConfig::builder()
//!     .parallel(true)
//!     .entry_timeout_secs(Some(120))
//!     .build();
//! assert!(config.is_valid());
//!
//! use apicert::config::load_or_default;
//! let (config, loaded_from) = load_or_default(None)?;
//! ```
//!
//! # Configuration File
//!
//! Place a `.apicert.yaml` file in your project root or `~/.config/apicert/`:
//!
//! ```yaml
//! execution:
//!   parallel: true
//!   entry_timeout_secs: 120
//! engines:
//!   grpc:
//!     program: protolint
//!     args: [lint, -reporter, json, "{spec}"]
//!     format: protolint
//! ```

mod defaults;
mod file;
mod types;
mod validation;

pub use defaults::{
    DOCUMENTATION_FILE, ENTRY_TIMEOUT_SECS, METADATA_FILES, REST_GENERAL_RULES,
    REST_SECURITY_RULES,
};
pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};
pub use types::{
    CertifyConfig, CertifyConfigBuilder, DocumentationConfig, EnginesConfig, ExecutionConfig,
    RulesConfig, ScoringConfig,
};
pub use validation::{ConfigError, Validatable};

/// Generate a JSON Schema for the `CertifyConfig` file format.
///
/// Editors can use it for validation and autocompletion of
/// `.apicert.yaml` files.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(CertifyConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
