//! **Quality certification for API specifications.**
//!
//! `apicert` scores machine-readable API descriptions (REST/OpenAPI,
//! event/AsyncAPI, gRPC/Protobuf and GraphQL) found in a repository or
//! submitted as a single file. Each API gets a 0-100 score and a letter rating
//! per quality dimension (design, security, documentation) plus an overall
//! score computed with protocol-dependent weights.
//!
//! Linting itself is delegated to rule engines. The crate ships a
//! [`CommandEngine`](engines::CommandEngine) that runs an external linter
//! (Spectral, protolint, graphql-eslint, markdownlint) and decodes its JSON
//! report; any type implementing [`RuleEngine`] can take its place.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: API entries, canonical [`Issue`]s and the result shapes
//!   (full results, summaries, error records).
//! - **[`engines`]**: the [`RuleEngine`] capability, raw report formats and
//!   the per-protocol [`EngineRegistry`].
//! - **[`scoring`]**: issues to scores, scores to ratings, weighted averages.
//! - **[`repository`]**: fetching, extracting and discovering repositories;
//!   per-API working directories.
//! - **[`validation`]**: the per-API state machine, batch orchestration and
//!   the [`Certifier`] facade.
//! - **[`config`]**: typed configuration loaded from YAML.
//!
//! ## Getting Started
//!
//! ```no_run
//! use apicert::{CertifyConfig, Certifier, RepositoryLocation};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let certifier = Certifier::new(CertifyConfig::default())?;
//!     let location = RepositoryLocation::parse("https://example.com/pets-api.zip");
//!     let report = certifier.validate_repository(&location, None, false)?;
//!
//!     for summary in report.summaries() {
//!         println!(
//!             "{}: {:?} {:?}",
//!             summary.api_name, summary.score, summary.rating
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Scoring a single file
//!
//! ```no_run
//! use apicert::{CertifyConfig, Certifier, Protocol};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let certifier = Certifier::new(CertifyConfig::default())?;
//!     let bytes = std::fs::read("service.proto")?;
//!     let outcome = certifier.score_single_file(&bytes, "service.proto", Protocol::Grpc, None)?;
//!     println!("{}", serde_json::to_string_pretty(&outcome)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `fetch` (default): download repository archives over HTTP(S) with
//!   `reqwest`. Without it only local archives and directories are accepted.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::similar_names
)]

pub mod cli;
pub mod config;
pub mod engines;
pub mod error;
pub mod model;
pub mod repository;
pub mod scoring;
pub mod validation;

// Re-export main types for convenience
pub use config::{CertifyConfig, CertifyConfigBuilder, ConfigError, Validatable};
pub use engines::{CommandEngine, EngineCommand, EngineRegistry, RawIssue, RuleEngine};
pub use error::{CertifyError, ErrorContext, Result};
pub use model::{
    ApiEntry, ApiErrorRecord, ApiOutcome, ApiValidationResult, Dimension, FileValidation,
    FullResult, Issue, Protocol, RepositoryReport, Severity, SummaryResult, ValidationType,
};
pub use repository::{RepositoryDescriptor, RepositoryLocation};
pub use scoring::{calculate_average_score, calculate_rating, score_linting, Rating};
pub use validation::{ApiValidator, Certifier, RepositoryValidator};
