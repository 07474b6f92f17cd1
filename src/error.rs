//! Unified error types for apicert.
//!
//! Errors fall in two groups. Run-level errors (fetch, extract, metadata)
//! abort a whole repository validation. Entry-level errors (file resolution,
//! missing specification, engine failure, timeout) are caught at the API
//! validator boundary and turned into error records.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for apicert operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CertifyError {
    /// The metadata descriptor exists but is not valid YAML
    #[error("Cannot parse metadata descriptor {path:?}: {message}")]
    MetadataParse { path: PathBuf, message: String },

    /// No file name could be derived for an API entry
    #[error("Cannot determine API file name for API '{api}': {reason}")]
    FileResolution { api: String, reason: String },

    /// The resolved specification file is not in the working directory
    #[error("Specification file {file} not found at expected location")]
    SpecNotFound { file: String, path: PathBuf },

    /// The entry's `definition-path` does not exist in the repository
    #[error("Specification file not found in repository: {definition_path}")]
    SourceMissing { definition_path: String },

    /// A rule engine failed or produced an unusable report
    #[error("Rule engine '{engine}' failed ({context}): {source}")]
    Engine {
        engine: String,
        context: String,
        #[source]
        source: EngineErrorKind,
    },

    /// Downloading the repository archive failed
    #[error("Failed to fetch repository from {url}: {message}")]
    Fetch { url: String, message: String },

    /// Unpacking the repository archive failed
    #[error("Failed to extract repository archive: {0}")]
    Extract(String),

    /// A per-entry deadline elapsed
    #[error("Validation of '{api}' timed out after {seconds}s")]
    Timeout { api: String, seconds: u64 },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Specific rule engine error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EngineErrorKind {
    #[error("no engine configured for {0}")]
    NotConfigured(String),

    #[error("failed to launch: {0}")]
    Launch(String),

    #[error("exceeded process timeout of {0}s")]
    ProcessTimeout(u64),

    /// The entry deadline passed before or while the engine ran
    #[error("stopped at the entry deadline")]
    DeadlineExceeded,

    #[error("exited with {status} and no report: {stderr}")]
    Exited { status: String, stderr: String },

    #[error("unreadable report: {0}")]
    InvalidReport(String),

    #[error("unknown severity '{0}'")]
    UnknownSeverity(String),

    #[error("panicked: {0}")]
    Panicked(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for apicert operations
pub type Result<T> = std::result::Result<T, CertifyError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl CertifyError {
    /// Create a rule engine error with context
    pub fn engine(
        engine: impl Into<String>,
        context: impl Into<String>,
        source: EngineErrorKind,
    ) -> Self {
        Self::Engine {
            engine: engine.into(),
            context: context.into(),
            source,
        }
    }

    /// Create a metadata parse error
    pub fn metadata_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MetadataParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file resolution error
    pub fn file_resolution(api: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FileResolution {
            api: api.into(),
            reason: reason.into(),
        }
    }

    /// Create a spec-not-found error
    pub fn spec_not_found(file: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::SpecNotFound {
            file: file.into(),
            path: path.into(),
        }
    }

    /// Create a source-missing error
    pub fn source_missing(definition_path: impl Into<String>) -> Self {
        Self::SourceMissing {
            definition_path: definition_path.into(),
        }
    }

    /// Create a fetch error
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an extract error
    pub fn extract(message: impl Into<String>) -> Self {
        Self::Extract(message.into())
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for CertifyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<zip::result::ZipError> for CertifyError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Extract(err.to_string())
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The context string is prepended to the error's existing context, creating
/// a chain that shows the path through the code.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, only evaluated on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<CertifyError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
///
/// Variants whose message is a fixed contract (resolution, not-found,
/// timeout) are returned unchanged.
fn add_context_to_error(err: CertifyError, new_ctx: &str) -> CertifyError {
    match err {
        CertifyError::Engine {
            engine,
            context: existing,
            source,
        } => CertifyError::Engine {
            engine,
            context: chain_context(new_ctx, &existing),
            source,
        },
        CertifyError::MetadataParse { path, message } => CertifyError::MetadataParse {
            path,
            message: chain_context(new_ctx, &message),
        },
        CertifyError::Fetch { url, message } => CertifyError::Fetch {
            url,
            message: chain_context(new_ctx, &message),
        },
        CertifyError::Extract(msg) => CertifyError::Extract(chain_context(new_ctx, &msg)),
        CertifyError::Io {
            path,
            message,
            source,
        } => CertifyError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        other => other,
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}
