//! Rule engine adapters.
//!
//! A [`RuleEngine`] evaluates one specification file and returns issues in
//! its native shape ([`RawIssue`]). The [`EngineRegistry`] holds one
//! [`ProtocolEngines`] per protocol and is resolved by an exhaustive match, so
//! adding a protocol forces every dispatch site to handle it.

mod command;
mod raw;

pub use command::{
    CommandEngine, EngineCommand, ReportStream, DIR_PLACEHOLDER, SPEC_PLACEHOLDER,
};
pub use raw::{
    EslintIssue, MarkdownlintIssue, ProtolintIssue, RawIssue, ReportFormat, SpectralIssue,
    SpectralPosition, SpectralRange,
};

use crate::error::{CertifyError, EngineErrorKind, ErrorContext, Result};
use crate::model::{Issue, Protocol};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Rule set an engine is asked to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ruleset {
    RestGeneral,
    RestSecurity,
    EventGeneral,
    Grpc,
    Graphql,
    Documentation,
}

impl Ruleset {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RestGeneral => "rest-general",
            Self::RestSecurity => "rest-security",
            Self::EventGeneral => "event-general",
            Self::Grpc => "grpc",
            Self::Graphql => "graphql",
            Self::Documentation => "documentation",
        }
    }
}

impl fmt::Display for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-call options passed to an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintOptions {
    /// Directory holding the specification; engines run inside it
    pub work_dir: PathBuf,
    pub ruleset: Ruleset,
    /// Point at which the entry being validated times out
    pub deadline: Option<Instant>,
}

impl LintOptions {
    pub fn new(work_dir: impl Into<PathBuf>, ruleset: Ruleset) -> Self {
        Self {
            work_dir: work_dir.into(),
            ruleset,
            deadline: None,
        }
    }

    #[must_use]
    pub const fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }
}

/// A linter that evaluates one specification file.
///
/// Implementations hold no mutable state and are shared across worker
/// threads. Engines that do blocking work should give up once
/// [`LintOptions::deadline`] has passed.
pub trait RuleEngine: Send + Sync {
    /// Engine identifier used in logs and errors
    fn name(&self) -> &str;

    /// Lint the file at `spec_path`
    fn lint(&self, spec_path: &Path, options: &LintOptions) -> Result<Vec<RawIssue>>;
}

/// An engine together with the number of rules its ruleset applies
#[derive(Clone)]
pub struct EngineSlot {
    pub engine: Arc<dyn RuleEngine>,
    pub rule_count: u32,
    pub ruleset: Ruleset,
}

impl fmt::Debug for EngineSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineSlot")
            .field("engine", &self.engine.name())
            .field("rule_count", &self.rule_count)
            .field("ruleset", &self.ruleset)
            .finish()
    }
}

impl EngineSlot {
    pub fn new(engine: Arc<dyn RuleEngine>, ruleset: Ruleset, rule_count: u32) -> Self {
        Self {
            engine,
            rule_count,
            ruleset,
        }
    }

    /// Lint `spec_path` and normalize every issue against `file_name`.
    ///
    /// The first issue with an unknown severity fails the whole call.
    pub fn lint_issues(
        &self,
        spec_path: &Path,
        file_name: &str,
        work_dir: &Path,
    ) -> Result<Vec<Issue>> {
        self.lint_issues_until(spec_path, file_name, work_dir, None)
    }

    /// [`Self::lint_issues`] bounded by an entry deadline.
    ///
    /// A panicking engine is reported as [`EngineErrorKind::Panicked`].
    pub fn lint_issues_until(
        &self,
        spec_path: &Path,
        file_name: &str,
        work_dir: &Path,
        deadline: Option<Instant>,
    ) -> Result<Vec<Issue>> {
        let options = LintOptions::new(work_dir, self.ruleset).with_deadline(deadline);
        let raw = panic::catch_unwind(AssertUnwindSafe(|| self.engine.lint(spec_path, &options)))
            .unwrap_or_else(|payload| {
                Err(CertifyError::engine(
                    self.engine.name(),
                    format!("linting {}", spec_path.display()),
                    EngineErrorKind::Panicked(panic_message(payload.as_ref())),
                ))
            })
            .with_context(|| format!("ruleset {}", self.ruleset))?;

        raw.into_iter()
            .map(|issue| issue.normalize(file_name))
            .collect()
    }
}

/// Text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Engines serving one protocol
#[derive(Debug, Clone)]
pub struct ProtocolEngines {
    pub design: EngineSlot,
    /// Only protocols that support security scoring carry a security slot
    pub security: Option<EngineSlot>,
}

impl ProtocolEngines {
    #[must_use]
    pub const fn new(design: EngineSlot) -> Self {
        Self {
            design,
            security: None,
        }
    }

    #[must_use]
    pub fn with_security(mut self, security: EngineSlot) -> Self {
        self.security = Some(security);
        self
    }
}

/// One engine set per protocol plus the optional documentation engine
#[derive(Debug, Clone)]
pub struct EngineRegistry {
    pub rest: ProtocolEngines,
    pub event: ProtocolEngines,
    pub grpc: ProtocolEngines,
    pub graphql: ProtocolEngines,
    pub documentation: Option<EngineSlot>,
}

impl EngineRegistry {
    #[must_use]
    pub const fn for_protocol(&self, protocol: Protocol) -> &ProtocolEngines {
        match protocol {
            Protocol::Rest => &self.rest,
            Protocol::Event => &self.event,
            Protocol::Grpc => &self.grpc,
            Protocol::Graphql => &self.graphql,
        }
    }

    /// Build command engines from configuration.
    ///
    /// Every protocol needs a design engine; REST additionally needs a
    /// security engine.
    pub fn from_config(
        engines: &crate::config::EnginesConfig,
        rules: &crate::config::RulesConfig,
    ) -> Result<Self> {
        let slot = |name: &str, command: Option<&EngineCommand>, ruleset: Ruleset, count: u32| {
            command
                .map(|c| {
                    let engine = Arc::new(CommandEngine::new(name, c.clone()));
                    EngineSlot::new(engine, ruleset, count)
                })
                .ok_or_else(|| {
                    CertifyError::engine(
                        name,
                        "building registry",
                        EngineErrorKind::NotConfigured(ruleset.to_string()),
                    )
                })
        };

        let rest = ProtocolEngines::new(slot(
            "rest-design",
            engines.rest_design.as_ref(),
            Ruleset::RestGeneral,
            rules.rest_general,
        )?)
        .with_security(slot(
            "rest-security",
            engines.rest_security.as_ref(),
            Ruleset::RestSecurity,
            rules.rest_security,
        )?);
        let event = ProtocolEngines::new(slot(
            "event-design",
            engines.event.as_ref(),
            Ruleset::EventGeneral,
            rules.event_design_total(),
        )?);
        let grpc = ProtocolEngines::new(slot(
            "grpc-design",
            engines.grpc.as_ref(),
            Ruleset::Grpc,
            rules.grpc,
        )?);
        let graphql = ProtocolEngines::new(slot(
            "graphql-design",
            engines.graphql.as_ref(),
            Ruleset::Graphql,
            rules.graphql,
        )?);
        let documentation = engines.documentation.as_ref().map(|c| {
            EngineSlot::new(
                Arc::new(CommandEngine::new("documentation", c.clone())),
                Ruleset::Documentation,
                rules.documentation,
            )
        });

        Ok(Self {
            rest,
            event,
            grpc,
            graphql,
            documentation,
        })
    }
}
