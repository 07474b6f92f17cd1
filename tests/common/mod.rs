//! Shared fixtures for integration tests: in-process rule engines and a
//! repository builder.

#![allow(dead_code)]

use apicert::engines::{
    EngineSlot, LintOptions, ProtocolEngines, RawIssue, Ruleset, SpectralIssue,
};
use apicert::{EngineRegistry, Result, RuleEngine};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

// ============================================================================
// Fake engines
// ============================================================================

/// Reports issues written into the spec file itself.
///
/// Each line `issue: <severity>` becomes one Spectral-style issue with that
/// numeric severity; `panic` panics, `sleep: <ms>` sleeps.
pub struct ScriptedEngine {
    pub calls: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl RuleEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn lint(&self, spec_path: &Path, _options: &LintOptions) -> Result<Vec<RawIssue>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let content = std::fs::read_to_string(spec_path)?;
        let mut issues = Vec::new();
        for line in content.lines().map(str::trim) {
            if line == "panic" {
                panic!("engine crashed on {}", spec_path.display());
            }
            if let Some(ms) = line.strip_prefix("sleep: ") {
                let ms: u64 = ms.parse().expect("sleep millis");
                std::thread::sleep(Duration::from_millis(ms));
            }
            if let Some(severity) = line.strip_prefix("issue: ") {
                issues.push(RawIssue::Spectral(SpectralIssue {
                    code: format!("scripted-{severity}"),
                    message: format!("scripted issue with severity {severity}"),
                    severity: severity.parse().expect("severity"),
                    range: None,
                    path: Vec::new(),
                }));
            }
        }
        Ok(issues)
    }
}

/// Registry using one engine for every slot with the default rule counts
pub fn registry_with(engine: Arc<dyn RuleEngine>) -> EngineRegistry {
    let slot = |ruleset, count| EngineSlot::new(Arc::clone(&engine), ruleset, count);
    EngineRegistry {
        rest: ProtocolEngines::new(slot(Ruleset::RestGeneral, 42))
            .with_security(slot(Ruleset::RestSecurity, 15)),
        event: ProtocolEngines::new(slot(Ruleset::EventGeneral, 18)),
        grpc: ProtocolEngines::new(slot(Ruleset::Grpc, 33)),
        graphql: ProtocolEngines::new(slot(Ruleset::Graphql, 20)),
        documentation: Some(slot(Ruleset::Documentation, 40)),
    }
}

// ============================================================================
// Repository fixtures
// ============================================================================

/// A repository checkout on disk
pub struct RepoFixture {
    pub dir: TempDir,
}

impl RepoFixture {
    pub fn new(metadata: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("metadata.yml"), metadata).expect("write metadata");
        Self { dir }
    }

    pub fn with_file(self, relative: &str, content: &str) -> Self {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        std::fs::write(path, content).expect("write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Number of entries directly inside `dir`
pub fn entry_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).expect("read_dir").count()
}
