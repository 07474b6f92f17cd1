//! Rule engine backed by an external linter command.

use super::raw::{RawIssue, ReportFormat};
use super::{LintOptions, RuleEngine};
use crate::error::{CertifyError, EngineErrorKind, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;

/// Placeholder replaced by the specification path
pub const SPEC_PLACEHOLDER: &str = "{spec}";
/// Placeholder replaced by the working directory
pub const DIR_PLACEHOLDER: &str = "{dir}";

/// Stream the linter writes its JSON report to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportStream {
    #[default]
    Stdout,
    /// `markdownlint --json` reports on stderr
    Stderr,
}

/// How to invoke one linter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EngineCommand {
    /// Executable, looked up on `PATH`
    pub program: String,
    /// Arguments; `{spec}` and `{dir}` are substituted
    pub args: Vec<String>,
    /// Shape of the JSON report
    pub format: ReportFormat,
    pub report_stream: ReportStream,
    /// Kill the process after this many seconds
    pub timeout_secs: u64,
}

impl Default for EngineCommand {
    fn default() -> Self {
        Self {
            program: String::new(),
            args: vec![SPEC_PLACEHOLDER.to_string()],
            format: ReportFormat::Spectral,
            report_stream: ReportStream::Stdout,
            timeout_secs: 60,
        }
    }
}

impl EngineCommand {
    pub fn new(program: impl Into<String>, args: &[&str], format: ReportFormat) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            format,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn reporting_on(mut self, stream: ReportStream) -> Self {
        self.report_stream = stream;
        self
    }

    fn render_args(&self, spec_path: &Path, work_dir: &Path) -> Vec<String> {
        let spec = spec_path.to_string_lossy();
        let dir = work_dir.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(SPEC_PLACEHOLDER, &spec)
                    .replace(DIR_PLACEHOLDER, &dir)
            })
            .collect()
    }
}

/// Runs a linter process per lint call and decodes its JSON report.
///
/// Linters exit non-zero when they find issues, so the exit status only
/// matters when stdout does not hold a decodable report.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    name: String,
    command: EngineCommand,
}

impl CommandEngine {
    pub fn new(name: impl Into<String>, command: EngineCommand) -> Self {
        Self {
            name: name.into(),
            command,
        }
    }

    #[must_use]
    pub const fn command(&self) -> &EngineCommand {
        &self.command
    }

    fn error(&self, context: impl Into<String>, kind: EngineErrorKind) -> CertifyError {
        CertifyError::engine(&self.name, context, kind)
    }

    /// Time the child may run and the error reported when it runs out
    fn budget(&self, deadline: Option<Instant>) -> (Duration, EngineErrorKind) {
        let process = Duration::from_secs(self.command.timeout_secs);
        match deadline.map(|d| d.saturating_duration_since(Instant::now())) {
            Some(left) if left < process => (left, EngineErrorKind::DeadlineExceeded),
            _ => (process, EngineErrorKind::ProcessTimeout(self.command.timeout_secs)),
        }
    }

    fn run(&self, spec_path: &Path, options: &LintOptions) -> Result<ProcessOutput> {
        let (budget, expired) = self.budget(options.deadline);
        if budget.is_zero() && matches!(expired, EngineErrorKind::DeadlineExceeded) {
            return Err(self.error(format!("linting {}", spec_path.display()), expired));
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| self.error("starting runtime", EngineErrorKind::Launch(e.to_string())))?;
        runtime.block_on(self.run_until(spec_path, &options.work_dir, budget, expired))
    }

    /// Run the linter for at most `budget`.
    ///
    /// The child leads its own process group. On expiry the whole group is
    /// killed and the leader reaped; pipes still held by stray descendants
    /// are dropped rather than drained.
    async fn run_until(
        &self,
        spec_path: &Path,
        work_dir: &Path,
        budget: Duration,
        expired: EngineErrorKind,
    ) -> Result<ProcessOutput> {
        let args = self.render_args(spec_path, work_dir);
        tracing::debug!("Launching {} for engine {}: {args:?}", self.command.program, self.name);

        let mut command = std::process::Command::new(&self.command.program);
        command
            .args(&args)
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = tokio::process::Command::from(command)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                self.error(
                    format!("spawning {}", self.command.program),
                    EngineErrorKind::Launch(e.to_string()),
                )
            })?;
        let group = child.id();

        let mut stdout = child.stdout.take();
        let mut stderr = child.stderr.take();
        let finished = tokio::time::timeout(budget, async {
            let (status, out, err) = tokio::join!(
                child.wait(),
                read_all(stdout.as_mut()),
                read_all(stderr.as_mut())
            );
            status.map(|status| ProcessOutput {
                status,
                stdout: out,
                stderr: err,
            })
        })
        .await;

        match finished {
            Ok(output) => {
                output.map_err(|e| self.error("waiting", EngineErrorKind::Launch(e.to_string())))
            }
            Err(_) => {
                tracing::warn!(
                    "Engine {} ran out of time, killing {}",
                    self.name,
                    self.command.program
                );
                kill_group(group);
                reap(&mut child).await;
                Err(self.error(format!("linting {}", spec_path.display()), expired))
            }
        }
    }

    fn render_args(&self, spec_path: &Path, work_dir: &Path) -> Vec<String> {
        self.command.render_args(spec_path, work_dir)
    }
}

impl RuleEngine for CommandEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn lint(&self, spec_path: &Path, options: &LintOptions) -> Result<Vec<RawIssue>> {
        let output = self.run(spec_path, options)?;
        let (report, diagnostics) = match self.command.report_stream {
            ReportStream::Stdout => (output.stdout.trim(), output.stderr.trim()),
            ReportStream::Stderr => (output.stderr.trim(), output.stdout.trim()),
        };

        if report.is_empty() {
            if output.status.success() {
                return Ok(Vec::new());
            }
            return Err(self.error(
                format!("linting {}", spec_path.display()),
                EngineErrorKind::Exited {
                    status: output.status.to_string(),
                    stderr: diagnostics.to_string(),
                },
            ));
        }

        match self.command.format.decode(report) {
            Ok(issues) => {
                tracing::debug!("Engine {} reported {} issue(s)", self.name, issues.len());
                Ok(issues)
            }
            Err(_) if !output.status.success() => Err(self.error(
                format!("linting {}", spec_path.display()),
                EngineErrorKind::Exited {
                    status: output.status.to_string(),
                    stderr: diagnostics.to_string(),
                },
            )),
            Err(e) => Err(e),
        }
    }
}

struct ProcessOutput {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

async fn read_all<R: AsyncRead + Unpin>(pipe: Option<&mut R>) -> String {
    let mut buf = Vec::new();
    if let Some(pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Kill the leader if it still runs and wait for it
async fn reap(child: &mut Child) {
    let _ = child.start_kill();
    if let Err(e) = child.wait().await {
        tracing::warn!("Failed to reap engine process: {e}");
    }
}

#[cfg(unix)]
fn kill_group(group: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pgid) = group.and_then(|id| i32::try_from(id).ok()) else {
        return;
    };
    // ESRCH: every member already exited
    if let Err(e) = killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        tracing::debug!("killpg({pgid}) failed: {e}");
    }
}

#[cfg(not(unix))]
fn kill_group(_group: Option<u32>) {}
