//! apicert: quality certification for API specifications
//!
//! Scores REST, event, gRPC and GraphQL specifications found in a repository
//! or given as a single file.

#![allow(clippy::needless_pass_by_value)]

use anyhow::{Context, Result};
use apicert::{
    cli::{self, exit_codes},
    config::{self, Validatable},
    Certifier, CertifyConfig, Protocol, ValidationType,
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "apicert")]
#[command(version)]
#[command(about = "Quality certification for API specifications", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  All APIs validated without errors
    1  At least one API failed or reported ERROR issues
    3  Error occurred

EXAMPLES:
    # Certify every API listed in a repository archive
    apicert validate https://example.com/pets-api/archive/main.zip

    # Only the design dimension, full results
    apicert validate ./pets-api --validation-type design --verbose-output

    # Lint one file with its design ruleset
    apicert verify openapi.yml

    # Full score report for one file
    apicert score service.proto -O score.json")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "APICERT_CONFIG")]
    config: Option<PathBuf>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long, global = true)]
    output_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

// ============================================================================
// Command argument structs
// ============================================================================

/// Arguments for the `validate` subcommand
#[derive(Parser)]
struct ValidateArgs {
    /// Repository URL (zip archive), local zip archive or local directory
    location: String,

    /// Dimension to validate (design, security, documentation, overall-score)
    #[arg(short = 't', long)]
    validation_type: Option<ValidationType>,

    /// Emit full results instead of summaries
    #[arg(long)]
    verbose_output: bool,

    /// Validate APIs in parallel
    #[arg(long)]
    parallel: bool,

    /// Score the repository README against the documentation ruleset
    #[arg(long)]
    documentation: bool,

    /// Per-API timeout in seconds (0 disables it)
    #[arg(long)]
    entry_timeout: Option<u64>,
}

/// Arguments for the `verify` subcommand
#[derive(Parser)]
struct VerifyArgs {
    /// Specification file
    file: PathBuf,

    /// Protocol (rest, event, grpc, graphql); detected from the file when omitted
    #[arg(short, long)]
    protocol: Option<Protocol>,
}

/// Arguments for the `score` subcommand
#[derive(Parser)]
struct ScoreArgs {
    /// Specification file
    file: PathBuf,

    /// Protocol (rest, event, grpc, graphql); detected from the file when omitted
    #[arg(short, long)]
    protocol: Option<Protocol>,

    /// Dimension to report (design, security, documentation, overall-score)
    #[arg(short = 't', long)]
    validation_type: Option<ValidationType>,
}

#[derive(Subcommand)]
enum Commands {
    /// Certify every API listed in a repository's metadata descriptor
    Validate(ValidateArgs),

    /// Lint a single specification file with its design ruleset
    Verify(VerifyArgs),

    /// Produce a full score report for a single specification file
    Score(ScoreArgs),

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .apicert.yaml in the current directory
    Init,
    /// Print the JSON Schema of the config file format
    Schema,
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so JSON reports on stdout stay clean
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_codes::ERROR
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let Cli {
        quiet,
        config: config_path,
        output_file,
        command,
        ..
    } = cli;
    let config_path = config_path.as_deref();

    match command {
        Commands::Validate(args) => {
            let mut config = load_config(config_path)?;
            config.execution.parallel |= args.parallel;
            config.documentation.enabled |= args.documentation;
            if let Some(secs) = args.entry_timeout {
                config.execution.entry_timeout_secs = (secs > 0).then_some(secs);
            }
            let certifier = build_certifier(config)?;
            cli::run_validate(
                &certifier,
                &args.location,
                args.validation_type,
                args.verbose_output,
                output_file,
                quiet,
            )
        }

        Commands::Verify(args) => {
            let certifier = build_certifier(load_config(config_path)?)?;
            cli::run_verify(
                &certifier,
                &args.file,
                args.protocol,
                output_file,
                quiet,
            )
        }

        Commands::Score(args) => {
            let certifier = build_certifier(load_config(config_path)?)?;
            cli::run_score(
                &certifier,
                &args.file,
                args.protocol,
                args.validation_type,
                output_file,
                quiet,
            )
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "apicert", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => {
            match action {
                ConfigAction::Show => {
                    let (config, loaded_from) = config::load_or_default(config_path)?;
                    if let Some(path) = &loaded_from {
                        eprintln!("# Loaded from: {}", path.display());
                    } else {
                        eprintln!("# No config file found; showing defaults");
                    }
                    let yaml =
                        serde_yaml_ng::to_string(&config).context("failed to serialize config")?;
                    print!("{yaml}");
                }
                ConfigAction::Path => {
                    let search_paths = [
                        std::env::current_dir().ok(),
                        ::dirs::config_dir().map(|p| p.join("apicert")),
                    ];
                    eprintln!("Config file search paths (in order):");
                    for path in search_paths.into_iter().flatten() {
                        eprintln!("  {}", path.display());
                    }
                    eprintln!();
                    match config::discover_config_file(config_path) {
                        Some(path) => eprintln!("Active config file: {}", path.display()),
                        None => eprintln!("No config file found."),
                    }
                }
                ConfigAction::Init => {
                    let target = std::env::current_dir()
                        .context("cannot determine current directory")?
                        .join(".apicert.yaml");
                    if target.exists() {
                        anyhow::bail!(
                            "{} already exists. Remove it first to re-initialize.",
                            target.display()
                        );
                    }
                    std::fs::write(&target, config::generate_example_config())
                        .with_context(|| format!("failed to write {}", target.display()))?;
                    eprintln!("Created {}", target.display());
                }
                ConfigAction::Schema => {
                    let schema = config::generate_json_schema();
                    match &output_file {
                        Some(path) => {
                            std::fs::write(path, &schema)?;
                            eprintln!("Schema written to {}", path.display());
                        }
                        None => println!("{schema}"),
                    }
                }
            }
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<CertifyConfig> {
    let (config, loaded_from) = config::load_or_default(path)?;
    if let Some(path) = loaded_from {
        tracing::debug!("Loaded configuration from {}", path.display());
    }
    Ok(config)
}

fn build_certifier(config: CertifyConfig) -> Result<Certifier> {
    let errors = config.validate();
    if !errors.is_empty() {
        let listed: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow::bail!("invalid configuration:\n  {}", listed.join("\n  "));
    }
    Certifier::new(config).context("failed to set up rule engines")
}
