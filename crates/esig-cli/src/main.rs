//! ESIG command line
//!
//! Reads a diagnostic data snapshot (JSON) and an optional policy overlay
//! (YAML or JSON), prints the reports as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use esig_core::DiagnosticData;
use esig_policy::ValidationPolicy;
use esig_process::{validate, validate_certificate, Reports};
use std::path::{Path, PathBuf};
use tracing::{info, info_span, Instrument, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "esig")]
#[command(about = "AdES signature validation (ETSI EN 319 102-1)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every signature of a diagnostic data snapshot
    Validate {
        /// Diagnostic data (JSON)
        #[arg(short, long)]
        diagnostic: PathBuf,

        /// Policy overlay (YAML or JSON); ETSI defaults when omitted
        #[arg(short, long)]
        policy: Option<PathBuf>,

        /// Print the simple report only
        #[arg(long)]
        simple: bool,
    },

    /// Validate a single certificate and its qualification
    Certificate {
        /// Diagnostic data (JSON)
        #[arg(short, long)]
        diagnostic: PathBuf,

        /// Certificate id inside the diagnostic data
        #[arg(long)]
        id: String,

        #[arg(short, long)]
        policy: Option<PathBuf>,
    },

    /// Print the default validation policy as YAML
    Policy,
}

fn load_diagnostic(path: &Path) -> Result<DiagnosticData> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(DiagnosticData::from_json(&json)?)
}

fn load_policy(path: Option<&Path>) -> Result<ValidationPolicy> {
    let Some(path) = path else {
        return Ok(ValidationPolicy::etsi_default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let policy = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => ValidationPolicy::from_json(&text)?,
        _ => ValidationPolicy::from_yaml(&text)?,
    };
    Ok(policy)
}

fn print_reports(reports: &Reports, simple: bool) -> Result<()> {
    let json = if simple {
        reports.simple_json()?
    } else {
        reports.to_json()?
    };
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("installing the log subscriber")?;

    let run_id = uuid::Uuid::new_v4();
    run(cli.command).instrument(info_span!("run", id = %run_id)).await
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Validate {
            diagnostic,
            policy,
            simple,
        } => {
            let data = load_diagnostic(&diagnostic)?;
            let policy = load_policy(policy.as_deref())?;
            info!(policy = %policy.name, file = %diagnostic.display(), "validating");

            // validation is synchronous and CPU bound
            let reports = tokio::task::spawn_blocking(move || validate(&data, &policy)).await??;
            let digest = reports.digest()?;
            info!(digest = %digest, "reports ready");
            print_reports(&reports, simple)?;
        }
        Commands::Certificate { diagnostic, id, policy } => {
            let data = load_diagnostic(&diagnostic)?;
            let policy = load_policy(policy.as_deref())?;
            let reports =
                tokio::task::spawn_blocking(move || validate_certificate(&data, &policy, &id)).await??;
            print_reports(&reports, false)?;
        }
        Commands::Policy => {
            println!("{}", ValidationPolicy::etsi_default().to_yaml()?);
        }
    }

    Ok(())
}
