//! eegi-intake - EEG recording intake client
//!
//! Command-line front end for the intake core: loads recording files from
//! disk, runs the same validation a submission would, uploads the six files
//! to the analysis service and prints the prediction.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eegi_common::config::{default_config_path, write_toml_config, ConfigResolver, TomlConfig};
use eegi_common::events::EventBus;
use eegi_intake::logging::{reloadable_filter, LogLevelHandle};
use eegi_intake::models::{CandidateFile, NamedBlob, Role};
use eegi_intake::services::{classify_by_role, missing_extensions, required_extensions};
use eegi_intake::{IntakeError, IntakeWidget};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for eegi-intake
#[derive(Parser, Debug)]
#[command(name = "eegi-intake")]
#[command(about = "Validate and submit resting-state EEG recordings for analysis")]
#[command(version)]
struct Args {
    /// Config file (default: ~/.config/eegi/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Analysis service base URL (overrides config and EEGI_SERVICE_URL)
    #[arg(short, long, global = true)]
    service_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report how files would be classified, without contacting the service
    Check {
        /// Recording files (.vhdr, .vmrk, .eeg)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Upload the six recording files and print the prediction
    Submit {
        /// Recording files (.vhdr, .vmrk, .eeg)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Also write the prediction JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a config file populated with defaults
    InitConfig {
        /// Destination (default: ~/.config/eegi/config.toml)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let log_level = init_tracing();
    info!("eegi-intake {}", env!("CARGO_PKG_VERSION"));

    let config = ConfigResolver::new()
        .with_config_path(args.config.clone())
        .with_service_url(args.service_url.clone())
        .resolve()
        .context("Failed to load configuration")?;

    log_level
        .apply_level(&config.logging.level)
        .context("Failed to apply configured log level")?;

    match args.command {
        Command::Check { files } => check(&config, &files).await,
        Command::Submit { files, output } => submit(&config, &files, output.as_deref()).await,
        Command::InitConfig { path } => init_config(path),
    }
}

fn init_tracing() -> LogLevelHandle {
    let (filter, handle) = reloadable_filter();
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    handle
}

async fn load_files(paths: &[PathBuf]) -> Result<Vec<CandidateFile>> {
    let accepted = required_extensions();
    let mut files = Vec::with_capacity(paths.len());

    for path in paths {
        let file = CandidateFile::from_path(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        // Advisory only; the validator decides
        if !file
            .extension()
            .is_some_and(|ext| accepted.contains(&ext.as_str()))
        {
            warn!(name = %file.name(), "Not a .vhdr, .vmrk or .eeg file");
        }
        files.push(file);
    }

    Ok(files)
}

async fn check(config: &TomlConfig, paths: &[PathBuf]) -> Result<ExitCode> {
    let files = load_files(paths).await?;
    let widget = IntakeWidget::from_config(config, EventBus::new(64))?;

    if let Err(err) = widget.add_files(files).await {
        return Ok(report_failure(&err));
    }

    let files = widget.files().await;
    let assignment = classify_by_role(&files);

    println!("Role assignment:");
    for role in Role::ALL {
        match assignment.get(role) {
            Some(index) => println!("  {:<7} {}", role.key(), files[index].name()),
            None => println!("  {:<7} (missing)", role.key()),
        }
    }
    for &index in assignment.unassigned() {
        println!("  unassigned: {}", files[index].name());
    }
    for &index in assignment.superseded() {
        println!("  superseded: {}", files[index].name());
    }

    let mut complete = true;
    if let Some(missing) = missing_extensions(&files) {
        println!("Missing extensions: {}", missing.join(", "));
        complete = false;
    }
    if !assignment.is_complete() {
        complete = false;
    }

    widget.teardown();

    if complete {
        println!("All six files present; ready to submit.");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Incomplete; a submission would be rejected.");
        Ok(ExitCode::from(2))
    }
}

async fn submit(config: &TomlConfig, paths: &[PathBuf], output: Option<&Path>) -> Result<ExitCode> {
    let files = load_files(paths).await?;
    let widget = IntakeWidget::from_config(config, EventBus::new(64))?;

    if let Err(err) = widget.add_files(files).await {
        return Ok(report_failure(&err));
    }

    let outcome = widget.submit().await;
    widget.teardown();

    let prediction = match outcome {
        Ok(prediction) => prediction,
        Err(err) => return Ok(report_failure(&err)),
    };

    let rendered = serde_json::to_string_pretty(&prediction)?;
    println!("{rendered}");

    if let Some(path) = output {
        tokio::fs::write(path, &rendered)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Prediction saved");
    }

    Ok(ExitCode::SUCCESS)
}

fn init_config(path: Option<PathBuf>) -> Result<ExitCode> {
    let path = path
        .or_else(default_config_path)
        .context("Could not determine config directory; pass a path")?;

    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }

    write_toml_config(&TomlConfig::default(), &path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}

/// Print the user-facing notice for `err` and pick an exit code
fn report_failure(err: &IntakeError) -> ExitCode {
    match err.notice() {
        Some((message, _)) => eprintln!("{message}"),
        None => eprintln!("{err}"),
    }
    ExitCode::from(exit_status(err))
}

/// 3 for network failures, 2 for everything the user can fix locally
fn exit_status(err: &IntakeError) -> u8 {
    match err {
        IntakeError::NetworkFailure(_) => 3,
        _ => 2,
    }
}
