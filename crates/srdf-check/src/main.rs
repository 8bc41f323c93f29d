//! srdf-check - validate a semantic robot description
//!
//! Loads a URDF kinematic tree and a semantic description on top of it, then
//! prints what was accepted and every problem found along the way.

mod config;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::OutputFormat;
use srdf_core::{build_from_file, KinematicTree, UrdfTree};

#[derive(Parser, Debug)]
#[command(name = "srdf-check")]
#[command(about = "Validate a semantic robot description against its URDF")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "srdf-check.toml")]
    config: PathBuf,

    /// Kinematic description (URDF)
    #[arg(short, long)]
    urdf: Option<PathBuf>,

    /// Semantic description (SRDF)
    #[arg(short, long)]
    srdf: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Exit with failure when any warning is reported
    #[arg(long)]
    deny_warnings: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Write a default configuration file and exit
    #[arg(long)]
    init_config: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    // stdout carries the report
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if args.init_config {
        config::save_default_config(&args.config)?;
        println!("Wrote default configuration to {}", args.config.display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = config::load_config(&args.config)?;

    // Command line overrides
    if let Some(urdf) = args.urdf {
        config.input.urdf = Some(urdf);
    }
    if let Some(srdf) = args.srdf {
        config.input.srdf = Some(srdf);
    }
    if let Some(format) = args.format {
        config.report.format = format;
    }
    if args.deny_warnings {
        config.report.deny_warnings = true;
    }

    let urdf_path = config
        .input
        .urdf
        .context("No URDF given (use --urdf or set input.urdf in the config)")?;
    let srdf_path = config
        .input
        .srdf
        .context("No semantic description given (use --srdf or set input.srdf in the config)")?;

    let tree = UrdfTree::from_file(&urdf_path)
        .with_context(|| format!("Failed to load URDF {}", urdf_path.display()))?;
    info!(
        robot = %tree.robot_name(),
        root = %tree.root_link(),
        "Kinematic tree loaded"
    );

    let report = build_from_file(&tree, &srdf_path)
        .with_context(|| format!("Failed to load {}", srdf_path.display()))?;

    match config.report.format {
        OutputFormat::Text => print!("{}", report::render_text(&report)),
        OutputFormat::Json => println!("{}", report::render_json(&report)?),
    }

    Ok(if report::failed(&report, config.report.deny_warnings) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
