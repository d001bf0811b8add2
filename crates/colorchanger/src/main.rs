//! ColorChanger CLI: recolor `Neutral` actor definitions in an XML map.
//!
//! Reads `colorChanger.toml` (or `--config`), rewrites every `Neutral` that
//! contains an `Origin` with a fresh `Actor.Color`, and writes the result to
//! the configured target file.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use colorchanger_lib::config::{Config, DEFAULT_CONFIG_FILE};
use colorchanger_lib::error::Result;
use colorchanger_lib::mutator::MutationSummary;
use colorchanger_lib::report::{LogReporter, Reporter};
use colorchanger_lib::run::{RunOutcome, run};

#[derive(Parser)]
#[command(
    name = "colorchanger",
    version,
    about = "Recolor Neutral actor definitions in an XML map"
)]
struct Args {
    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Source XML file (overrides `srcFileName`)
    #[arg(long)]
    src: Option<String>,

    /// Target XML file (overrides `targetFileName`)
    #[arg(long)]
    target: Option<String>,

    /// Color as #RRGGBB or R;G;B (overrides `color`)
    #[arg(long)]
    color: Option<String>,

    /// Print the run outcome as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

// ── JSON output ──

#[derive(Serialize)]
struct RunOutput {
    written: bool,
    target: String,
    color: String,
    #[serde(flatten)]
    summary: MutationSummary,
}

impl RunOutput {
    fn new(outcome: &RunOutcome, color: String) -> Self {
        RunOutput {
            written: outcome.written(),
            target: outcome.target().display().to_string(),
            color,
            summary: outcome.summary(),
        }
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let reporter = LogReporter;
    if let Err(e) = execute(args, &reporter) {
        reporter.error(&e.to_string());
        std::process::exit(1);
    }
}

fn execute(args: Args, reporter: &dyn Reporter) -> Result<()> {
    log::debug!("loading configuration from {}", args.config.display());
    let settings = Config::load_from(&args.config)?
        .with_overrides(args.src, args.target, args.color)
        .resolve(reporter)?;
    log::debug!(
        "source {}, target {}, color {} ({})",
        settings.src.display(),
        settings.target.display(),
        settings.color.to_hex(),
        settings.color
    );

    let outcome = run(&settings, reporter)?;

    if args.json {
        let output = RunOutput::new(&outcome, settings.color.to_hex());
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{s}"),
            Err(e) => log::warn!("could not render JSON output: {e}"),
        }
    }
    Ok(())
}
