//! `ezwave`: run a 2D TE-mode FDTD simulation from the command line.
//!
//! Loads a TOML config (or the built-in defaults), applies flag
//! overrides, runs the simulation, and writes Ez snapshots as CSV on a
//! recorder thread fed by a crossbeam channel.

#![forbid(unsafe_code)]

mod cli;
mod recorder;

use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use ezwave_engine::{ChannelSink, ConfigError, RunError, RunSummary, SimConfig, Simulation};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::recorder::{write_probes, CsvRecorder};

/// Snapshots buffered between the simulation and the recorder thread.
const RECORDER_QUEUE: usize = 4;

// ── CliError ────────────────────────────────────────────────────

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Run(RunError),
    Io { path: PathBuf, source: io::Error },
    RecorderPanicked,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Run(e) => write!(f, "run: {e}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::RecorderPanicked => write!(f, "recorder thread panicked"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Run(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            Self::RecorderPanicked => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<RunError> for CliError {
    fn from(e: RunError) -> Self {
        Self::Run(e)
    }
}

// ── main ────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<SimConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            SimConfig::load(path)?
        }
        None => SimConfig::default(),
    };
    args.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

/// Combine the run outcome with the recorder's.
///
/// A recorder write failure drops the channel receiver, which the run then
/// reports as a disconnected sink. The write error is the cause, so it
/// takes precedence.
fn settle(
    outcome: Result<RunSummary, RunError>,
    recorded: io::Result<Vec<PathBuf>>,
    dir: &Path,
) -> Result<(RunSummary, Vec<PathBuf>), CliError> {
    match (outcome, recorded) {
        (Ok(summary), Ok(written)) => Ok((summary, written)),
        (outcome, Err(source)) => {
            if let Err(run_err) = outcome {
                warn!(error = %run_err, "run aborted after the recorder failed");
            }
            Err(CliError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
        (Err(run_err), Ok(_)) => Err(run_err.into()),
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let config = load_config(args)?;
    if args.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    std::fs::create_dir_all(&args.output_dir).map_err(|source| CliError::Io {
        path: args.output_dir.clone(),
        source,
    })?;

    let mut sim = Simulation::new(&config)?;
    let (mut sink, rx) = ChannelSink::bounded(RECORDER_QUEUE);
    let recorder = CsvRecorder::new(&args.output_dir, &args.prefix);
    let handle = recorder.spawn(rx).map_err(|source| CliError::Io {
        path: args.output_dir.clone(),
        source,
    })?;

    let outcome = sim.run(&mut sink);
    drop(sink);
    let recorded = handle.join().map_err(|_| CliError::RecorderPanicked)?;
    let (summary, written) = settle(outcome, recorded, &args.output_dir)?;

    if let Some(path) = &args.probes {
        write_probes(path, &summary.probes).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), probes = summary.probes.len(), "probe traces written");
    }

    if let Some(step) = summary.diverged_at {
        error!(step = step.0, "field energy became non-finite during the run");
    }
    info!(
        steps = summary.steps_executed,
        files = written.len(),
        peak_abs_ez = summary.peak_abs_ez,
        final_energy = summary.final_energy,
        elapsed_ms = summary.elapsed_us / 1000,
        "done"
    );
    Ok(())
}
