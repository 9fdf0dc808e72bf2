//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use ezwave_engine::SimConfig;

/// Default file-name prefix for snapshot CSVs.
pub const DEFAULT_PREFIX: &str = "scatter_dielectric";

/// 2D TE-mode FDTD simulator
#[derive(Parser, Debug)]
#[command(name = "ezwave")]
#[command(about = "Run a 2D TE-mode FDTD simulation and export Ez snapshots", long_about = None)]
pub struct Args {
    /// TOML config file (defaults are used for anything it omits)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override grid cells along x
    #[arg(long)]
    pub nx: Option<usize>,

    /// Override grid cells along y
    #[arg(long)]
    pub ny: Option<usize>,

    /// Override the time step
    #[arg(long)]
    pub dt: Option<f64>,

    /// Override the number of steps
    #[arg(short, long)]
    pub steps: Option<u64>,

    /// Snapshot step (repeatable; replaces the configured list)
    #[arg(long = "snapshot", value_name = "STEP")]
    pub snapshots: Vec<u64>,

    /// Directory for snapshot CSVs
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// File-name prefix for snapshot CSVs
    #[arg(long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Write probe traces to this CSV file
    #[arg(long, value_name = "FILE")]
    pub probes: Option<PathBuf>,

    /// Print the effective config as TOML and exit
    #[arg(long)]
    pub dump_config: bool,

    /// Verbose output (per-step debug events)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Apply command-line overrides on top of `config`.
    pub fn apply_overrides(&self, config: &mut SimConfig) {
        if let Some(nx) = self.nx {
            config.grid.nx = nx;
        }
        if let Some(ny) = self.ny {
            config.grid.ny = ny;
        }
        if let Some(dt) = self.dt {
            config.dt = dt;
        }
        if let Some(steps) = self.steps {
            config.total_steps = steps;
        }
        if !self.snapshots.is_empty() {
            config.snapshot_steps = self.snapshots.clone();
        }
    }
}
