//! Synchronous simulation loop.
//!
//! [`Simulation`] is the user-facing entry point. Each call to
//! [`step()`](Simulation::step) advances exactly one step index and
//! returns a [`StepResult`]; [`run()`](Simulation::run) drives the
//! remaining steps and feeds scheduled snapshots to a [`SnapshotSink`].
//!
//! # Ownership model
//!
//! `Simulation` is [`Send`] and owns everything it mutates. All mutating
//! methods take `&mut self`. Snapshots are owned copies, so a sink can
//! ship them to another thread while the loop keeps stepping.

use std::error::Error;
use std::fmt;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::{ConfigError, SimConfig, SOURCE_PROBE};
use crate::metrics::StepMetrics;
use crate::probe::ProbeSet;
use crate::schedule::SnapshotSchedule;
use crate::snapshot::{FieldSnapshot, SinkError, SnapshotSink};
use ezwave_core::{Cell, GridError, StepId};
use ezwave_grid::{GridState, MaterialLayout};
use ezwave_solver::FieldUpdater;

// Compile-time assertion: Simulation is Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Simulation>();
    }
};

// ── RunError ────────────────────────────────────────────────────

/// Errors from [`Simulation::step`] and [`Simulation::run`].
#[derive(Clone, Debug, PartialEq)]
pub enum RunError {
    /// A field or probe access left the grid.
    Grid(GridError),
    /// The snapshot sink rejected a snapshot.
    Sink(SinkError),
    /// Every step index has already run.
    Finished {
        /// The configured run length.
        total_steps: u64,
    },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::Sink(e) => write!(f, "{e}"),
            Self::Finished { total_steps } => {
                write!(f, "simulation finished after {total_steps} steps")
            }
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::Sink(e) => Some(e),
            Self::Finished { .. } => None,
        }
    }
}

impl From<GridError> for RunError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<SinkError> for RunError {
    fn from(e: SinkError) -> Self {
        Self::Sink(e)
    }
}

// ── StepResult / RunSummary ─────────────────────────────────────

/// Result of a successful [`Simulation::step()`] call.
#[derive(Debug)]
pub struct StepResult {
    /// The step index that just ran.
    pub step: StepId,
    /// Ez after this step, if the step is scheduled.
    pub snapshot: Option<FieldSnapshot>,
    /// Timing for this step.
    pub metrics: StepMetrics,
}

/// End-of-run report from [`Simulation::run()`].
#[derive(Clone, Debug)]
pub struct RunSummary {
    /// Steps executed by this call.
    pub steps_executed: u64,
    /// Snapshots handed to the sink by this call.
    pub snapshots: usize,
    /// Largest |Ez| observed after any step of the run so far.
    pub peak_abs_ez: f64,
    /// Field energy after the last step.
    pub final_energy: f64,
    /// Wall-clock time of this call, in microseconds.
    pub elapsed_us: u64,
    /// First step after which the field energy was no longer finite, if
    /// any. This covers overflow of the energy sum as well as non-finite
    /// field values.
    pub diverged_at: Option<StepId>,
    /// Probe traces covering every step executed so far.
    pub probes: ProbeSet,
}

// ── Simulation ──────────────────────────────────────────────────

/// A single run: grid state, updater, schedule and probes.
///
/// # Examples
///
/// ```
/// use ezwave_engine::{SimConfig, Simulation, VecSink};
///
/// let mut config = SimConfig::default();
/// config.grid.nx = 40;
/// config.grid.ny = 40;
/// config.total_steps = 70;
///
/// let mut sim = Simulation::new(&config).unwrap();
/// let mut sink = VecSink::new();
/// let summary = sim.run(&mut sink).unwrap();
/// assert_eq!(summary.steps_executed, 70);
/// assert_eq!(summary.snapshots, 1);
/// assert!(sim.is_finished());
/// ```
#[derive(Debug)]
pub struct Simulation {
    state: GridState,
    updater: FieldUpdater,
    schedule: SnapshotSchedule,
    probes: ProbeSet,
    total_steps: u64,
    next: StepId,
    peak_abs_ez: f64,
    diverged_at: Option<StepId>,
    last_metrics: StepMetrics,
}

impl Simulation {
    /// Build a run from a validated configuration.
    ///
    /// Validates `config`, lays out the material maps, binds the Gaussian
    /// source and registers the `"source"` probe followed by any
    /// configured probes.
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let dims = config.dims()?;
        let source = config.source_cell();

        let conductor = config.materials.conductor.rect();
        let dielectric = config.materials.dielectric.rect();
        if conductor.clip(dims).is_empty() {
            warn!(
                x = ?conductor.x,
                y = ?conductor.y,
                "conductor region is empty; no PEC cells"
            );
        }
        let (mask, eps) = MaterialLayout::new(dims)
            .conductor(conductor)
            .dielectric(dielectric, config.materials.permittivity)
            .build()?;
        let state = GridState::new(dims, mask, eps)?;

        let updater = FieldUpdater::builder()
            .dt(config.dt)
            .boundary_coefficient(config.boundary_coefficient)
            .source(source, config.pulse()?)
            .build()
            .map_err(|reason| ConfigError::InvalidSolver { reason })?;

        let mut probes = ProbeSet::new();
        probes.insert(SOURCE_PROBE, source)?;
        for p in &config.probes {
            probes.insert(p.name.clone(), Cell::new(p.x, p.y))?;
        }

        let mut sim = Self::from_parts(state, updater, config.schedule(), config.total_steps)?;
        sim.probes = probes;

        info!(
            nx = dims.nx(),
            ny = dims.ny(),
            dt = config.dt,
            total_steps = config.total_steps,
            source = ?(source.i, source.j),
            conductor_cells = sim.state.conductor().count(),
            dielectric_cells = sim.state.permittivity().dielectric_count(),
            "simulation configured"
        );
        Ok(sim)
    }

    /// Assemble a run from already-built pieces, with no probes.
    ///
    /// Logs a warning for scheduled steps the run never reaches and for a
    /// `dt` above the Courant limit.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SourceOutOfBounds`] if the updater drives a
    /// cell outside the grid.
    pub fn from_parts(
        state: GridState,
        updater: FieldUpdater,
        schedule: SnapshotSchedule,
        total_steps: u64,
    ) -> Result<Self, ConfigError> {
        let dims = state.dims();
        if let Some(term) = updater.source() {
            let cell = term.cell();
            if !dims.contains(cell.i, cell.j) {
                return Err(ConfigError::SourceOutOfBounds {
                    x: cell.i,
                    y: cell.j,
                    nx: dims.nx(),
                    ny: dims.ny(),
                });
            }
        }
        for step in schedule.unreachable(total_steps) {
            warn!(step, total_steps, "snapshot step is never reached");
        }
        if !updater.within_courant_limit() {
            warn!(
                dt = updater.dt(),
                limit = FieldUpdater::courant_limit(),
                "dt exceeds the Courant limit"
            );
        }
        Ok(Self {
            state,
            updater,
            schedule,
            probes: ProbeSet::new(),
            total_steps,
            next: StepId(0),
            peak_abs_ez: 0.0,
            diverged_at: None,
            last_metrics: StepMetrics::default(),
        })
    }

    /// Add a probe.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateProbe`] for a repeated name and
    /// [`ConfigError::ProbeOutOfBounds`] for a cell outside the grid.
    pub fn add_probe(&mut self, name: impl Into<String>, cell: Cell) -> Result<(), ConfigError> {
        let name = name.into();
        if !self.state.dims().contains(cell.i, cell.j) {
            return Err(ConfigError::ProbeOutOfBounds {
                name,
                x: cell.i,
                y: cell.j,
            });
        }
        self.probes.insert(name, cell)
    }

    /// Execute one step.
    ///
    /// Runs the field update for the current index, samples probes, and
    /// captures a snapshot if the index is scheduled.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Finished`] once every index has run, and
    /// [`RunError::Grid`] if the source or a probe lies outside the grid.
    /// The index advances as soon as the fields have been updated, so no
    /// index is ever applied twice.
    pub fn step(&mut self) -> Result<StepResult, RunError> {
        if self.is_finished() {
            return Err(RunError::Finished {
                total_steps: self.total_steps,
            });
        }
        let t = self.next;
        let started = Instant::now();

        self.updater.step(&mut self.state, t)?;
        self.next = t.next();
        let update_us = started.elapsed().as_micros() as u64;

        let probe_started = Instant::now();
        self.probes.sample(&self.state)?;
        let probe_us = probe_started.elapsed().as_micros() as u64;

        let mut snapshot_us = 0;
        let snapshot = if self.schedule.contains(t) {
            let snap_started = Instant::now();
            let snap = FieldSnapshot::capture(&self.state, t, self.source());
            snapshot_us = snap_started.elapsed().as_micros() as u64;
            Some(snap)
        } else {
            None
        };

        self.track_peak(t);

        let metrics = StepMetrics {
            total_us: started.elapsed().as_micros() as u64,
            update_us,
            probe_us,
            snapshot_us,
        };
        self.last_metrics = metrics.clone();
        debug!(step = t.0, total_us = metrics.total_us, "step complete");

        Ok(StepResult {
            step: t,
            snapshot,
            metrics,
        })
    }

    /// Run every remaining step, feeding snapshots to `sink`.
    ///
    /// Calls [`SnapshotSink::finish`] after the last step. With no steps
    /// remaining this only calls `finish`.
    ///
    /// # Errors
    ///
    /// The first [`RunError`] from a step or the sink aborts the run.
    pub fn run(&mut self, sink: &mut dyn SnapshotSink) -> Result<RunSummary, RunError> {
        let started = Instant::now();
        let mut steps_executed = 0;
        let mut snapshots = 0;

        while !self.is_finished() {
            let result = self.step()?;
            steps_executed += 1;
            if let Some(snapshot) = result.snapshot {
                let max_abs = snapshot.max_abs_ez();
                sink.record(snapshot)?;
                snapshots += 1;
                info!(step = result.step.0, max_abs_ez = max_abs, "snapshot recorded");
            }
        }
        sink.finish()?;

        let summary = RunSummary {
            steps_executed,
            snapshots,
            peak_abs_ez: self.peak_abs_ez,
            final_energy: self.state.energy(),
            elapsed_us: started.elapsed().as_micros() as u64,
            diverged_at: self.diverged_at,
            probes: self.probes.clone(),
        };
        info!(
            steps = summary.steps_executed,
            snapshots = summary.snapshots,
            peak_abs_ez = summary.peak_abs_ez,
            final_energy = summary.final_energy,
            elapsed_us = summary.elapsed_us,
            "run complete"
        );
        Ok(summary)
    }

    /// Zero the fields, clear probe samples and rewind to step 0.
    pub fn reset(&mut self) {
        self.state.reset();
        self.probes.clear_samples();
        self.next = StepId(0);
        self.peak_abs_ez = 0.0;
        self.diverged_at = None;
        self.last_metrics = StepMetrics::default();
    }

    fn track_peak(&mut self, t: StepId) {
        let peak = self.state.max_abs_ez();
        if peak > self.peak_abs_ez {
            self.peak_abs_ez = peak;
        }
        // Energy overflows before any single cell does, and any NaN or
        // infinite field value makes it non-finite too.
        if self.diverged_at.is_none() {
            let energy = self.state.energy();
            if !energy.is_finite() {
                self.diverged_at = Some(t);
                warn!(step = t.0, peak_abs_ez = peak, "field energy is no longer finite");
            }
        }
    }

    /// The grid state.
    pub fn state(&self) -> &GridState {
        &self.state
    }

    /// The field updater.
    pub fn updater(&self) -> &FieldUpdater {
        &self.updater
    }

    /// The snapshot schedule.
    pub fn schedule(&self) -> &SnapshotSchedule {
        &self.schedule
    }

    /// Probe traces recorded so far.
    pub fn probes(&self) -> &ProbeSet {
        &self.probes
    }

    /// The source cell, if the updater has one.
    pub fn source(&self) -> Option<Cell> {
        self.updater.source().map(|s| s.cell())
    }

    /// The index the next [`step()`](Self::step) will run.
    pub fn current_step(&self) -> StepId {
        self.next
    }

    /// Configured run length.
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Whether every index has run.
    pub fn is_finished(&self) -> bool {
        self.next.0 >= self.total_steps
    }

    /// Metrics from the most recent step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }
}
