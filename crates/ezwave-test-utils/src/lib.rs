//! Test fixtures and mock sinks for ezwave development.
//!
//! Provides seeded random grid states for property tests and
//! [`SnapshotSink`] implementations that count or fail on demand.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use ezwave_core::{Dims, StepId};
use ezwave_engine::{FieldSnapshot, SimConfig, SinkError, SnapshotSink};
use ezwave_grid::GridState;

/// A vacuum grid with every field cell drawn uniformly from `[-1, 1)`.
///
/// Same `(nx, ny, seed)` always yields the same state.
///
/// # Panics
///
/// Panics if `nx` or `ny` is zero.
pub fn seeded_state(nx: usize, ny: usize, seed: u64) -> GridState {
    let dims = Dims::new(nx, ny).expect("fixture dims must be non-zero");
    let mut state = GridState::vacuum(dims);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for i in 0..nx {
        for j in 0..ny {
            state.set_hx(i, j, rng.random_range(-1.0..1.0)).unwrap();
            state.set_hy(i, j, rng.random_range(-1.0..1.0)).unwrap();
            state.set_ez(i, j, rng.random_range(-1.0..1.0)).unwrap();
        }
    }
    state
}

/// A small, fast configuration: 32x32 grid, 50 steps, snapshots at
/// 10, 20 and 75 (the last unreachable), dielectric at `[4, 12)^2`.
pub fn small_config() -> SimConfig {
    let mut cfg = SimConfig::default();
    cfg.grid.nx = 32;
    cfg.grid.ny = 32;
    cfg.total_steps = 50;
    cfg.snapshot_steps = vec![10, 20, 75];
    cfg.materials.dielectric.x = [4, 12];
    cfg.materials.dielectric.y = [4, 12];
    cfg
}

/// Records the step of every snapshot and whether `finish` ran.
#[derive(Debug, Default)]
pub struct CountingSink {
    pub steps: Vec<StepId>,
    pub finished: bool,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotSink for CountingSink {
    fn record(&mut self, snapshot: FieldSnapshot) -> Result<(), SinkError> {
        self.steps.push(snapshot.step());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.finished = true;
        Ok(())
    }
}

/// Accepts `succeed_count` snapshots, then fails every call after.
#[derive(Debug)]
pub struct FailingSink {
    succeed_count: usize,
    calls: usize,
}

impl FailingSink {
    pub fn new(succeed_count: usize) -> Self {
        Self {
            succeed_count,
            calls: 0,
        }
    }

    /// Number of `record` calls so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl SnapshotSink for FailingSink {
    fn record(&mut self, snapshot: FieldSnapshot) -> Result<(), SinkError> {
        self.calls += 1;
        if self.calls > self.succeed_count {
            return Err(SinkError::new(format!(
                "injected failure at step {}",
                snapshot.step()
            )));
        }
        Ok(())
    }
}
