//! Per-step timing metrics.
//!
//! [`StepMetrics`] captures wall-clock timings for a single step so the
//! CLI and benches can report throughput without re-instrumenting.

/// Timing collected during a single step.
///
/// All durations are in microseconds. [`Simulation`](crate::Simulation)
/// populates these after each step; the most recent value is available
/// from [`Simulation::last_metrics`](crate::Simulation::last_metrics).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step, in microseconds.
    pub total_us: u64,
    /// Time spent in the six field-update phases, in microseconds.
    pub update_us: u64,
    /// Time spent sampling probes, in microseconds.
    pub probe_us: u64,
    /// Time spent copying Ez into a snapshot (zero on unscheduled steps).
    pub snapshot_us: u64,
}
