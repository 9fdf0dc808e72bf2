//! Simulation loop orchestrating an ezwave run.
//!
//! [`Simulation`] owns the grid state and the field updater, iterates the
//! step index strictly in order, samples named probes after every step,
//! and hands a [`FieldSnapshot`] to a [`SnapshotSink`] at the steps listed
//! in its [`SnapshotSchedule`]. [`SimConfig`] carries every tunable
//! constant and loads from TOML.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod metrics;
pub mod probe;
pub mod schedule;
pub mod sim;
pub mod snapshot;

pub use config::{
    ConfigError, GridConfig, MaterialsConfig, ProbeConfig, RegionConfig, SimConfig, SourceConfig,
    SOURCE_PROBE,
};
pub use metrics::StepMetrics;
pub use probe::{ProbeSet, ProbeTrace};
pub use schedule::SnapshotSchedule;
pub use sim::{RunError, RunSummary, Simulation, StepResult};
pub use snapshot::{ChannelSink, FieldSnapshot, NullSink, SinkError, SnapshotSink, VecSink};
