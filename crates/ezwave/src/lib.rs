//! ezwave: a 2D TE-mode finite-difference time-domain simulator.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the ezwave sub-crates. For most users, adding `ezwave` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use ezwave::prelude::*;
//!
//! // A 48×48 vacuum grid with a PEC block downstream of the source.
//! let mut config = SimConfig::default();
//! config.grid.nx = 48;
//! config.grid.ny = 48;
//! config.total_steps = 80;
//! config.snapshot_steps = vec![20, 60];
//! config.materials.conductor.x = [30, 36];
//! config.materials.conductor.y = [30, 36];
//! config.materials.dielectric.x = [8, 16];
//! config.materials.dielectric.y = [8, 16];
//!
//! let mut sim = Simulation::new(&config).unwrap();
//! let mut sink = VecSink::new();
//! let summary = sim.run(&mut sink).unwrap();
//!
//! assert_eq!(summary.snapshots, 2);
//! assert_eq!(sink.steps(), vec![StepId(20), StepId(60)]);
//! assert_eq!(sink.snapshots()[0].conductor_cells(), 36);
//! assert_eq!(summary.probes.get("source").unwrap().samples().len(), 80);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `ezwave-core` | Step IDs, grid geometry, `GridError` |
//! | [`grid`] | `ezwave-grid` | Field storage, material maps, `GridState` |
//! | [`solver`] | `ezwave-solver` | Leapfrog update phases, excitations, absorbing edge |
//! | [`engine`] | `ezwave-engine` | Run loop, configuration, probes, snapshot sinks |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and IDs (`ezwave-core`).
///
/// Contains [`types::StepId`], the geometry types [`types::Dims`],
/// [`types::Cell`] and [`types::Rect`], and [`types::GridError`].
pub use ezwave_core as types;

/// Field storage and material maps (`ezwave-grid`).
///
/// [`grid::GridState`] owns the Hx, Hy and Ez fields together with the
/// static [`grid::ConductorMask`] and [`grid::PermittivityMap`].
pub use ezwave_grid as grid;

/// The field updater (`ezwave-solver`).
///
/// [`solver::FieldUpdater`] runs one leapfrog step; the individual phases
/// are exposed as free functions for custom loops.
pub use ezwave_solver as solver;

/// Simulation loop and I/O surfaces (`ezwave-engine`).
///
/// [`engine::Simulation`] drives a run from a [`engine::SimConfig`] and
/// hands scheduled [`engine::FieldSnapshot`]s to a
/// [`engine::SnapshotSink`].
pub use ezwave_engine as engine;

/// Common imports for typical ezwave usage.
///
/// ```rust
/// use ezwave::prelude::*;
/// ```
///
/// This imports the configuration and run types, the snapshot sinks, the
/// grid geometry, and the excitation trait.
pub mod prelude {
    // Core types
    pub use ezwave_core::{Cell, Dims, GridError, Rect, StepId};

    // Grid
    pub use ezwave_grid::{Field2D, GridState};

    // Solver
    pub use ezwave_solver::{Excitation, FieldUpdater, GaussianPulse, Impulse};

    // Engine
    pub use ezwave_engine::{
        ConfigError, FieldSnapshot, RunError, RunSummary, SimConfig, Simulation,
        SnapshotSchedule, SnapshotSink, StepResult, VecSink,
    };
}
