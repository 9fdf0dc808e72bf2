//! TE-mode FDTD time stepping for ezwave.
//!
//! [`FieldUpdater`] advances a [`GridState`](ezwave_grid::GridState) by one
//! discrete step. Each step runs six phases in a fixed order:
//!
//! 1. [`update_hx`]: `Hx[i,j] -= dt * (Ez[i,j] - Ez[i,j-1])` for `j >= 1`
//! 2. [`update_hy`]: `Hy[i,j] += dt * (Ez[i,j] - Ez[i-1,j])` for `i >= 1`
//! 3. [`update_ez`]: interior curl update scaled by `1 / ε_r`
//! 4. [`clamp_conductors`]: Ez = 0 on PEC cells
//! 5. [`AbsorbingBoundary::apply`]: edge damping
//! 6. source injection via an [`Excitation`]
//!
//! Each pass completes before the next starts. The Ez pass reads the H
//! values written in the same step.
//!
//! The difference stencil is one-sided: a disturbance spreads only toward
//! increasing `i` and `j`, at most two cells (Manhattan) per step.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod boundary;
pub mod source;
pub mod updater;

pub use boundary::AbsorbingBoundary;
pub use source::{Excitation, GaussianPulse, Impulse};
pub use updater::{
    clamp_conductors, update_ez, update_hx, update_hy, FieldUpdater, FieldUpdaterBuilder,
    SourceTerm,
};
