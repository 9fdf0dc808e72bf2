//! Field storage and static material maps for ezwave.
//!
//! [`GridState`] owns the three TE-mode field arrays (Hx, Hy, Ez) and the
//! two immutable material maps ([`ConductorMask`], [`PermittivityMap`]).
//! Material maps are built once through [`MaterialLayout`] and shared by
//! `Arc`, so snapshots can hold them without copying.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod field;
pub mod material;
pub mod state;

pub use field::Field2D;
pub use material::{ConductorMask, MaterialLayout, PermittivityMap};
pub use state::GridState;
