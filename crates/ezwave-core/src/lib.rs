//! Core types for the ezwave FDTD simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the step counter, grid geometry ([`Dims`], [`Cell`], [`Rect`]), and
//! the error taxonomy shared by every other ezwave crate.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod geometry;
pub mod id;

pub use error::GridError;
pub use geometry::{Cell, Dims, Rect};
pub use id::StepId;
