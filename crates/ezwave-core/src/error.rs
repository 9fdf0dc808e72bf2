//! Error types for grid construction and cell access.

use std::error::Error;
use std::fmt;

/// Errors arising from grid construction or out-of-range cell access.
///
/// Every per-step failure in the solver is one of these and is fatal to
/// the run: there is no retry path for deterministic numerics.
#[derive(Clone, Debug, PartialEq)]
pub enum GridError {
    /// A grid axis has zero cells.
    InvalidDimension {
        /// Name of the offending axis (`"nx"` or `"ny"`).
        name: &'static str,
        /// The configured value.
        value: usize,
    },
    /// A cell index is outside `[0, nx) x [0, ny)`.
    IndexOutOfBounds {
        /// Requested x index.
        i: usize,
        /// Requested y index.
        j: usize,
        /// Grid extent along x.
        nx: usize,
        /// Grid extent along y.
        ny: usize,
    },
    /// Two arrays that must share a shape do not.
    DimensionMismatch {
        /// What was being combined.
        what: &'static str,
        /// Expected `(nx, ny)`.
        expected: (usize, usize),
        /// Actual `(nx, ny)`.
        actual: (usize, usize),
    },
    /// A relative permittivity is below 1.0 or not finite.
    InvalidPermittivity {
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimension { name, value } => {
                write!(f, "grid dimension {name} must be at least 1, got {value}")
            }
            Self::IndexOutOfBounds { i, j, nx, ny } => {
                write!(f, "cell ({i}, {j}) out of bounds: [0, {nx}) x [0, {ny})")
            }
            Self::DimensionMismatch {
                what,
                expected,
                actual,
            } => write!(
                f,
                "{what}: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            Self::InvalidPermittivity { value } => {
                write!(f, "relative permittivity must be finite and >= 1.0, got {value}")
            }
        }
    }
}

impl Error for GridError {}
