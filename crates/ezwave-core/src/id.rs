//! Strongly-typed step counter.

use std::fmt;

/// Discrete time-step index.
///
/// A run iterates `StepId(0)` up to (but excluding) its configured total.
/// Each index is visited exactly once, in order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u64);

impl StepId {
    /// The step following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The step index as an `f64`, for time-dependent excitations.
    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
