//! Named point probes recording Ez after every step.

use indexmap::IndexMap;

use crate::config::ConfigError;
use ezwave_core::{Cell, GridError};
use ezwave_grid::GridState;

/// The Ez time series at one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeTrace {
    cell: Cell,
    samples: Vec<f64>,
}

impl ProbeTrace {
    /// The sampled cell.
    pub fn cell(&self) -> Cell {
        self.cell
    }

    /// One sample per executed step, in step order.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// The most recent sample.
    pub fn last(&self) -> Option<f64> {
        self.samples.last().copied()
    }

    /// Largest |Ez| seen so far, or 0.0 with no samples.
    pub fn peak_abs(&self) -> f64 {
        self.samples.iter().fold(0.0, |m, v| m.max(v.abs()))
    }
}

/// Insertion-ordered set of named probes.
///
/// Names are unique. Iteration order is the order probes were added,
/// which is also the column order the CLI writes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProbeSet {
    probes: IndexMap<String, ProbeTrace>,
}

impl ProbeSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a probe.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateProbe`] if `name` is already taken.
    pub fn insert(&mut self, name: impl Into<String>, cell: Cell) -> Result<(), ConfigError> {
        let name = name.into();
        if self.probes.contains_key(&name) {
            return Err(ConfigError::DuplicateProbe { name });
        }
        self.probes.insert(
            name,
            ProbeTrace {
                cell,
                samples: Vec::new(),
            },
        );
        Ok(())
    }

    /// Append the current Ez value to every probe.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::IndexOutOfBounds`] for a probe outside the
    /// grid. Probes before it in order have already been sampled.
    pub fn sample(&mut self, state: &GridState) -> Result<(), GridError> {
        for trace in self.probes.values_mut() {
            let value = state.ez(trace.cell.i, trace.cell.j)?;
            trace.samples.push(value);
        }
        Ok(())
    }

    /// Drop all recorded samples, keeping the probes.
    pub fn clear_samples(&mut self) {
        for trace in self.probes.values_mut() {
            trace.samples.clear();
        }
    }

    /// The trace for `name`.
    pub fn get(&self, name: &str) -> Option<&ProbeTrace> {
        self.probes.get(name)
    }

    /// Number of probes.
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    /// Whether there are no probes.
    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Probe names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.probes.keys().map(String::as_str)
    }

    /// `(name, trace)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProbeTrace)> {
        self.probes.iter().map(|(k, v)| (k.as_str(), v))
    }
}
