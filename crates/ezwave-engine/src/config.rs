//! Run configuration, validation, and error types.
//!
//! [`SimConfig`] holds every tunable constant of a run. It round-trips
//! through TOML; missing keys fall back to the defaults below.
//! [`validate()`](SimConfig::validate) checks every structural invariant
//! before a [`Simulation`](crate::Simulation) is built from it.
//!
//! ```toml
//! dt = 0.5
//! total_steps = 300
//! boundary_coefficient = 0.8
//! snapshot_steps = [60, 120, 200, 320]
//!
//! [grid]
//! nx = 200
//! ny = 200
//!
//! [source]
//! amplitude = 3.0
//! center = 40.0
//! width = 15.0
//! cutoff = 30
//!
//! [materials]
//! conductor = { x = [120, 60], y = [120, 60] }
//! dielectric = { x = [40, 80], y = [40, 80] }
//! permittivity = 4.0
//!
//! [[probes]]
//! name = "edge"
//! x = 150
//! y = 100
//! ```

use std::error::Error;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::schedule::SnapshotSchedule;
use ezwave_core::{Cell, Dims, GridError, Rect};
use ezwave_solver::{AbsorbingBoundary, GaussianPulse};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while loading or validating a [`SimConfig`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Grid construction failed.
    Grid(GridError),
    /// dt is NaN, infinite, or negative.
    InvalidTimeStep {
        /// The invalid value.
        value: f64,
    },
    /// The source cell lies outside the grid.
    SourceOutOfBounds {
        /// Source x index.
        x: usize,
        /// Source y index.
        y: usize,
        /// Grid extent along x.
        nx: usize,
        /// Grid extent along y.
        ny: usize,
    },
    /// Dielectric permittivity is below 1.0 or not finite.
    InvalidPermittivity {
        /// The invalid value.
        value: f64,
    },
    /// Boundary coefficient is outside `[0, 1]` or not finite.
    InvalidBoundaryCoefficient {
        /// The invalid value.
        value: f64,
    },
    /// Gaussian pulse parameters rejected.
    InvalidPulse {
        /// Description of the validation failure.
        reason: String,
    },
    /// The field updater rejected its parameters.
    InvalidSolver {
        /// Description of the validation failure.
        reason: String,
    },
    /// A probe lies outside the grid.
    ProbeOutOfBounds {
        /// Probe name.
        name: String,
        /// Probe x index.
        x: usize,
        /// Probe y index.
        y: usize,
    },
    /// Two probes share a name.
    DuplicateProbe {
        /// The repeated name.
        name: String,
    },
    /// The config file could not be read or written.
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error message.
        reason: String,
    },
    /// The config text is not valid TOML for this schema.
    Parse {
        /// Parser message.
        reason: String,
    },
    /// The config could not be rendered as TOML.
    Serialize {
        /// Serializer message.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::InvalidTimeStep { value } => {
                write!(f, "dt must be finite and >= 0, got {value}")
            }
            Self::SourceOutOfBounds { x, y, nx, ny } => {
                write!(f, "source ({x}, {y}) outside grid {nx}x{ny}")
            }
            Self::InvalidPermittivity { value } => {
                write!(f, "permittivity must be finite and >= 1, got {value}")
            }
            Self::InvalidBoundaryCoefficient { value } => {
                write!(f, "boundary_coefficient must be in [0, 1], got {value}")
            }
            Self::InvalidPulse { reason } => write!(f, "invalid source pulse: {reason}"),
            Self::InvalidSolver { reason } => write!(f, "invalid field updater: {reason}"),
            Self::ProbeOutOfBounds { name, x, y } => {
                write!(f, "probe '{name}' at ({x}, {y}) is outside the grid")
            }
            Self::DuplicateProbe { name } => write!(f, "duplicate probe name '{name}'"),
            Self::Io { path, reason } => write!(f, "{path}: {reason}"),
            Self::Parse { reason } => write!(f, "config parse error: {reason}"),
            Self::Serialize { reason } => write!(f, "config serialize error: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for ConfigError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

// ── Sections ─────────────────────────────────────────────────────

/// `[grid]`: extent in cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Cells along x. Default: 200.
    pub nx: usize,
    /// Cells along y. Default: 200.
    pub ny: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { nx: 200, ny: 200 }
    }
}

/// `[source]`: location and Gaussian pulse shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Source x index. Default: grid centre.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<usize>,
    /// Source y index. Default: grid centre.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<usize>,
    /// Peak amplitude. Default: 3.0.
    pub amplitude: f64,
    /// Step of the (untruncated) peak. Default: 40.0.
    pub center: f64,
    /// Standard deviation in steps. Default: 15.0.
    pub width: f64,
    /// First step with no injection. Default: 30.
    pub cutoff: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        let pulse = GaussianPulse::default();
        Self {
            x: None,
            y: None,
            amplitude: pulse.amplitude(),
            center: pulse.center(),
            width: pulse.width(),
            cutoff: pulse.cutoff(),
        }
    }
}

/// A half-open rectangle written as `{ x = [start, end], y = [start, end] }`.
///
/// `start >= end` on either axis selects nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// `[start, end)` along x.
    pub x: [usize; 2],
    /// `[start, end)` along y.
    pub y: [usize; 2],
}

impl RegionConfig {
    /// Same range on both axes.
    pub fn square(start: usize, end: usize) -> Self {
        Self {
            x: [start, end],
            y: [start, end],
        }
    }

    /// As a [`Rect`].
    pub fn rect(&self) -> Rect {
        Rect::new(self.x[0]..self.x[1], self.y[0]..self.y[1])
    }
}

/// `[materials]`: one PEC rectangle and one dielectric rectangle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialsConfig {
    /// PEC region. Default: `[120, 60]` on both axes, which is empty.
    pub conductor: RegionConfig,
    /// Dielectric region. Default: `[40, 80]` on both axes.
    pub dielectric: RegionConfig,
    /// Relative permittivity inside the dielectric. Default: 4.0.
    pub permittivity: f64,
}

impl Default for MaterialsConfig {
    fn default() -> Self {
        Self {
            conductor: RegionConfig::square(120, 60),
            dielectric: RegionConfig::square(40, 80),
            permittivity: 4.0,
        }
    }
}

/// `[[probes]]`: a named cell whose Ez is recorded every step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Unique name. `"source"` is reserved for the source cell.
    pub name: String,
    /// x index.
    pub x: usize,
    /// y index.
    pub y: usize,
}

// ── SimConfig ──────────────────────────────────────────────────────

/// Name of the probe always placed on the source cell.
pub const SOURCE_PROBE: &str = "source";

/// Complete configuration for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Time step. Default: 0.5.
    pub dt: f64,
    /// Number of steps; indices run `0..total_steps`. Default: 300.
    pub total_steps: u64,
    /// Edge damping coefficient. Default: 0.8.
    pub boundary_coefficient: f64,
    /// Steps after which Ez is exported. Default: `[60, 120, 200, 320]`.
    pub snapshot_steps: Vec<u64>,
    /// Grid extent.
    pub grid: GridConfig,
    /// Source placement and pulse.
    pub source: SourceConfig,
    /// Static material regions.
    pub materials: MaterialsConfig,
    /// Extra probes beyond the implicit `"source"` probe.
    pub probes: Vec<ProbeConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.5,
            total_steps: 300,
            boundary_coefficient: 0.8,
            snapshot_steps: vec![60, 120, 200, 320],
            grid: GridConfig::default(),
            source: SourceConfig::default(),
            materials: MaterialsConfig::default(),
            probes: Vec::new(),
        }
    }
}

impl SimConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Grid must be non-empty on both axes.
        let dims = self.dims()?;
        // 2. dt finite and non-negative (zero is a legal no-op run).
        if !(self.dt.is_finite() && self.dt >= 0.0) {
            return Err(ConfigError::InvalidTimeStep { value: self.dt });
        }
        // 3. Boundary coefficient in [0, 1].
        if AbsorbingBoundary::new(self.boundary_coefficient).is_err() {
            return Err(ConfigError::InvalidBoundaryCoefficient {
                value: self.boundary_coefficient,
            });
        }
        // 4. Source inside the grid.
        let src = self.source_cell();
        if !dims.contains(src.i, src.j) {
            return Err(ConfigError::SourceOutOfBounds {
                x: src.i,
                y: src.j,
                nx: dims.nx(),
                ny: dims.ny(),
            });
        }
        // 5. Pulse shape.
        self.pulse()?;
        // 6. Permittivity, checked even when the dielectric region is empty.
        let eps = self.materials.permittivity;
        if !(eps.is_finite() && eps >= 1.0) {
            return Err(ConfigError::InvalidPermittivity { value: eps });
        }
        // 7. Probes inside the grid, names unique, "source" reserved.
        let mut seen = vec![SOURCE_PROBE];
        for probe in &self.probes {
            if seen.contains(&probe.name.as_str()) {
                return Err(ConfigError::DuplicateProbe {
                    name: probe.name.clone(),
                });
            }
            seen.push(probe.name.as_str());
            if !dims.contains(probe.x, probe.y) {
                return Err(ConfigError::ProbeOutOfBounds {
                    name: probe.name.clone(),
                    x: probe.x,
                    y: probe.y,
                });
            }
        }
        Ok(())
    }

    /// Grid extent.
    pub fn dims(&self) -> Result<Dims, ConfigError> {
        Ok(Dims::new(self.grid.nx, self.grid.ny)?)
    }

    /// Source cell, defaulting each unset axis to the grid centre.
    pub fn source_cell(&self) -> Cell {
        Cell::new(
            self.source.x.unwrap_or(self.grid.nx / 2),
            self.source.y.unwrap_or(self.grid.ny / 2),
        )
    }

    /// The configured pulse.
    pub fn pulse(&self) -> Result<GaussianPulse, ConfigError> {
        let s = &self.source;
        GaussianPulse::new(s.amplitude, s.center, s.width, s.cutoff)
            .map_err(|reason| ConfigError::InvalidPulse { reason })
    }

    /// The snapshot steps as a schedule.
    pub fn schedule(&self) -> SnapshotSchedule {
        SnapshotSchedule::new(self.snapshot_steps.iter().copied())
    }

    /// Parse TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Render as pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            reason: e.to_string(),
        })
    }

    /// Write as pretty TOML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = self.to_toml()?;
        std::fs::write(path, text).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
