//! Static material maps: the PEC conductor mask and relative permittivity.
//!
//! Both maps are fixed at construction. [`MaterialLayout`] collects the
//! conductor and dielectric regions and produces the pair in one pass.

use crate::field::Field2D;
use ezwave_core::{Cell, Dims, GridError, Rect};

/// Boolean mask of perfect-electric-conductor cells.
///
/// Ez is forced to zero on every `true` cell after each electric update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConductorMask {
    dims: Dims,
    cells: Vec<bool>,
}

impl ConductorMask {
    /// A mask with no conductor cells.
    pub fn empty(dims: Dims) -> Self {
        Self {
            dims,
            cells: vec![false; dims.cell_count()],
        }
    }

    /// Grid extent.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Whether `(i, j)` is a conductor cell. Out-of-range cells are not.
    pub fn is_conductor(&self, i: usize, j: usize) -> bool {
        self.dims
            .index(i, j)
            .map(|idx| self.cells[idx])
            .unwrap_or(false)
    }

    /// Row-major mask data.
    pub fn as_slice(&self) -> &[bool] {
        &self.cells
    }

    /// Number of conductor cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Whether the mask has no conductor cells.
    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }

    /// Conductor cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let ny = self.dims.ny();
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c)
            .map(move |(idx, _)| Cell::new(idx / ny, idx % ny))
    }
}

/// Relative permittivity (ε_r) for every cell.
///
/// Invariant: every value is finite and `>= 1.0` (no gain media).
#[derive(Clone, Debug, PartialEq)]
pub struct PermittivityMap {
    eps: Field2D,
}

impl PermittivityMap {
    /// Vacuum everywhere (ε_r = 1).
    pub fn vacuum(dims: Dims) -> Self {
        Self {
            eps: Field2D::filled(dims, 1.0),
        }
    }

    /// Wrap an existing field, validating the ε_r invariant.
    pub fn from_field(eps: Field2D) -> Result<Self, GridError> {
        if let Some(&bad) = eps.as_slice().iter().find(|v| !is_valid_eps(**v)) {
            return Err(GridError::InvalidPermittivity { value: bad });
        }
        Ok(Self { eps })
    }

    /// Grid extent.
    pub fn dims(&self) -> Dims {
        self.eps.dims()
    }

    /// ε_r at `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> Result<f64, GridError> {
        self.eps.get(i, j)
    }

    /// Row-major ε_r values.
    pub fn as_slice(&self) -> &[f64] {
        self.eps.as_slice()
    }

    /// The underlying field.
    pub fn as_field(&self) -> &Field2D {
        &self.eps
    }

    /// Number of cells with ε_r above vacuum.
    pub fn dielectric_count(&self) -> usize {
        self.eps.as_slice().iter().filter(|&&e| e > 1.0).count()
    }
}

fn is_valid_eps(value: f64) -> bool {
    value.is_finite() && value >= 1.0
}

/// Builder for the static material maps of a run.
///
/// Regions are applied in insertion order and clipped to the grid; an
/// empty region (start at or past end on either axis) is a no-op.
///
/// # Examples
///
/// ```
/// use ezwave_core::{Dims, Rect};
/// use ezwave_grid::MaterialLayout;
///
/// let dims = Dims::new(200, 200).unwrap();
/// let (mask, eps) = MaterialLayout::new(dims)
///     .conductor(Rect::new(120..160, 120..160))
///     .dielectric(Rect::new(40..80, 40..80), 4.0)
///     .build()
///     .unwrap();
/// assert_eq!(mask.count(), 1600);
/// assert_eq!(eps.get(50, 50).unwrap(), 4.0);
/// assert_eq!(eps.get(0, 0).unwrap(), 1.0);
/// ```
#[derive(Clone, Debug)]
pub struct MaterialLayout {
    dims: Dims,
    conductors: Vec<Rect>,
    dielectrics: Vec<(Rect, f64)>,
}

impl MaterialLayout {
    /// Start an all-vacuum layout.
    pub fn new(dims: Dims) -> Self {
        Self {
            dims,
            conductors: Vec::new(),
            dielectrics: Vec::new(),
        }
    }

    /// Mark a rectangle as perfect electric conductor.
    pub fn conductor(mut self, rect: Rect) -> Self {
        self.conductors.push(rect);
        self
    }

    /// Fill a rectangle with relative permittivity `eps_r`.
    pub fn dielectric(mut self, rect: Rect, eps_r: f64) -> Self {
        self.dielectrics.push((rect, eps_r));
        self
    }

    /// Produce the conductor mask and permittivity map.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidPermittivity`] if any dielectric value
    /// is below 1.0 or not finite, even when its region is empty.
    pub fn build(self) -> Result<(ConductorMask, PermittivityMap), GridError> {
        let dims = self.dims;
        let mut mask = ConductorMask::empty(dims);
        for rect in &self.conductors {
            for cell in rect.cells(dims) {
                let idx = dims.index(cell.i, cell.j)?;
                mask.cells[idx] = true;
            }
        }

        let mut eps = Field2D::filled(dims, 1.0);
        for (rect, value) in &self.dielectrics {
            if !is_valid_eps(*value) {
                return Err(GridError::InvalidPermittivity { value: *value });
            }
            for cell in rect.cells(dims) {
                eps.set(cell.i, cell.j, *value)?;
            }
        }

        Ok((mask, PermittivityMap { eps }))
    }
}
