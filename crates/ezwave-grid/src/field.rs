//! Dense 2D scalar field storage.

use ezwave_core::{Cell, Dims, GridError, Rect};

/// A dense `nx × ny` array of `f64`, row-major in `i`.
///
/// Checked accessors ([`get`](Field2D::get), [`set`](Field2D::set),
/// [`add`](Field2D::add)) return [`GridError::IndexOutOfBounds`] instead
/// of panicking. The solver's inner loops work on
/// [`as_slice`](Field2D::as_slice) directly with indices it derives from
/// [`dims`](Field2D::dims).
#[derive(Clone, Debug, PartialEq)]
pub struct Field2D {
    dims: Dims,
    data: Vec<f64>,
}

impl Field2D {
    /// A field filled with zeros.
    pub fn zeros(dims: Dims) -> Self {
        Self::filled(dims, 0.0)
    }

    /// A field filled with a constant value.
    pub fn filled(dims: Dims, value: f64) -> Self {
        Self {
            dims,
            data: vec![value; dims.cell_count()],
        }
    }

    /// Wrap existing row-major data.
    ///
    /// Returns `Err(GridError::DimensionMismatch)` if `data.len()` is not
    /// `nx * ny`.
    pub fn from_vec(dims: Dims, data: Vec<f64>) -> Result<Self, GridError> {
        if data.len() != dims.cell_count() {
            return Err(GridError::DimensionMismatch {
                what: "field data length",
                expected: (dims.nx(), dims.ny()),
                actual: (data.len(), 1),
            });
        }
        Ok(Self { dims, data })
    }

    /// Grid extent.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Value at `(i, j)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Result<f64, GridError> {
        let idx = self.dims.index(i, j)?;
        Ok(self.data[idx])
    }

    /// Overwrite the value at `(i, j)`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) -> Result<(), GridError> {
        let idx = self.dims.index(i, j)?;
        self.data[idx] = value;
        Ok(())
    }

    /// Add `value` to the cell at `(i, j)`.
    #[inline]
    pub fn add(&mut self, i: usize, j: usize, value: f64) -> Result<(), GridError> {
        let idx = self.dims.index(i, j)?;
        self.data[idx] += value;
        Ok(())
    }

    /// Value at `cell`.
    pub fn at(&self, cell: Cell) -> Result<f64, GridError> {
        self.get(cell.i, cell.j)
    }

    /// Row-major backing data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable row-major backing data.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Largest absolute value, or 0.0 for an all-zero field.
    ///
    /// NaN cells are ignored.
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0, |m, v| m.max(v.abs()))
    }

    /// Sum of squares of all cells.
    pub fn norm_squared(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum()
    }

    /// Whether every cell is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&v| v == 0.0)
    }

    /// The values along x at fixed `j` (a horizontal cut).
    pub fn slice_x(&self, j: usize) -> Result<Vec<f64>, GridError> {
        self.dims.index(0, j)?;
        let ny = self.dims.ny();
        Ok((0..self.dims.nx()).map(|i| self.data[i * ny + j]).collect())
    }

    /// Copy the cells inside `rect` (clipped to the grid) into a new field.
    ///
    /// Returns `None` if the clipped rectangle is empty.
    pub fn region(&self, rect: &Rect) -> Option<Field2D> {
        let r = rect.clip(self.dims);
        if r.is_empty() {
            return None;
        }
        let sub = Dims::new(r.x.len(), r.y.len()).ok()?;
        let ny = self.dims.ny();
        let mut data = Vec::with_capacity(sub.cell_count());
        for i in r.x.clone() {
            data.extend_from_slice(&self.data[i * ny + r.y.start..i * ny + r.y.end]);
        }
        Some(Field2D { dims: sub, data })
    }
}
