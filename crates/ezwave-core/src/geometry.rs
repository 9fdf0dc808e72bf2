//! Grid extents, cell coordinates, and rectangular regions.
//!
//! Storage is row-major with `i` (the x axis) as the slow axis, so the
//! flat index of cell `(i, j)` is `i * ny + j`.

use crate::error::GridError;
use std::ops::Range;

/// Extent of a 2D grid: `nx` cells along x, `ny` cells along y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dims {
    nx: usize,
    ny: usize,
}

impl Dims {
    /// Create grid dimensions.
    ///
    /// Returns `Err(GridError::InvalidDimension)` if either axis is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use ezwave_core::Dims;
    ///
    /// let dims = Dims::new(200, 200).unwrap();
    /// assert_eq!(dims.cell_count(), 40_000);
    /// assert!(Dims::new(0, 10).is_err());
    /// ```
    pub fn new(nx: usize, ny: usize) -> Result<Self, GridError> {
        if nx == 0 {
            return Err(GridError::InvalidDimension {
                name: "nx",
                value: nx,
            });
        }
        if ny == 0 {
            return Err(GridError::InvalidDimension {
                name: "ny",
                value: ny,
            });
        }
        Ok(Self { nx, ny })
    }

    /// Cells along x.
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Cells along y.
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.nx * self.ny
    }

    /// Whether `(i, j)` lies inside the grid.
    pub fn contains(&self, i: usize, j: usize) -> bool {
        i < self.nx && j < self.ny
    }

    /// Flat row-major index of `(i, j)`, checked.
    pub fn index(&self, i: usize, j: usize) -> Result<usize, GridError> {
        if self.contains(i, j) {
            Ok(i * self.ny + j)
        } else {
            Err(GridError::IndexOutOfBounds {
                i,
                j,
                nx: self.nx,
                ny: self.ny,
            })
        }
    }

    /// The cell at the grid centre, `(nx / 2, ny / 2)`.
    pub fn center(&self) -> Cell {
        Cell::new(self.nx / 2, self.ny / 2)
    }

    /// Check that `cell` is inside the grid.
    pub fn check(&self, cell: Cell) -> Result<Cell, GridError> {
        self.index(cell.i, cell.j).map(|_| cell)
    }
}

/// A single grid cell `(i, j)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    /// Index along x.
    pub i: usize,
    /// Index along y.
    pub j: usize,
}

impl Cell {
    /// Create a cell coordinate.
    pub const fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }
}

impl From<(usize, usize)> for Cell {
    fn from((i, j): (usize, usize)) -> Self {
        Self { i, j }
    }
}

/// Axis-aligned rectangle of cells, half-open on both axes.
///
/// Follows slice semantics: a range whose start is at or past its end
/// selects nothing (so `x: 120..60` is empty, not reversed), and ranges
/// running past the grid are clipped by [`Rect::clip`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Selected x indices.
    pub x: Range<usize>,
    /// Selected y indices.
    pub y: Range<usize>,
}

impl Rect {
    /// Create a rectangle from two half-open ranges.
    pub fn new(x: Range<usize>, y: Range<usize>) -> Self {
        Self { x, y }
    }

    /// A rectangle covering no cells.
    pub fn empty() -> Self {
        Self { x: 0..0, y: 0..0 }
    }

    /// Whether the rectangle selects no cells.
    pub fn is_empty(&self) -> bool {
        self.x.start >= self.x.end || self.y.start >= self.y.end
    }

    /// Number of selected cells (before clipping).
    pub fn cell_count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.x.len() * self.y.len()
        }
    }

    /// Whether `(i, j)` is selected.
    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.x.contains(&i) && self.y.contains(&j)
    }

    /// Clip both ranges to the grid extent.
    pub fn clip(&self, dims: Dims) -> Self {
        let clip_axis = |r: &Range<usize>, len: usize| {
            let start = r.start.min(len);
            let end = r.end.min(len);
            start..end.max(start)
        };
        Self {
            x: clip_axis(&self.x, dims.nx()),
            y: clip_axis(&self.y, dims.ny()),
        }
    }

    /// Iterate the selected cells in row-major order, clipped to `dims`.
    pub fn cells(&self, dims: Dims) -> impl Iterator<Item = Cell> {
        let r = self.clip(dims);
        let ys = r.y;
        r.x.flat_map(move |i| ys.clone().map(move |j| Cell::new(i, j)))
    }
}
