//! First-order absorbing boundary for the Ez edges.
//!
//! Not a PML: each edge row/column is overwritten with a damped copy of
//! its interior neighbour, which cuts (but does not remove) reflections.

use ezwave_grid::Field2D;

/// Damped copy of the adjacent interior line onto each grid edge.
///
/// Pass order is fixed:
///
/// 1. column pass: `Ez[:,0] = c * Ez[:,1]`, then `Ez[:,ny-1] = c * Ez[:,ny-2]`
/// 2. row pass: `Ez[0,:] = c * Ez[1,:]`, then `Ez[nx-1,:] = c * Ez[nx-2,:]`
///
/// The four corners are written by both passes; the row pass wins. A
/// pass is skipped when its axis has fewer than two cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AbsorbingBoundary {
    coefficient: f64,
}

impl AbsorbingBoundary {
    /// Create a boundary with the given damping coefficient.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `coefficient` is not finite or outside `[0, 1]`.
    pub fn new(coefficient: f64) -> Result<Self, String> {
        if !(coefficient.is_finite() && (0.0..=1.0).contains(&coefficient)) {
            return Err(format!(
                "boundary coefficient must be finite and in [0, 1], got {coefficient}"
            ));
        }
        Ok(Self { coefficient })
    }

    /// The damping coefficient.
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// Overwrite the four edges of `ez`.
    pub fn apply(&self, ez: &mut Field2D) {
        let dims = ez.dims();
        let (nx, ny) = (dims.nx(), dims.ny());
        let c = self.coefficient;
        let data = ez.as_mut_slice();

        if ny >= 2 {
            for i in 0..nx {
                let row = i * ny;
                data[row] = c * data[row + 1];
                data[row + ny - 1] = c * data[row + ny - 2];
            }
        }

        if nx >= 2 {
            let (first, second) = (0, ny);
            let (last, penultimate) = ((nx - 1) * ny, (nx - 2) * ny);
            for j in 0..ny {
                data[first + j] = c * data[second + j];
            }
            for j in 0..ny {
                data[last + j] = c * data[penultimate + j];
            }
        }
    }
}

impl Default for AbsorbingBoundary {
    fn default() -> Self {
        Self { coefficient: 0.8 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ezwave_core::Dims;
    use proptest::prelude::*;

    fn ramp(nx: usize, ny: usize) -> Field2D {
        let data = (0..nx * ny).map(|v| v as f64 + 1.0).collect();
        Field2D::from_vec(Dims::new(nx, ny).unwrap(), data).unwrap()
    }

    #[test]
    fn edges_are_damped_copies() {
        let mut ez = ramp(5, 6);
        let before = ez.clone();
        AbsorbingBoundary::default().apply(&mut ez);

        for i in 1..4 {
            assert_eq!(ez.get(i, 0).unwrap(), 0.8 * before.get(i, 1).unwrap());
            assert_eq!(ez.get(i, 5).unwrap(), 0.8 * before.get(i, 4).unwrap());
        }
        for j in 1..5 {
            assert_eq!(ez.get(0, j).unwrap(), 0.8 * before.get(1, j).unwrap());
            assert_eq!(ez.get(4, j).unwrap(), 0.8 * before.get(3, j).unwrap());
        }
        // Interior untouched.
        assert_eq!(ez.get(2, 3).unwrap(), before.get(2, 3).unwrap());
    }

    #[test]
    fn row_pass_wins_at_corners() {
        let mut ez = ramp(4, 4);
        let before = ez.clone();
        AbsorbingBoundary::default().apply(&mut ez);

        // (0,0) <- 0.8 * Ez[1,0], where Ez[1,0] was already set to 0.8 * Ez[1,1].
        let expected = 0.8 * (0.8 * before.get(1, 1).unwrap());
        assert_eq!(ez.get(0, 0).unwrap(), expected);
        let expected = 0.8 * (0.8 * before.get(2, 2).unwrap());
        assert_eq!(ez.get(3, 3).unwrap(), expected);
        let expected = 0.8 * (0.8 * before.get(1, 2).unwrap());
        assert_eq!(ez.get(0, 3).unwrap(), expected);
    }

    #[test]
    fn degenerate_axes_skip_their_pass() {
        // Single column: no column pass, row pass still runs.
        let mut ez = ramp(3, 1);
        AbsorbingBoundary::default().apply(&mut ez);
        assert_eq!(ez.get(0, 0).unwrap(), 0.8 * 2.0);
        assert_eq!(ez.get(1, 0).unwrap(), 2.0);
        assert_eq!(ez.get(2, 0).unwrap(), 0.8 * 2.0);

        // Single cell: nothing to copy from.
        let mut one = ramp(1, 1);
        AbsorbingBoundary::default().apply(&mut one);
        assert_eq!(one.get(0, 0).unwrap(), 1.0);
    }

    #[test]
    fn rejects_out_of_range_coefficient() {
        assert!(AbsorbingBoundary::new(1.5).is_err());
        assert!(AbsorbingBoundary::new(-0.1).is_err());
        assert!(AbsorbingBoundary::new(f64::NAN)
            .unwrap_err()
            .contains("coefficient"));
        assert_eq!(AbsorbingBoundary::new(0.8).unwrap(), AbsorbingBoundary::default());
    }

    proptest! {
        #[test]
        fn left_edge_tracks_first_interior_column(
            nx in 3usize..12,
            ny in 3usize..12,
            c in 0.0f64..=1.0,
            seed in proptest::collection::vec(-5.0f64..5.0, 144),
        ) {
            let dims = Dims::new(nx, ny).unwrap();
            let data = seed[..nx * ny].to_vec();
            let mut ez = Field2D::from_vec(dims, data).unwrap();
            AbsorbingBoundary::new(c).unwrap().apply(&mut ez);
            for i in 1..nx - 1 {
                prop_assert_eq!(ez.get(i, 0).unwrap(), c * ez.get(i, 1).unwrap());
                prop_assert_eq!(ez.get(i, ny - 1).unwrap(), c * ez.get(i, ny - 2).unwrap());
            }
        }
    }
}
