//! The owned aggregate of field arrays and material maps.

use std::sync::Arc;

use crate::field::Field2D;
use crate::material::{ConductorMask, PermittivityMap};
use ezwave_core::{Dims, GridError};

/// All mutable and static state of a 2D TE-mode run.
///
/// Holds Hx, Hy, Ez (zero-initialised, mutated in place every step) and
/// the immutable conductor mask and permittivity map. The maps sit behind
/// `Arc` so snapshots can share them; there is no way to obtain a mutable
/// reference to either after construction.
///
/// # Examples
///
/// ```
/// use ezwave_core::Dims;
/// use ezwave_grid::GridState;
///
/// let mut state = GridState::vacuum(Dims::new(8, 8).unwrap());
/// state.set_ez(3, 4, 1.5).unwrap();
/// assert_eq!(state.ez(3, 4).unwrap(), 1.5);
/// assert!(state.ez(8, 0).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct GridState {
    dims: Dims,
    hx: Field2D,
    hy: Field2D,
    ez: Field2D,
    conductor: Arc<ConductorMask>,
    permittivity: Arc<PermittivityMap>,
}

impl GridState {
    /// Build a state with zeroed fields over the given material maps.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if either map's extent
    /// differs from `dims`.
    pub fn new(
        dims: Dims,
        conductor: ConductorMask,
        permittivity: PermittivityMap,
    ) -> Result<Self, GridError> {
        check_dims("conductor mask", dims, conductor.dims())?;
        check_dims("permittivity map", dims, permittivity.dims())?;
        Ok(Self {
            dims,
            hx: Field2D::zeros(dims),
            hy: Field2D::zeros(dims),
            ez: Field2D::zeros(dims),
            conductor: Arc::new(conductor),
            permittivity: Arc::new(permittivity),
        })
    }

    /// Vacuum everywhere, no conductors.
    pub fn vacuum(dims: Dims) -> Self {
        Self {
            dims,
            hx: Field2D::zeros(dims),
            hy: Field2D::zeros(dims),
            ez: Field2D::zeros(dims),
            conductor: Arc::new(ConductorMask::empty(dims)),
            permittivity: Arc::new(PermittivityMap::vacuum(dims)),
        }
    }

    /// Grid extent.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Hx at `(i, j)`.
    pub fn hx(&self, i: usize, j: usize) -> Result<f64, GridError> {
        self.hx.get(i, j)
    }

    /// Hy at `(i, j)`.
    pub fn hy(&self, i: usize, j: usize) -> Result<f64, GridError> {
        self.hy.get(i, j)
    }

    /// Ez at `(i, j)`.
    pub fn ez(&self, i: usize, j: usize) -> Result<f64, GridError> {
        self.ez.get(i, j)
    }

    /// Overwrite Hx at `(i, j)`.
    pub fn set_hx(&mut self, i: usize, j: usize, value: f64) -> Result<(), GridError> {
        self.hx.set(i, j, value)
    }

    /// Overwrite Hy at `(i, j)`.
    pub fn set_hy(&mut self, i: usize, j: usize, value: f64) -> Result<(), GridError> {
        self.hy.set(i, j, value)
    }

    /// Overwrite Ez at `(i, j)`.
    pub fn set_ez(&mut self, i: usize, j: usize, value: f64) -> Result<(), GridError> {
        self.ez.set(i, j, value)
    }

    /// The Hx array.
    pub fn hx_field(&self) -> &Field2D {
        &self.hx
    }

    /// The Hy array.
    pub fn hy_field(&self) -> &Field2D {
        &self.hy
    }

    /// The Ez array.
    pub fn ez_field(&self) -> &Field2D {
        &self.ez
    }

    /// Mutable Ez array.
    pub fn ez_field_mut(&mut self) -> &mut Field2D {
        &mut self.ez
    }

    /// Split borrow for the magnetic update: `(&mut hx, &mut hy, &ez)`.
    pub fn magnetic_mut(&mut self) -> (&mut Field2D, &mut Field2D, &Field2D) {
        (&mut self.hx, &mut self.hy, &self.ez)
    }

    /// Split borrow for the electric update: `(&mut ez, &hx, &hy, &eps)`.
    pub fn electric_mut(&mut self) -> (&mut Field2D, &Field2D, &Field2D, &PermittivityMap) {
        (&mut self.ez, &self.hx, &self.hy, &self.permittivity)
    }

    /// Split borrow for the conductor clamp: `(&mut ez, &mask)`.
    pub fn clamp_mut(&mut self) -> (&mut Field2D, &ConductorMask) {
        (&mut self.ez, &self.conductor)
    }

    /// The conductor mask.
    pub fn conductor(&self) -> &ConductorMask {
        &self.conductor
    }

    /// The permittivity map.
    pub fn permittivity(&self) -> &PermittivityMap {
        &self.permittivity
    }

    /// Shared handle to the conductor mask.
    pub fn conductor_handle(&self) -> Arc<ConductorMask> {
        Arc::clone(&self.conductor)
    }

    /// Shared handle to the permittivity map.
    pub fn permittivity_handle(&self) -> Arc<PermittivityMap> {
        Arc::clone(&self.permittivity)
    }

    /// Zero all three field arrays. Material maps are untouched.
    pub fn reset(&mut self) {
        self.hx.fill(0.0);
        self.hy.fill(0.0);
        self.ez.fill(0.0);
    }

    /// Whether all three field arrays are exactly zero.
    pub fn is_quiescent(&self) -> bool {
        self.hx.is_zero() && self.hy.is_zero() && self.ez.is_zero()
    }

    /// Largest |Ez| on the grid.
    pub fn max_abs_ez(&self) -> f64 {
        self.ez.max_abs()
    }

    /// Discrete field energy in normalised units:
    /// `½ Σ (ε_r·Ez² + Hx² + Hy²)`.
    pub fn energy(&self) -> f64 {
        let electric: f64 = self
            .ez
            .as_slice()
            .iter()
            .zip(self.permittivity.as_slice())
            .map(|(e, eps)| eps * e * e)
            .sum();
        0.5 * (electric + self.hx.norm_squared() + self.hy.norm_squared())
    }
}

fn check_dims(what: &'static str, expected: Dims, actual: Dims) -> Result<(), GridError> {
    if expected != actual {
        return Err(GridError::DimensionMismatch {
            what,
            expected: (expected.nx(), expected.ny()),
            actual: (actual.nx(), actual.ny()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialLayout;
    use ezwave_core::Rect;
    use proptest::prelude::*;

    fn dims(nx: usize, ny: usize) -> Dims {
        Dims::new(nx, ny).unwrap()
    }

    #[test]
    fn vacuum_state_is_quiescent() {
        let s = GridState::vacuum(dims(6, 4));
        assert!(s.is_quiescent());
        assert_eq!(s.energy(), 0.0);
        assert!(s.conductor().is_empty());
        assert_eq!(s.permittivity().get(5, 3).unwrap(), 1.0);
    }

    #[test]
    fn mismatched_maps_rejected() {
        let (mask, _) = MaterialLayout::new(dims(4, 4)).build().unwrap();
        let err = GridState::new(dims(5, 4), mask, PermittivityMap::vacuum(dims(5, 4)))
            .unwrap_err();
        assert!(matches!(
            err,
            GridError::DimensionMismatch {
                what: "conductor mask",
                ..
            }
        ));

        let err = GridState::new(
            dims(5, 4),
            ConductorMask::empty(dims(5, 4)),
            PermittivityMap::vacuum(dims(4, 5)),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GridError::DimensionMismatch {
                what: "permittivity map",
                ..
            }
        ));
    }

    #[test]
    fn accessors_are_bounds_checked() {
        let mut s = GridState::vacuum(dims(3, 3));
        assert!(s.set_hx(3, 0, 1.0).is_err());
        assert!(s.set_hy(0, 3, 1.0).is_err());
        assert!(s.hx(2, 2).is_ok());
        assert!(matches!(
            s.hy(7, 1),
            Err(GridError::IndexOutOfBounds { i: 7, j: 1, nx: 3, ny: 3 })
        ));
    }

    #[test]
    fn energy_weights_ez_by_permittivity() {
        let (mask, eps) = MaterialLayout::new(dims(4, 4))
            .dielectric(Rect::new(1..2, 1..2), 4.0)
            .build()
            .unwrap();
        let mut s = GridState::new(dims(4, 4), mask, eps).unwrap();
        s.set_ez(1, 1, 1.0).unwrap();
        s.set_hx(0, 0, 2.0).unwrap();
        // 0.5 * (4 * 1 + 4)
        assert_eq!(s.energy(), 4.0);
    }

    #[test]
    fn reset_keeps_materials() {
        let (mask, eps) = MaterialLayout::new(dims(4, 4))
            .conductor(Rect::new(0..1, 0..4))
            .build()
            .unwrap();
        let mut s = GridState::new(dims(4, 4), mask, eps).unwrap();
        s.set_ez(2, 2, 3.0).unwrap();
        s.reset();
        assert!(s.is_quiescent());
        assert_eq!(s.conductor().count(), 4);
    }

    #[test]
    fn handles_share_the_same_maps() {
        let s = GridState::vacuum(dims(4, 4));
        let a = s.conductor_handle();
        let b = s.clone().conductor_handle();
        assert!(Arc::ptr_eq(&a, &b));
    }

    proptest! {
        #[test]
        fn energy_is_non_negative(
            nx in 1usize..8,
            ny in 1usize..8,
            vals in proptest::collection::vec(-10.0f64..10.0, 3),
        ) {
            let mut s = GridState::vacuum(Dims::new(nx, ny).unwrap());
            s.set_ez(nx - 1, 0, vals[0]).unwrap();
            s.set_hx(0, ny - 1, vals[1]).unwrap();
            s.set_hy(nx / 2, ny / 2, vals[2]).unwrap();
            prop_assert!(s.energy() >= 0.0);
        }
    }
}
