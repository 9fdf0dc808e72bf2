//! The leapfrog field updater.
//!
//! Constructed via the builder pattern: [`FieldUpdater::builder`].

use std::fmt;

use crate::boundary::AbsorbingBoundary;
use crate::source::Excitation;
use ezwave_core::{Cell, Dims, GridError, StepId};
use ezwave_grid::GridState;

/// Courant limit for a unit cell at unit wave speed in 2D.
const COURANT_LIMIT: f64 = std::f64::consts::FRAC_1_SQRT_2;

// ── Phase functions ─────────────────────────────────────────────

/// Magnetic x-update: `Hx[i,j] -= dt * (Ez[i,j] - Ez[i,j-1])` for `j >= 1`.
///
/// Row `j = 0` is never written.
pub fn update_hx(state: &mut GridState, dt: f64) {
    let ny = state.dims().ny();
    let (hx, _, ez) = state.magnetic_mut();
    let ez = ez.as_slice();
    for (row_hx, row_ez) in hx.as_mut_slice().chunks_mut(ny).zip(ez.chunks(ny)) {
        for j in 1..ny {
            row_hx[j] -= dt * (row_ez[j] - row_ez[j - 1]);
        }
    }
}

/// Magnetic y-update: `Hy[i,j] += dt * (Ez[i,j] - Ez[i-1,j])` for `i >= 1`.
///
/// Column `i = 0` is never written.
pub fn update_hy(state: &mut GridState, dt: f64) {
    let ny = state.dims().ny();
    let (_, hy, ez) = state.magnetic_mut();
    let ez = ez.as_slice();
    let hy = hy.as_mut_slice();
    for idx in ny..hy.len() {
        hy[idx] += dt * (ez[idx] - ez[idx - ny]);
    }
}

/// Electric update on the interior `1 <= i < nx-1`, `1 <= j < ny-1`:
///
/// ```text
/// curl = (Hy[i,j] - Hy[i-1,j]) - (Hx[i,j] - Hx[i,j-1])
/// Ez[i,j] += dt * curl / eps[i,j]
/// ```
///
/// The border ring is left for the boundary pass.
pub fn update_ez(state: &mut GridState, dt: f64) {
    let dims = state.dims();
    let (nx, ny) = (dims.nx(), dims.ny());
    let (ez, hx, hy, eps) = state.electric_mut();
    let (hx, hy, eps) = (hx.as_slice(), hy.as_slice(), eps.as_slice());
    let ez = ez.as_mut_slice();
    for i in 1..nx.saturating_sub(1) {
        for j in 1..ny.saturating_sub(1) {
            let idx = i * ny + j;
            let curl = (hy[idx] - hy[idx - ny]) - (hx[idx] - hx[idx - 1]);
            ez[idx] += dt * curl / eps[idx];
        }
    }
}

/// Force Ez to zero on every conductor cell.
pub fn clamp_conductors(state: &mut GridState) {
    let (ez, mask) = state.clamp_mut();
    for (e, &pec) in ez.as_mut_slice().iter_mut().zip(mask.as_slice()) {
        if pec {
            *e = 0.0;
        }
    }
}

// ── Source term ─────────────────────────────────────────────────

/// An excitation bound to the cell it drives.
pub struct SourceTerm {
    cell: Cell,
    excitation: Box<dyn Excitation>,
}

impl SourceTerm {
    /// Bind `excitation` to `cell`.
    pub fn new(cell: Cell, excitation: impl Excitation) -> Self {
        Self {
            cell,
            excitation: Box::new(excitation),
        }
    }

    /// The driven cell.
    pub fn cell(&self) -> Cell {
        self.cell
    }

    /// The waveform.
    pub fn excitation(&self) -> &dyn Excitation {
        self.excitation.as_ref()
    }
}

impl fmt::Debug for SourceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceTerm")
            .field("cell", &self.cell)
            .field("excitation", &self.excitation.name())
            .finish()
    }
}

// ── FieldUpdater ────────────────────────────────────────────────

/// Advances a [`GridState`] by one step.
///
/// Holds the fixed time step, the edge treatment and an optional source.
/// Stateless across steps: everything that evolves lives in the grid.
///
/// # Examples
///
/// ```
/// use ezwave_core::{Cell, Dims, StepId};
/// use ezwave_grid::GridState;
/// use ezwave_solver::{FieldUpdater, Impulse};
///
/// let updater = FieldUpdater::builder()
///     .dt(0.5)
///     .source(Cell::new(5, 5), Impulse::unit())
///     .build()
///     .unwrap();
/// let mut state = GridState::vacuum(Dims::new(10, 10).unwrap());
/// updater.step(&mut state, StepId(0)).unwrap();
/// updater.step(&mut state, StepId(1)).unwrap();
/// assert_eq!(state.ez(5, 5).unwrap(), 1.5);
/// ```
#[derive(Debug)]
pub struct FieldUpdater {
    dt: f64,
    boundary: AbsorbingBoundary,
    source: Option<SourceTerm>,
}

/// Builder for [`FieldUpdater`].
///
/// Defaults: `dt = 0.5`, boundary coefficient `0.8`, no source.
pub struct FieldUpdaterBuilder {
    dt: f64,
    boundary_coefficient: f64,
    source: Option<SourceTerm>,
}

impl FieldUpdater {
    /// Create a new builder for configuring a `FieldUpdater`.
    pub fn builder() -> FieldUpdaterBuilder {
        FieldUpdaterBuilder {
            dt: 0.5,
            boundary_coefficient: 0.8,
            source: None,
        }
    }

    /// The fixed time step.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// The edge treatment.
    pub fn boundary(&self) -> &AbsorbingBoundary {
        &self.boundary
    }

    /// The bound source, if any.
    pub fn source(&self) -> Option<&SourceTerm> {
        self.source.as_ref()
    }

    /// Courant bound for unit cells at unit wave speed: `1 / sqrt(2)`.
    pub fn courant_limit() -> f64 {
        COURANT_LIMIT
    }

    /// Whether `dt` is within the Courant limit.
    ///
    /// This is the bound for a centred Yee stencil. The update here uses
    /// backward differences for both H and Ez, which amplifies the
    /// checkerboard mode for any `dt > 0`; staying under the limit keeps
    /// the growth rate down but does not remove it.
    pub fn within_courant_limit(&self) -> bool {
        self.dt <= COURANT_LIMIT
    }

    /// Apply the edge treatment to Ez.
    pub fn apply_boundary(&self, state: &mut GridState) {
        self.boundary.apply(state.ez_field_mut());
    }

    /// Check that the source cell, if any, lies inside `dims`.
    pub fn check_source(&self, dims: Dims) -> Result<(), GridError> {
        match &self.source {
            Some(term) => dims.check(term.cell).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Add the source contribution for step `t` to Ez, if active.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::IndexOutOfBounds`] if the source cell lies
    /// outside the grid. Nothing is written in that case.
    pub fn inject_source(&self, state: &mut GridState, t: StepId) -> Result<(), GridError> {
        let Some(term) = &self.source else {
            return Ok(());
        };
        let cell = state.dims().check(term.cell)?;
        if term.excitation.is_active(t) {
            state
                .ez_field_mut()
                .add(cell.i, cell.j, term.excitation.value(t))?;
        }
        Ok(())
    }

    /// Run all six phases for step `t`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::IndexOutOfBounds`] if the source cell lies
    /// outside the grid. The source cell is checked before any phase runs,
    /// so a failed step leaves `state` untouched.
    pub fn step(&self, state: &mut GridState, t: StepId) -> Result<(), GridError> {
        self.check_source(state.dims())?;
        update_hx(state, self.dt);
        update_hy(state, self.dt);
        update_ez(state, self.dt);
        clamp_conductors(state);
        self.apply_boundary(state);
        self.inject_source(state, t)
    }
}

impl FieldUpdaterBuilder {
    /// Set the time step. Must be finite and `>= 0`.
    pub fn dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Set the edge damping coefficient. Must be in `[0, 1]`.
    pub fn boundary_coefficient(mut self, c: f64) -> Self {
        self.boundary_coefficient = c;
        self
    }

    /// Drive `cell` with `excitation`.
    pub fn source(mut self, cell: Cell, excitation: impl Excitation) -> Self {
        self.source = Some(SourceTerm::new(cell, excitation));
        self
    }

    /// Build the updater, validating all parameters.
    pub fn build(self) -> Result<FieldUpdater, String> {
        if !(self.dt.is_finite() && self.dt >= 0.0) {
            return Err(format!("dt must be finite and >= 0, got {}", self.dt));
        }
        let boundary = AbsorbingBoundary::new(self.boundary_coefficient)?;
        Ok(FieldUpdater {
            dt: self.dt,
            boundary,
            source: self.source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{GaussianPulse, Impulse};
    use ezwave_core::{Dims, Rect};
    use ezwave_grid::{MaterialLayout, PermittivityMap};
    use ezwave_test_utils::seeded_state;
    use proptest::prelude::*;

    fn dims(nx: usize, ny: usize) -> Dims {
        Dims::new(nx, ny).unwrap()
    }

    fn impulse_updater(cell: Cell) -> FieldUpdater {
        FieldUpdater::builder()
            .dt(0.5)
            .source(cell, Impulse::unit())
            .build()
            .unwrap()
    }

    fn run(updater: &FieldUpdater, state: &mut GridState, steps: u64) {
        for t in 0..steps {
            updater.step(state, StepId(t)).unwrap();
        }
    }

    // ---------------------------------------------------------------
    // Builder tests
    // ---------------------------------------------------------------

    #[test]
    fn builder_defaults() {
        let u = FieldUpdater::builder().build().unwrap();
        assert_eq!(u.dt(), 0.5);
        assert_eq!(u.boundary().coefficient(), 0.8);
        assert!(u.source().is_none());
        assert!(u.within_courant_limit());
    }

    #[test]
    fn builder_rejects_negative_dt() {
        let result = FieldUpdater::builder().dt(-0.1).build();
        assert!(result.unwrap_err().contains("dt"));
    }

    #[test]
    fn builder_rejects_nan_dt() {
        assert!(FieldUpdater::builder().dt(f64::NAN).build().is_err());
    }

    #[test]
    fn builder_rejects_bad_coefficient() {
        let result = FieldUpdater::builder().boundary_coefficient(2.0).build();
        assert!(result.unwrap_err().contains("coefficient"));
    }

    #[test]
    fn courant_limit_is_inverse_sqrt_two() {
        assert!((FieldUpdater::courant_limit() - 0.5f64.sqrt()).abs() < 1e-15);
        let fast = FieldUpdater::builder().dt(0.75).build().unwrap();
        assert!(!fast.within_courant_limit());
    }

    #[test]
    fn source_term_debug_names_excitation() {
        let term = SourceTerm::new(Cell::new(1, 2), GaussianPulse::default());
        let text = format!("{term:?}");
        assert!(text.contains("GaussianPulse"));
        assert_eq!(term.cell(), Cell::new(1, 2));
    }

    // ---------------------------------------------------------------
    // Phase tests
    // ---------------------------------------------------------------

    #[test]
    fn zero_dt_is_a_no_op() {
        let u = FieldUpdater::builder().dt(0.0).build().unwrap();
        let mut s = GridState::vacuum(dims(12, 9));
        run(&u, &mut s, 20);
        assert!(s.is_quiescent());
    }

    #[test]
    fn zero_fields_stay_zero_without_source() {
        let u = FieldUpdater::builder().build().unwrap();
        let mut s = GridState::vacuum(dims(16, 16));
        run(&u, &mut s, 50);
        assert!(s.is_quiescent());
    }

    #[test]
    fn hx_row_zero_and_hy_column_zero_untouched() {
        let mut s = seeded_state(8, 7, 11);
        let hx_row0: Vec<f64> = (0..8).map(|i| s.hx(i, 0).unwrap()).collect();
        let hy_col0: Vec<f64> = (0..7).map(|j| s.hy(0, j).unwrap()).collect();
        update_hx(&mut s, 0.5);
        update_hy(&mut s, 0.5);
        for i in 0..8 {
            assert_eq!(s.hx(i, 0).unwrap(), hx_row0[i]);
        }
        for j in 0..7 {
            assert_eq!(s.hy(0, j).unwrap(), hy_col0[j]);
        }
    }

    #[test]
    fn ez_border_ring_untouched_by_curl_update() {
        let mut s = seeded_state(6, 5, 3);
        let before = s.ez_field().clone();
        update_ez(&mut s, 0.5);
        for i in 0..6 {
            for j in 0..5 {
                if i == 0 || j == 0 || i == 5 || j == 4 {
                    assert_eq!(s.ez(i, j).unwrap(), before.get(i, j).unwrap());
                }
            }
        }
    }

    #[test]
    fn permittivity_scales_the_electric_update() {
        let d = dims(5, 5);
        let (mask, eps) = MaterialLayout::new(d)
            .dielectric(Rect::new(2..3, 2..3), 4.0)
            .build()
            .unwrap();
        let mut dielectric = GridState::new(d, mask, eps).unwrap();
        let mut vacuum = GridState::vacuum(d);
        for s in [&mut dielectric, &mut vacuum] {
            s.set_hy(2, 2, 1.0).unwrap();
            update_ez(s, 0.5);
        }
        assert_eq!(vacuum.ez(2, 2).unwrap(), 0.5);
        assert_eq!(dielectric.ez(2, 2).unwrap(), 0.125);
    }

    #[test]
    fn conductor_cells_are_zero_after_clamp() {
        let d = dims(20, 20);
        let (mask, _) = MaterialLayout::new(d)
            .conductor(Rect::new(12..16, 4..9))
            .build()
            .unwrap();
        let mut s = seeded_state(20, 20, 7);
        let mut clamped = GridState::new(d, mask, PermittivityMap::vacuum(d)).unwrap();
        for i in 0..20 {
            for j in 0..20 {
                clamped.set_ez(i, j, s.ez(i, j).unwrap()).unwrap();
            }
        }
        clamp_conductors(&mut clamped);
        for cell in clamped.conductor().cells() {
            assert_eq!(clamped.ez(cell.i, cell.j).unwrap(), 0.0);
        }
        assert_eq!(clamped.ez(0, 0).unwrap(), s.ez(0, 0).unwrap());

        // Empty mask leaves everything alone.
        let before = s.ez_field().clone();
        clamp_conductors(&mut s);
        assert_eq!(s.ez_field(), &before);
    }

    #[test]
    fn conductor_holds_through_full_steps() {
        let d = dims(24, 24);
        let (mask, eps) = MaterialLayout::new(d)
            .conductor(Rect::new(14..18, 10..20))
            .build()
            .unwrap();
        let mut s = GridState::new(d, mask, eps).unwrap();
        let u = FieldUpdater::builder()
            .source(Cell::new(6, 6), GaussianPulse::default())
            .build()
            .unwrap();
        for t in 0..40 {
            u.step(&mut s, StepId(t)).unwrap();
            for cell in s.conductor().cells() {
                assert_eq!(s.ez(cell.i, cell.j).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn source_is_additive() {
        let u = FieldUpdater::builder()
            .dt(0.0)
            .source(Cell::new(2, 2), Impulse::new(1.5, StepId(0)))
            .build()
            .unwrap();
        let mut s = GridState::vacuum(dims(5, 5));
        s.set_ez(2, 2, 1.0).unwrap();
        u.inject_source(&mut s, StepId(0)).unwrap();
        assert_eq!(s.ez(2, 2).unwrap(), 2.5);
        u.inject_source(&mut s, StepId(1)).unwrap();
        assert_eq!(s.ez(2, 2).unwrap(), 2.5);
    }

    #[test]
    fn out_of_range_source_is_an_error() {
        let u = impulse_updater(Cell::new(10, 3));
        let mut s = GridState::vacuum(dims(10, 10));
        s.set_ez(4, 4, 1.0).unwrap();
        s.set_hx(4, 5, -0.5).unwrap();
        let before = s.clone();
        let err = u.step(&mut s, StepId(0)).unwrap_err();
        assert_eq!(
            err,
            GridError::IndexOutOfBounds {
                i: 10,
                j: 3,
                nx: 10,
                ny: 10
            }
        );
        assert_eq!(s.ez_field(), before.ez_field());
        assert_eq!(s.hx_field(), before.hx_field());
        assert_eq!(s.hy_field(), before.hy_field());

        // Retrying fails the same way and still writes nothing.
        assert!(u.step(&mut s, StepId(0)).is_err());
        assert_eq!(s.ez_field(), before.ez_field());
        assert_eq!(u.check_source(dims(10, 10)), Err(err));
        assert!(u.check_source(dims(11, 10)).is_ok());
    }

    // ---------------------------------------------------------------
    // Propagation tests
    // ---------------------------------------------------------------

    #[test]
    fn impulse_response_after_one_step() {
        let u = impulse_updater(Cell::new(5, 5));
        let mut s = GridState::vacuum(dims(10, 10));
        u.step(&mut s, StepId(0)).unwrap();
        assert_eq!(s.ez(5, 5).unwrap(), 1.0);

        u.step(&mut s, StepId(1)).unwrap();
        assert_eq!(s.hx(5, 5).unwrap(), -0.5);
        assert_eq!(s.hx(5, 6).unwrap(), 0.5);
        assert_eq!(s.hy(5, 5).unwrap(), 0.5);
        assert_eq!(s.hy(6, 5).unwrap(), -0.5);

        assert_eq!(s.ez(5, 5).unwrap(), 1.5);
        assert_eq!(s.ez(5, 6).unwrap(), -0.5);
        assert_eq!(s.ez(6, 5).unwrap(), -0.5);
        assert_eq!(s.ez(5, 4).unwrap(), 0.0);
        assert_eq!(s.ez(4, 5).unwrap(), 0.0);
        assert_eq!(s.ez(7, 5).unwrap(), 0.25);
        assert_eq!(s.ez(5, 7).unwrap(), 0.25);
        assert_eq!(s.ez(6, 6).unwrap(), 0.0);
    }

    #[test]
    fn diagonal_source_gives_transpose_symmetric_field() {
        let u = impulse_updater(Cell::new(5, 5));
        let mut s = GridState::vacuum(dims(10, 10));
        run(&u, &mut s, 6);
        for i in 0..10 {
            for j in 0..10 {
                assert_eq!(s.ez(i, j).unwrap(), s.ez(j, i).unwrap(), "({i}, {j})");
            }
        }
    }

    #[test]
    fn cells_upstream_of_source_stay_zero() {
        let u = impulse_updater(Cell::new(5, 5));
        let mut s = GridState::vacuum(dims(10, 10));
        run(&u, &mut s, 4);
        for i in 0..10 {
            for j in 0..10 {
                if i < 5 || j < 5 {
                    assert_eq!(s.ez(i, j).unwrap(), 0.0, "({i}, {j})");
                }
            }
        }
    }

    #[test]
    fn disturbance_stays_inside_light_cone() {
        let u = impulse_updater(Cell::new(8, 8));
        let mut s = GridState::vacuum(dims(32, 32));
        // Injection at t = 0 plus four propagation steps.
        run(&u, &mut s, 5);
        let mut reached = false;
        for i in 8..32 {
            for j in 8..32 {
                let distance = (i - 8) + (j - 8);
                let ez = s.ez(i, j).unwrap();
                if distance > 8 {
                    assert_eq!(ez, 0.0, "({i}, {j}) outside cone");
                } else if distance == 8 && ez != 0.0 {
                    reached = true;
                }
            }
        }
        assert!(reached, "front should reach distance 8");
    }

    #[test]
    fn default_length_run_stays_finite() {
        let u = FieldUpdater::builder()
            .source(Cell::new(20, 20), GaussianPulse::default())
            .build()
            .unwrap();
        let mut s = GridState::vacuum(dims(40, 40));
        run(&u, &mut s, 300);
        assert!(s.max_abs_ez().is_finite());
        assert!(s.energy().is_finite());
    }

    #[test]
    fn checkerboard_mode_is_amplified() {
        let u = FieldUpdater::builder().dt(0.5).boundary_coefficient(0.0).build().unwrap();
        let mut s = GridState::vacuum(dims(16, 16));
        for i in 1..15 {
            for j in 1..15 {
                let sign = if (i + j) % 2 == 0 { 1.0 } else { -1.0 };
                s.set_ez(i, j, sign * 1e-3).unwrap();
            }
        }
        run(&u, &mut s, 10);
        assert!(s.max_abs_ez() > 1.0);
    }

    proptest! {
        #[test]
        fn step_is_linear_in_the_fields(
            seed_a in any::<u64>(),
            seed_b in any::<u64>(),
            dt in 0.0f64..0.7,
        ) {
            let u = FieldUpdater::builder().dt(dt).build().unwrap();
            let mut a = seeded_state(9, 7, seed_a);
            let mut b = seeded_state(9, 7, seed_b);
            let mut sum = GridState::vacuum(dims(9, 7));
            for i in 0..9 {
                for j in 0..7 {
                    sum.set_hx(i, j, a.hx(i, j).unwrap() + b.hx(i, j).unwrap()).unwrap();
                    sum.set_hy(i, j, a.hy(i, j).unwrap() + b.hy(i, j).unwrap()).unwrap();
                    sum.set_ez(i, j, a.ez(i, j).unwrap() + b.ez(i, j).unwrap()).unwrap();
                }
            }
            for t in 0..3 {
                u.step(&mut a, StepId(t)).unwrap();
                u.step(&mut b, StepId(t)).unwrap();
                u.step(&mut sum, StepId(t)).unwrap();
            }
            for i in 0..9 {
                for j in 0..7 {
                    let expected = a.ez(i, j).unwrap() + b.ez(i, j).unwrap();
                    prop_assert!((sum.ez(i, j).unwrap() - expected).abs() < 1e-9);
                }
            }
        }
    }
}
