//! Snapshot export: owned copies of Ez handed to a sink.
//!
//! A [`FieldSnapshot`] is an owned value. Ez is copied; the static
//! material maps are shared by `Arc`. Sinks may move snapshots to other
//! threads without touching the running simulation.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use ezwave_core::{Cell, Dims, GridError, Rect, StepId};
use ezwave_grid::{ConductorMask, Field2D, GridState, PermittivityMap};

/// Colour-scale floor used by renderers when the field is near zero.
const DISPLAY_SCALE_FLOOR: f64 = 0.01;

// ── FieldSnapshot ───────────────────────────────────────────────

/// Ez and the static maps at one step.
#[derive(Clone, Debug)]
pub struct FieldSnapshot {
    step: StepId,
    ez: Field2D,
    conductor: Arc<ConductorMask>,
    permittivity: Arc<PermittivityMap>,
    source: Option<Cell>,
}

impl FieldSnapshot {
    /// Copy Ez out of `state` as of step `step`.
    pub fn capture(state: &GridState, step: StepId, source: Option<Cell>) -> Self {
        Self {
            step,
            ez: state.ez_field().clone(),
            conductor: state.conductor_handle(),
            permittivity: state.permittivity_handle(),
            source,
        }
    }

    /// The step this snapshot was taken after.
    pub fn step(&self) -> StepId {
        self.step
    }

    /// Grid extent.
    pub fn dims(&self) -> Dims {
        self.ez.dims()
    }

    /// The Ez array.
    pub fn ez(&self) -> &Field2D {
        &self.ez
    }

    /// The conductor mask.
    pub fn conductor(&self) -> &ConductorMask {
        &self.conductor
    }

    /// The permittivity map.
    pub fn permittivity(&self) -> &PermittivityMap {
        &self.permittivity
    }

    /// The source cell, if the run had one.
    pub fn source(&self) -> Option<Cell> {
        self.source
    }

    /// Largest |Ez|.
    pub fn max_abs_ez(&self) -> f64 {
        self.ez.max_abs()
    }

    /// Symmetric colour-scale bound: `max_abs_ez()` floored at 0.01.
    pub fn display_scale(&self) -> f64 {
        self.max_abs_ez().max(DISPLAY_SCALE_FLOOR)
    }

    /// Ez inside `rect`, clipped to the grid. `None` when the clipped
    /// region is empty.
    pub fn region(&self, rect: &Rect) -> Option<Field2D> {
        self.ez.region(rect)
    }

    /// Ez along x at fixed `j`.
    pub fn slice_x(&self, j: usize) -> Result<Vec<f64>, GridError> {
        self.ez.slice_x(j)
    }

    /// Number of conductor cells.
    pub fn conductor_cells(&self) -> usize {
        self.conductor.count()
    }

    /// Number of cells with ε_r above vacuum.
    pub fn dielectric_cells(&self) -> usize {
        self.permittivity.dielectric_count()
    }
}

// ── SinkError ───────────────────────────────────────────────────

/// A sink could not accept a snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkError {
    /// What went wrong.
    pub reason: String,
}

impl SinkError {
    /// Wrap a reason string.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "snapshot sink failed: {}", self.reason)
    }
}

impl Error for SinkError {}

// ── SnapshotSink ────────────────────────────────────────────────

/// Receiver of exported snapshots.
///
/// Called synchronously from the simulation loop, in step order. An
/// error aborts the run.
pub trait SnapshotSink {
    /// Accept one snapshot.
    fn record(&mut self, snapshot: FieldSnapshot) -> Result<(), SinkError>;

    /// Called once after the last step. Default: no-op.
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: SnapshotSink + ?Sized> SnapshotSink for &mut S {
    fn record(&mut self, snapshot: FieldSnapshot) -> Result<(), SinkError> {
        (**self).record(snapshot)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        (**self).finish()
    }
}

/// Keeps every snapshot in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    snapshots: Vec<FieldSnapshot>,
}

impl VecSink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots received so far, in step order.
    pub fn snapshots(&self) -> &[FieldSnapshot] {
        &self.snapshots
    }

    /// Steps of the snapshots received so far.
    pub fn steps(&self) -> Vec<StepId> {
        self.snapshots.iter().map(FieldSnapshot::step).collect()
    }

    /// Take ownership of the collected snapshots.
    pub fn into_inner(self) -> Vec<FieldSnapshot> {
        self.snapshots
    }
}

impl SnapshotSink for VecSink {
    fn record(&mut self, snapshot: FieldSnapshot) -> Result<(), SinkError> {
        self.snapshots.push(snapshot);
        Ok(())
    }
}

/// Forwards snapshots over a crossbeam channel.
///
/// The receiving side typically lives on a writer thread. Once the
/// receiver is dropped, `record` fails.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Sender<FieldSnapshot>,
}

impl ChannelSink {
    /// Wrap an existing sender.
    pub fn new(tx: Sender<FieldSnapshot>) -> Self {
        Self { tx }
    }

    /// A sink paired with a bounded receiver of capacity `cap`.
    pub fn bounded(cap: usize) -> (Self, Receiver<FieldSnapshot>) {
        let (tx, rx) = crossbeam_channel::bounded(cap);
        (Self::new(tx), rx)
    }
}

impl SnapshotSink for ChannelSink {
    fn record(&mut self, snapshot: FieldSnapshot) -> Result<(), SinkError> {
        let step = snapshot.step();
        self.tx
            .send(snapshot)
            .map_err(|_| SinkError::new(format!("receiver disconnected at step {step}")))
    }
}

/// Discards every snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn record(&mut self, _snapshot: FieldSnapshot) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ezwave_grid::MaterialLayout;

    fn state() -> GridState {
        let dims = Dims::new(6, 5).unwrap();
        let (mask, eps) = MaterialLayout::new(dims)
            .conductor(Rect::new(4..6, 0..1))
            .dielectric(Rect::new(1..3, 1..3), 4.0)
            .build()
            .unwrap();
        let mut s = GridState::new(dims, mask, eps).unwrap();
        s.set_ez(2, 2, -0.75).unwrap();
        s.set_ez(1, 4, 0.5).unwrap();
        s
    }

    #[test]
    fn capture_copies_ez_and_shares_maps() {
        let mut s = state();
        let snap = FieldSnapshot::capture(&s, StepId(7), Some(Cell::new(3, 2)));
        s.set_ez(2, 2, 9.0).unwrap();

        assert_eq!(snap.step(), StepId(7));
        assert_eq!(snap.ez().get(2, 2).unwrap(), -0.75);
        assert_eq!(snap.source(), Some(Cell::new(3, 2)));
        assert!(Arc::ptr_eq(&snap.conductor, &s.conductor_handle()));
        assert_eq!(snap.conductor_cells(), 2);
        assert_eq!(snap.dielectric_cells(), 4);
    }

    #[test]
    fn display_scale_has_a_floor() {
        let s = state();
        let snap = FieldSnapshot::capture(&s, StepId(0), None);
        assert_eq!(snap.max_abs_ez(), 0.75);
        assert_eq!(snap.display_scale(), 0.75);

        let quiet = FieldSnapshot::capture(&GridState::vacuum(s.dims()), StepId(0), None);
        assert_eq!(quiet.max_abs_ez(), 0.0);
        assert_eq!(quiet.display_scale(), 0.01);
    }

    #[test]
    fn region_and_slice_views() {
        let snap = FieldSnapshot::capture(&state(), StepId(1), None);
        let inner = snap.region(&Rect::new(1..3, 1..3)).unwrap();
        assert_eq!(inner.dims(), Dims::new(2, 2).unwrap());
        assert_eq!(inner.get(1, 1).unwrap(), -0.75);
        assert!(snap.region(&Rect::new(3..1, 0..2)).is_none());

        let line = snap.slice_x(2).unwrap();
        assert_eq!(line, vec![0.0, 0.0, -0.75, 0.0, 0.0, 0.0]);
        assert!(snap.slice_x(5).is_err());
    }

    #[test]
    fn vec_sink_keeps_order() {
        let s = state();
        let mut sink = VecSink::new();
        for t in [3, 8] {
            sink.record(FieldSnapshot::capture(&s, StepId(t), None))
                .unwrap();
        }
        assert_eq!(sink.steps(), vec![StepId(3), StepId(8)]);
        assert_eq!(sink.into_inner().len(), 2);
    }

    #[test]
    fn channel_sink_forwards_and_reports_disconnect() {
        let s = state();
        let (mut sink, rx) = ChannelSink::bounded(4);
        sink.record(FieldSnapshot::capture(&s, StepId(2), None))
            .unwrap();
        assert_eq!(rx.recv().unwrap().step(), StepId(2));

        drop(rx);
        let err = sink
            .record(FieldSnapshot::capture(&s, StepId(5), None))
            .unwrap_err();
        assert!(err.reason.contains("step 5"), "{err}");
    }

    #[test]
    fn null_sink_accepts_everything() {
        let mut sink = NullSink;
        assert!(sink
            .record(FieldSnapshot::capture(&state(), StepId(0), None))
            .is_ok());
        assert!(sink.finish().is_ok());
    }

    #[test]
    fn sink_error_display() {
        let e = SinkError::new("disk full");
        assert_eq!(e.to_string(), "snapshot sink failed: disk full");
    }
}
