//! The set of step indices at which Ez is exported.

use ezwave_core::StepId;
use smallvec::SmallVec;

/// Sorted, de-duplicated snapshot steps.
///
/// Membership is checked once per step, so the steps are kept sorted for
/// binary search. Entries at or beyond the run length are kept but never
/// fire; [`unreachable`](Self::unreachable) reports them.
///
/// # Examples
///
/// ```
/// use ezwave_core::StepId;
/// use ezwave_engine::SnapshotSchedule;
///
/// let schedule = SnapshotSchedule::new([200, 60, 320, 120, 60]);
/// assert_eq!(schedule.len(), 4);
/// assert!(schedule.contains(StepId(120)));
/// assert_eq!(schedule.reachable(300), 3);
/// assert_eq!(schedule.unreachable(300).collect::<Vec<_>>(), vec![320]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapshotSchedule {
    steps: SmallVec<[u64; 8]>,
}

impl SnapshotSchedule {
    /// Build a schedule from any collection of step indices.
    pub fn new(steps: impl IntoIterator<Item = u64>) -> Self {
        let mut steps: SmallVec<[u64; 8]> = steps.into_iter().collect();
        steps.sort_unstable();
        steps.dedup();
        Self { steps }
    }

    /// A schedule that never fires.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether a snapshot is due at step `t`.
    pub fn contains(&self, t: StepId) -> bool {
        self.steps.binary_search(&t.0).is_ok()
    }

    /// Number of distinct scheduled steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no steps are scheduled.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Scheduled steps in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = StepId> + '_ {
        self.steps.iter().copied().map(StepId)
    }

    /// How many scheduled steps fall inside a run of `total_steps`.
    pub fn reachable(&self, total_steps: u64) -> usize {
        self.steps.partition_point(|&s| s < total_steps)
    }

    /// Scheduled steps a run of `total_steps` never reaches.
    pub fn unreachable(&self, total_steps: u64) -> impl Iterator<Item = u64> + '_ {
        self.steps[self.reachable(total_steps)..].iter().copied()
    }
}

impl FromIterator<u64> for SnapshotSchedule {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self::new(iter)
    }
}
