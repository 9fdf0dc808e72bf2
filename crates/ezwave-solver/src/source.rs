//! Time-varying excitations injected into Ez at a single cell.
//!
//! An [`Excitation`] maps a step index to an additive Ez contribution and
//! declares the window in which it is active. The updater only calls
//! [`value`](Excitation::value) while [`is_active`](Excitation::is_active)
//! holds; outside the window the contribution is implicitly zero.

use ezwave_core::StepId;

/// A source waveform sampled once per step.
///
/// # Contract
///
/// - `value()` MUST be deterministic in `t`.
/// - `&self`: excitations are stateless.
pub trait Excitation: Send + Sync + 'static {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Whether the source contributes at step `t`.
    fn is_active(&self, t: StepId) -> bool;

    /// Amplitude added to Ez at step `t`.
    fn value(&self, t: StepId) -> f64;
}

/// A truncated Gaussian pulse.
///
/// `value(t) = amplitude * exp(-0.5 * ((t - center) / width)^2)`, active
/// for `t < cutoff`. With the default parameters the cutoff (30) falls
/// before the centre (40), so only the rising flank is ever injected.
///
/// # Examples
///
/// ```
/// use ezwave_core::StepId;
/// use ezwave_solver::{Excitation, GaussianPulse};
///
/// let pulse = GaussianPulse::default();
/// assert!((pulse.value(StepId(10)) - 3.0 * (-2.0f64).exp()).abs() < 1e-12);
/// assert!(pulse.is_active(StepId(29)));
/// assert!(!pulse.is_active(StepId(30)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianPulse {
    amplitude: f64,
    center: f64,
    width: f64,
    cutoff: u64,
}

impl GaussianPulse {
    /// Create a pulse, validating its parameters.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `amplitude` or `center` is not finite, or `width`
    /// is not finite and > 0.
    pub fn new(amplitude: f64, center: f64, width: f64, cutoff: u64) -> Result<Self, String> {
        if !amplitude.is_finite() {
            return Err(format!("amplitude must be finite, got {amplitude}"));
        }
        if !center.is_finite() {
            return Err(format!("center must be finite, got {center}"));
        }
        if !(width.is_finite() && width > 0.0) {
            return Err(format!("width must be finite and > 0, got {width}"));
        }
        Ok(Self {
            amplitude,
            center,
            width,
            cutoff,
        })
    }

    /// Peak amplitude.
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Step at which the untruncated pulse peaks.
    pub fn center(&self) -> f64 {
        self.center
    }

    /// Standard deviation in steps.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// First step at which the pulse is no longer injected.
    pub fn cutoff(&self) -> u64 {
        self.cutoff
    }

    /// Whether the active window ends before the pulse peaks.
    pub fn is_truncated_before_peak(&self) -> bool {
        (self.cutoff as f64) <= self.center
    }
}

impl Default for GaussianPulse {
    fn default() -> Self {
        Self {
            amplitude: 3.0,
            center: 40.0,
            width: 15.0,
            cutoff: 30,
        }
    }
}

impl Excitation for GaussianPulse {
    fn name(&self) -> &str {
        "GaussianPulse"
    }

    fn is_active(&self, t: StepId) -> bool {
        t.0 < self.cutoff
    }

    fn value(&self, t: StepId) -> f64 {
        let x = (t.as_f64() - self.center) / self.width;
        self.amplitude * (-0.5 * x * x).exp()
    }
}

/// A single-step kick of fixed amplitude.
#[derive(Clone, Debug, PartialEq)]
pub struct Impulse {
    amplitude: f64,
    at: StepId,
}

impl Impulse {
    /// An impulse of `amplitude` injected only at step `at`.
    pub fn new(amplitude: f64, at: StepId) -> Self {
        Self { amplitude, at }
    }

    /// A unit impulse at step 0.
    pub fn unit() -> Self {
        Self::new(1.0, StepId(0))
    }
}

impl Excitation for Impulse {
    fn name(&self) -> &str {
        "Impulse"
    }

    fn is_active(&self, t: StepId) -> bool {
        t == self.at
    }

    fn value(&self, t: StepId) -> f64 {
        if t == self.at {
            self.amplitude
        } else {
            0.0
        }
    }
}
