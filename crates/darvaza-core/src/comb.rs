//! Damped feedback comb filter for Freeverb-style reverbs.
//!
//! Each comb is a fixed-length ring buffer whose fed-back signal passes
//! through a one-pole lowpass (the "damping"):
//!
//! ```text
//! out         = buffer[idx]
//! filterstore = out * (1 - damp) + filterstore * damp
//! buffer[idx] = in + filterstore * feedback
//! ```
//!
//! Feedback is allowed to reach exactly 1.0. Together with zero damping that
//! makes the loop lossless, which is how a reverb freezes its tail.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::flush_denormal;

/// Comb filter with feedback and damping.
///
/// # Example
///
/// ```rust
/// use darvaza_core::CombFilter;
///
/// let mut comb = CombFilter::new(1000);
/// comb.set_feedback(0.84);
/// comb.set_damp(0.2);
///
/// // first output comes from the empty delay line
/// assert_eq!(comb.process(1.0), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct CombFilter {
    buffer: Vec<f32>,
    index: usize,
    feedback: f32,
    damp1: f32,
    damp2: f32,
    filterstore: f32,
}

impl CombFilter {
    /// Create a comb filter with a delay of `delay_samples` (at least one).
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            index: 0,
            feedback: 0.5,
            damp1: 0.5,
            damp2: 0.5,
            filterstore: 0.0,
        }
    }

    /// Set the feedback amount, clamped to `[0, 1]`.
    ///
    /// 1.0 sustains the loop forever when damping is zero.
    #[inline]
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 1.0);
    }

    /// Current feedback.
    #[inline]
    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Set the damping amount, clamped to `[0, 1]`.
    ///
    /// - 0.0 = no damping (bright)
    /// - 1.0 = full damping (dark)
    #[inline]
    pub fn set_damp(&mut self, damp: f32) {
        self.damp1 = damp.clamp(0.0, 1.0);
        self.damp2 = 1.0 - self.damp1;
    }

    /// Current damping.
    #[inline]
    pub fn damp(&self) -> f32 {
        self.damp1
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.index];

        self.filterstore = flush_denormal(output * self.damp2 + self.filterstore * self.damp1);
        self.buffer[self.index] = input + self.filterstore * self.feedback;

        self.index += 1;
        if self.index >= self.buffer.len() {
            self.index = 0;
        }

        output
    }

    /// Zero the delay line and the damping state.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.filterstore = 0.0;
    }

    /// Delay length in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Sum of squares of everything held in the delay line.
    pub fn energy(&self) -> f32 {
        self.buffer.iter().map(|s| s * s).sum()
    }
}
