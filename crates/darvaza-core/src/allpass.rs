//! Allpass filter for reverb diffusion.
//!
//! A Schroeder allpass over a fixed ring buffer:
//!
//! ```text
//! bufout      = buffer[idx]
//! out         = -in + bufout
//! buffer[idx] = in + bufout * feedback
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::flush_denormal;

/// Schroeder allpass filter.
///
/// # Example
///
/// ```rust
/// use darvaza_core::AllpassFilter;
///
/// let mut allpass = AllpassFilter::new(556);
/// assert_eq!(allpass.feedback(), 0.5);
/// assert_eq!(allpass.process(1.0), -1.0);
/// ```
#[derive(Debug, Clone)]
pub struct AllpassFilter {
    buffer: Vec<f32>,
    index: usize,
    feedback: f32,
}

impl AllpassFilter {
    /// Create an allpass with a delay of `delay_samples` (at least one).
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            index: 0,
            feedback: 0.5,
        }
    }

    /// Set the feedback coefficient. Stable for |feedback| < 1.
    #[inline]
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(-0.99, 0.99);
    }

    /// Current feedback.
    #[inline]
    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let bufout = self.buffer[self.index];
        let output = -input + bufout;

        self.buffer[self.index] = flush_denormal(input + bufout * self.feedback);

        self.index += 1;
        if self.index >= self.buffer.len() {
            self.index = 0;
        }

        output
    }

    /// Zero the delay line.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
    }

    /// Delay length in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allpass_impulse() {
        let mut allpass = AllpassFilter::new(4);
        assert_eq!(allpass.process(1.0), -1.0);
        for _ in 0..3 {
            assert_eq!(allpass.process(0.0), 0.0);
        }
        // stored input returns after the delay
        assert_eq!(allpass.process(0.0), 1.0);
    }

    #[test]
    fn test_allpass_impulse_energy() {
        let mut allpass = AllpassFilter::new(50);
        let mut energy = 0.0f32;
        energy += allpass.process(1.0).powi(2);
        for _ in 0..10_000 {
            energy += allpass.process(0.0).powi(2);
        }
        // -1 followed by a geometric tail 1, g, g^2, ...
        let expected = 1.0 + 1.0 / (1.0 - 0.25);
        assert!((energy - expected).abs() < 0.01, "energy = {}", energy);
    }

    #[test]
    fn test_clear() {
        let mut allpass = AllpassFilter::new(4);
        allpass.process(1.0);
        allpass.clear();
        for _ in 0..8 {
            assert_eq!(allpass.process(0.0), 0.0);
        }
    }
}
