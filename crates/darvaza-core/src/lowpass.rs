//! One-pole anti-alias lowpass steered by a decimation ratio.
//!
//! Difference equation:
//!
//! ```text
//! y[n] = x[n] + coeff * (y[n-1] - x[n])
//! coeff = exp(-2π * cutoff / sample_rate)
//! cutoff = (sample_rate / 2) / ratio
//! ```
//!
//! The playback engine holds every decimated sample for several output
//! samples; raising the ratio pulls the cutoff down from Nyquist so less of
//! the resulting imaging reaches the output. 6 dB/octave, zero latency.

use crate::flush_denormal;
use libm::expf;

/// One-pole lowpass with its cutoff expressed as a fraction of Nyquist.
///
/// # Invariants
///
/// - `ratio >= 1`, so the cutoff never exceeds Nyquist
/// - `coeff` is in `[0, 1)`
///
/// # Example
///
/// ```rust
/// use darvaza_core::LowPassFilter;
///
/// let mut lp = LowPassFilter::new(44100.0);
/// lp.set_ratio(2.0);
/// assert_eq!(lp.cutoff(), 11025.0);
/// assert!(lp.process(1.0) < 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    state: f32,
    coeff: f32,
    ratio: f32,
    sample_rate: f32,
}

impl LowPassFilter {
    /// Create a filter with its cutoff at Nyquist (ratio 1).
    pub fn new(sample_rate: f32) -> Self {
        let mut filter = Self {
            state: 0.0,
            coeff: 0.0,
            ratio: 1.0,
            sample_rate,
        };
        filter.recalculate_coeff();
        filter
    }

    /// Set the decimation ratio; values below 1 are treated as 1.
    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio = ratio.max(1.0);
        self.recalculate_coeff();
    }

    /// Current decimation ratio.
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Cutoff frequency in Hz.
    pub fn cutoff(&self) -> f32 {
        self.sample_rate * 0.5 / self.ratio
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = flush_denormal(input + self.coeff * (self.state - input));
        self.state
    }

    /// Reset filter state to zero.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }

    /// Update sample rate and recalculate the coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    fn recalculate_coeff(&mut self) {
        if self.sample_rate <= 0.0 {
            self.coeff = 0.0;
            return;
        }
        self.coeff = expf(-core::f32::consts::TAU * self.cutoff() / self.sample_rate);
    }
}
