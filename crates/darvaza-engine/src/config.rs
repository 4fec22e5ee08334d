//! Construction-time settings for the [`Processor`](crate::Processor).

/// Seconds of audio the record ring holds.
pub const MAX_RECORD_SECONDS: f32 = 30.0;

/// Slowest playback rate the rate control reaches.
pub const MIN_PLAYBACK_SPEED: f32 = 0.5;

/// Lowest effective sample rate the downsampler reaches.
pub const MIN_SAMPLE_RATE: f32 = 2000.0;

/// How the playback engine blends the two record samples around a
/// fractional read position.
///
/// `Fixed(0.0)` always takes the earlier sample (a sample-and-hold read),
/// which is how the effect has always sounded. `Linear` uses the true
/// fractional remainder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interpolation {
    /// Constant blend fraction, clamped to `[0, 1]`.
    Fixed(f32),
    /// Blend by the fractional part of the read position.
    Linear,
}

impl Default for Interpolation {
    fn default() -> Self {
        Interpolation::Fixed(0.0)
    }
}

impl Interpolation {
    /// Blend fraction for a read position whose fractional part is `remainder`.
    #[inline]
    pub fn fraction(self, remainder: f32) -> f32 {
        match self {
            Interpolation::Fixed(fraction) => fraction.clamp(0.0, 1.0),
            Interpolation::Linear => remainder,
        }
    }
}

/// Settings fixed for the lifetime of a [`Processor`](crate::Processor).
///
/// # Example
///
/// ```rust
/// use darvaza_engine::{Interpolation, ProcessorConfig};
///
/// let config = ProcessorConfig {
///     interpolation: Interpolation::Linear,
///     ..ProcessorConfig::new(48000.0, 2)
/// };
/// assert_eq!(config.record_samples(), 1_440_000);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Channels to preallocate; more are added on demand.
    pub channels: usize,
    /// Length of the record ring in seconds.
    pub max_record_seconds: f32,
    /// Limiter ceiling (linear).
    pub limiter_threshold: f32,
    /// Limiter lookahead in milliseconds.
    pub limiter_attack_ms: f32,
    /// Limiter release in milliseconds.
    pub limiter_release_ms: f32,
    /// Bit crusher gain into the quantizer.
    pub crusher_input_mix: f32,
    /// Bit crusher gain after the quantizer.
    pub crusher_output_mix: f32,
    /// Playback read interpolation.
    pub interpolation: Interpolation,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            channels: 2,
            max_record_seconds: MAX_RECORD_SECONDS,
            limiter_threshold: 0.6,
            limiter_attack_ms: 10.0,
            limiter_release_ms: 500.0,
            crusher_input_mix: 0.5,
            crusher_output_mix: 0.5,
            interpolation: Interpolation::default(),
        }
    }
}

impl ProcessorConfig {
    /// Defaults at the given sample rate and channel count.
    pub fn new(sample_rate: f32, channels: usize) -> Self {
        Self {
            sample_rate,
            channels,
            ..Self::default()
        }
    }

    /// Record ring length in samples.
    pub fn record_samples(&self) -> usize {
        darvaza_core::seconds_to_samples(self.max_record_seconds, self.sample_rate).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProcessorConfig::default();
        assert_eq!(config.sample_rate, 44100.0);
        assert_eq!(config.channels, 2);
        assert_eq!(config.record_samples(), 1_323_000);
        assert_eq!(config.interpolation, Interpolation::Fixed(0.0));
        assert_eq!(config.crusher_input_mix, 0.5);
        assert_eq!(config.crusher_output_mix, 0.5);
    }

    #[test]
    fn test_interpolation_fraction() {
        assert_eq!(Interpolation::Fixed(0.0).fraction(0.7), 0.0);
        assert_eq!(Interpolation::Fixed(1.5).fraction(0.7), 1.0);
        assert_eq!(Interpolation::Linear.fraction(0.7), 0.7);
    }
}
