//! Mathematical utility functions for DSP.
//!
//! Allocation-free helpers shared by the Darvaza signal chain, suitable for
//! `no_std`.
//!
//! # Control Scaling
//!
//! Host parameters arrive normalized to `[0, 1]`. These helpers map them onto
//! the ranges the processors work in:
//!
//! - [`cap`] - Clamp a value into `[0, max]`
//! - [`scale`] - Map `[0, max_value]` linearly onto `[0, max_compare]`
//!
//! # Pitch & Time
//!
//! - [`pitch_ratio`] - Semitone offset to playback-rate ratio
//! - [`seconds_to_samples`] - Duration to a whole sample count

use libm::{powf, roundf};

/// Flush denormal floats to zero.
///
/// Values smaller than `1e-20` in magnitude are replaced with zero to keep
/// recursive filters out of the denormal range, where some CPUs slow down by
/// two orders of magnitude.
///
/// # Example
/// ```rust
/// use darvaza_core::flush_denormal;
///
/// assert_eq!(flush_denormal(1e-30), 0.0);
/// assert_eq!(flush_denormal(0.5), 0.5);
/// ```
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Clamp `value` into `[0, max]`.
///
/// NaN collapses to zero so a corrupt control value can never reach the
/// audio path.
#[inline]
pub fn cap(value: f32, max: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max)
}

/// Map `value` from `[0, max_value]` onto `[0, max_compare]`.
///
/// The input is capped first, so out-of-range controls saturate at the ends
/// of the target range.
///
/// # Example
/// ```rust
/// use darvaza_core::scale;
///
/// assert_eq!(scale(0.5, 1.0, 15.0), 7.5);
/// assert_eq!(scale(3.0, 1.0, 15.0), 15.0);
/// ```
#[inline]
pub fn scale(value: f32, max_value: f32, max_compare: f32) -> f32 {
    if max_value <= 0.0 {
        return 0.0;
    }
    cap(value, max_value) / max_value * max_compare
}

/// Convert a semitone offset to a playback-rate ratio.
///
/// Negative offsets pitch down (ratio below one), positive offsets pitch up.
///
/// # Example
/// ```rust
/// use darvaza_core::pitch_ratio;
///
/// assert!((pitch_ratio(-12.0) - 0.5).abs() < 1e-6);
/// assert!((pitch_ratio(12.0) - 2.0).abs() < 1e-6);
/// ```
#[inline]
pub fn pitch_ratio(semitones: f32) -> f32 {
    powf(2.0, semitones / 12.0)
}

/// Convert a duration in seconds to the nearest whole number of samples.
#[inline]
pub fn seconds_to_samples(seconds: f32, sample_rate: f32) -> usize {
    let samples = roundf(seconds * sample_rate);
    if samples <= 0.0 { 0 } else { samples as usize }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1e-25), 0.0);
        assert_eq!(flush_denormal(-1e-25), 0.0);
        assert_eq!(flush_denormal(1e-10), 1e-10);
    }

    #[test]
    fn test_cap() {
        assert_eq!(cap(-0.5, 1.0), 0.0);
        assert_eq!(cap(0.25, 1.0), 0.25);
        assert_eq!(cap(4.0, 1.0), 1.0);
        assert_eq!(cap(f32::NAN, 1.0), 0.0);
    }

    #[test]
    fn test_scale() {
        assert_eq!(scale(0.0, 1.0, 21.0), 0.0);
        assert_eq!(scale(1.0, 1.0, 21.0), 21.0);
        assert_eq!(scale(0.5, 2.0, 8.0), 2.0);
        assert_eq!(scale(1.0, 0.0, 8.0), 0.0);
    }

    #[test]
    fn test_pitch_ratio() {
        assert!((pitch_ratio(0.0) - 1.0).abs() < 1e-6);
        assert!((pitch_ratio(-1.0) - 0.943_874_3).abs() < 1e-5);
        assert!(pitch_ratio(-8.0) < pitch_ratio(-1.0));
    }

    #[test]
    fn test_seconds_to_samples() {
        assert_eq!(seconds_to_samples(2.0, 44100.0), 88200);
        assert_eq!(seconds_to_samples(30.0, 48000.0), 1_440_000);
        assert_eq!(seconds_to_samples(-1.0, 48000.0), 0);
    }
}
