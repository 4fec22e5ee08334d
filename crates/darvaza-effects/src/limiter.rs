//! Linked multichannel lookahead peak limiter.
//!
//! # Algorithm
//!
//! 1. **Lookahead buffering**: every channel is written into its own ring of
//!    `attack + 1` samples; the oldest entry is the one sent to the output.
//! 2. **Peak detection**: the maximum magnitude across all rings, so the
//!    window covers the outgoing sample and everything queued behind it.
//! 3. **Gain computation**: `target = threshold / peak` when the peak exceeds
//!    the threshold, otherwise 1.
//! 4. **Gain smoothing**: reductions apply instantly (the lookahead already
//!    provides the attack); recoveries follow a one-pole release:
//!    `g = release_coeff * g + (1 - release_coeff) * target`.
//!
//! The gain never exceeds `threshold / peak` for a window that contains the
//! outgoing sample, so the output never exceeds the threshold.
//!
//! # Linking
//!
//! All channels share one gain, so a transient on any channel ducks every
//! channel equally and the stereo image stays put.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use darvaza_core::AudioBuffer;
use libm::{expf, fabsf};

/// Linked lookahead peak limiter over an [`AudioBuffer`].
///
/// ## Parameters
/// - `threshold`: linear peak ceiling
/// - `attack_ms`: lookahead window, also the latency
/// - `release_ms`: recovery time constant
///
/// # Example
///
/// ```rust
/// use darvaza_core::AudioBuffer;
/// use darvaza_effects::Limiter;
///
/// let mut limiter = Limiter::new(48000.0, 1.0, 100.0, 0.5);
/// let mut block = AudioBuffer::new(2, 256);
/// block.channel_mut(0).fill(0.9);
/// limiter.process(&mut block, 2, 256);
/// assert!(block.channel(0).iter().all(|s| s.abs() <= 0.5 + 1e-6));
/// ```
#[derive(Debug, Clone)]
pub struct Limiter {
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
    threshold: f32,
    release_coeff: f32,
    rings: Vec<Vec<f32>>,
    ring_len: usize,
    write_pos: usize,
    gain: f32,
}

impl Limiter {
    /// Create a limiter; `threshold` is a linear peak level.
    pub fn new(sample_rate: f32, attack_ms: f32, release_ms: f32, threshold: f32) -> Self {
        let mut limiter = Self {
            sample_rate,
            attack_ms: attack_ms.max(0.0),
            release_ms: release_ms.max(0.0),
            threshold: threshold.max(1e-6),
            release_coeff: 0.0,
            rings: Vec::new(),
            ring_len: 1,
            write_pos: 0,
            gain: 1.0,
        };
        limiter.release_coeff = compute_release_coeff(limiter.release_ms, sample_rate);
        limiter.ring_len = ms_to_samples(limiter.attack_ms, sample_rate) + 1;
        limiter
    }

    /// Allocate lookahead rings for at least `channels` channels.
    ///
    /// Only allocates when the channel count grows.
    pub fn ensure_channels(&mut self, channels: usize) {
        while self.rings.len() < channels {
            self.rings.push(vec![0.0; self.ring_len]);
        }
    }

    /// Limit the first `len` samples of the first `channels` channels in place.
    pub fn process(&mut self, buffer: &mut AudioBuffer, channels: usize, len: usize) {
        let channels = channels.min(buffer.channel_count());
        let len = len.min(buffer.buffer_size());
        self.ensure_channels(channels);

        for i in 0..len {
            for c in 0..channels {
                self.rings[c][self.write_pos] = buffer.channel(c)[i];
            }

            let peak = self.rings[..channels]
                .iter()
                .flat_map(|ring| ring.iter())
                .fold(0.0f32, |acc, s| acc.max(fabsf(*s)));

            let target = if peak > self.threshold {
                self.threshold / peak
            } else {
                1.0
            };
            self.gain = if target < self.gain {
                target
            } else {
                self.release_coeff * self.gain + (1.0 - self.release_coeff) * target
            };

            let read_pos = (self.write_pos + 1) % self.ring_len;
            for c in 0..channels {
                let delayed = self.rings[c][read_pos];
                buffer.channel_mut(c)[i] = (delayed * self.gain).clamp(-self.threshold, self.threshold);
            }
            self.write_pos = read_pos;
        }
    }

    /// Set the linear threshold.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold.max(1e-6);
    }

    /// Linear threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Set the lookahead window. Resizes (and clears) the rings.
    pub fn set_attack_ms(&mut self, attack_ms: f32) {
        self.attack_ms = attack_ms.max(0.0);
        self.resize_rings();
    }

    /// Lookahead window in milliseconds.
    pub fn attack_ms(&self) -> f32 {
        self.attack_ms
    }

    /// Set the release time constant.
    pub fn set_release_ms(&mut self, release_ms: f32) {
        self.release_ms = release_ms.max(0.0);
        self.release_coeff = compute_release_coeff(self.release_ms, self.sample_rate);
    }

    /// Release time constant in milliseconds.
    pub fn release_ms(&self) -> f32 {
        self.release_ms
    }

    /// Change the sample rate, resizing the lookahead window.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.release_coeff = compute_release_coeff(self.release_ms, sample_rate);
        self.resize_rings();
    }

    /// Gain currently applied, 1.0 meaning no reduction.
    pub fn gain_reduction(&self) -> f32 {
        self.gain
    }

    /// Latency in samples introduced by the lookahead.
    pub fn latency_samples(&self) -> usize {
        self.ring_len - 1
    }

    /// Clear the lookahead and release the gain.
    pub fn reset(&mut self) {
        for ring in &mut self.rings {
            ring.fill(0.0);
        }
        self.write_pos = 0;
        self.gain = 1.0;
    }

    fn resize_rings(&mut self) {
        self.ring_len = ms_to_samples(self.attack_ms, self.sample_rate) + 1;
        for ring in &mut self.rings {
            *ring = vec![0.0; self.ring_len];
        }
        self.write_pos = 0;
        self.gain = 1.0;
    }
}

/// Convert milliseconds to a sample count at the given sample rate.
#[inline]
fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    ((ms * sample_rate) / 1000.0) as usize
}

/// Compute the one-pole release coefficient.
///
/// `coeff = exp(-1 / (release_ms * sample_rate / 1000))`
#[inline]
fn compute_release_coeff(release_ms: f32, sample_rate: f32) -> f32 {
    let tau = release_ms * sample_rate / 1000.0;
    if tau < 1.0 { 0.0 } else { expf(-1.0 / tau) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_block(channels: usize, len: usize, amplitude: f32) -> AudioBuffer {
        let mut buffer = AudioBuffer::new(channels, len);
        for c in 0..channels {
            for (i, s) in buffer.channel_mut(c).iter_mut().enumerate() {
                *s = amplitude * (i as f32 * 0.07 + c as f32).sin();
            }
        }
        buffer
    }

    #[test]
    fn test_latency_matches_attack() {
        let limiter = Limiter::new(48000.0, 10.0, 500.0, 0.6);
        assert_eq!(limiter.latency_samples(), 480);
    }

    #[test]
    fn test_never_exceeds_threshold() {
        let mut limiter = Limiter::new(44100.0, 10.0, 500.0, 0.6);
        for _ in 0..8 {
            let mut block = sine_block(2, 512, 3.0);
            limiter.process(&mut block, 2, 512);
            for c in 0..2 {
                for s in block.channel(c) {
                    assert!(s.abs() <= 0.6 + 1e-6, "sample {} over threshold", s);
                }
            }
        }
    }

    #[test]
    fn test_quiet_signal_passes_delayed() {
        let mut limiter = Limiter::new(1000.0, 4.0, 50.0, 0.6);
        let mut block = AudioBuffer::new(1, 16);
        for (i, s) in block.channel_mut(0).iter_mut().enumerate() {
            *s = i as f32 * 0.01;
        }
        limiter.process(&mut block, 1, 16);
        let out = block.channel(0);
        assert_eq!(&out[..4], &[0.0; 4]);
        for i in 4..16 {
            assert!((out[i] - (i - 4) as f32 * 0.01).abs() < 1e-6);
        }
    }

    #[test]
    fn test_channels_are_linked() {
        let mut limiter = Limiter::new(48000.0, 0.0, 100.0, 0.5);
        let mut block = AudioBuffer::new(2, 4);
        block.channel_mut(0).fill(1.0);
        block.channel_mut(1).fill(0.25);
        limiter.process(&mut block, 2, 4);
        // loud channel 0 halves the gain for channel 1 too
        assert!((block.channel(0)[3] - 0.5).abs() < 1e-6);
        assert!((block.channel(1)[3] - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_release_recovers() {
        let mut limiter = Limiter::new(48000.0, 0.0, 10.0, 0.5);
        let mut loud = AudioBuffer::new(1, 64);
        loud.channel_mut(0).fill(1.0);
        limiter.process(&mut loud, 1, 64);
        assert!((limiter.gain_reduction() - 0.5).abs() < 1e-6);

        let mut quiet = AudioBuffer::new(1, 4800);
        quiet.channel_mut(0).fill(0.1);
        limiter.process(&mut quiet, 1, 4800);
        assert!(limiter.gain_reduction() > 0.99);
    }

    #[test]
    fn test_reset() {
        let mut limiter = Limiter::new(48000.0, 1.0, 100.0, 0.5);
        let mut block = sine_block(1, 128, 2.0);
        limiter.process(&mut block, 1, 128);
        limiter.reset();
        assert_eq!(limiter.gain_reduction(), 1.0);
        let mut silent = AudioBuffer::new(1, 64);
        limiter.process(&mut silent, 1, 64);
        assert!(silent.is_silent());
    }

    #[test]
    fn test_setters_retune_limiter() {
        let mut limiter = Limiter::new(48000.0, 10.0, 500.0, 0.6);
        limiter.set_attack_ms(2.0);
        limiter.set_release_ms(50.0);
        limiter.set_threshold(0.3);
        assert_eq!(limiter.latency_samples(), 96);
        assert_eq!(limiter.attack_ms(), 2.0);
        assert_eq!(limiter.release_ms(), 50.0);
        assert_eq!(limiter.threshold(), 0.3);

        let mut block = sine_block(1, 1024, 2.0);
        limiter.process(&mut block, 1, 1024);
        assert!(block.channel(0).iter().all(|s| s.abs() <= 0.3 + 1e-6));
    }

    #[test]
    fn test_partial_block() {
        let mut limiter = Limiter::new(48000.0, 0.0, 100.0, 0.5);
        let mut block = AudioBuffer::new(1, 8);
        block.channel_mut(0).fill(1.0);
        limiter.process(&mut block, 1, 4);
        assert_eq!(&block.channel(0)[4..], &[1.0; 4]);
    }
}
