//! Core Effect trait.
//!
//! The [`Effect`] trait is the mono, sample-at-a-time contract shared by the
//! per-channel stages of the Darvaza chain (bit crusher, reverb). Multichannel
//! stages such as the limiter and the orchestrator work on whole
//! [`AudioBuffer`](crate::AudioBuffer)s instead.
//!
//! ## Design Decisions
//!
//! - **Mono processing**: one `f32` in, one `f32` out. The engine keeps one
//!   instance per channel in its channel arena.
//! - **Object-safe**: usable as `dyn Effect`, though the engine dispatches
//!   statically.
//! - **No allocations**: every method is callable from the audio thread.

/// Core trait for mono audio effects.
///
/// # Example
///
/// ```rust
/// use darvaza_core::Effect;
///
/// struct Gain {
///     gain: f32,
/// }
///
/// impl Effect for Gain {
///     fn process(&mut self, input: f32) -> f32 {
///         input * self.gain
///     }
///
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///
///     fn reset(&mut self) {}
/// }
///
/// let mut gain = Gain { gain: 0.5 };
/// let mut block = [1.0, -1.0];
/// gain.process_block_inplace(&mut block);
/// assert_eq!(block, [0.5, -0.5]);
/// ```
pub trait Effect {
    /// Process a single sample.
    fn process(&mut self, input: f32) -> f32;

    /// Process a block of samples.
    ///
    /// Default implementation calls [`process`](Effect::process) for each
    /// sample.
    ///
    /// # Panics
    /// Debug builds panic if `input.len() != output.len()`.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(
            input.len(),
            output.len(),
            "Input and output buffers must have same length"
        );
        for (inp, out) in input.iter().zip(output.iter_mut()) {
            *out = self.process(*inp);
        }
    }

    /// Process a block of samples in place.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Update the sample rate.
    ///
    /// Effects recalculate every sample-rate-dependent quantity (delay
    /// lengths, coefficients).
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal state without touching parameters.
    fn reset(&mut self);

    /// Processing latency in samples. Defaults to zero.
    fn latency_samples(&self) -> usize {
        0
    }
}
