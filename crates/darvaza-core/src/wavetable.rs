//! Single-cycle wavetable oscillator for tempo-synced gating.
//!
//! A [`WaveTable`] stores one oscillation cycle and a phase accumulator that
//! counts in sample-rate units: the accumulator lives in `[0, sample_rate)`
//! and advances by `frequency` every [`peek`](WaveTable::peek), so one full
//! sweep of the accumulator is one cycle of the table.
//!
//! # Phase Wrapping
//!
//! The accumulator wraps by subtraction rather than modulo. A frequency
//! change therefore never resets or truncates the residual phase, and the
//! gate speed can be modulated mid-cycle without a jump.
//!
//! # Waveforms
//!
//! | Waveform | Character | Typical gate use |
//! |----------|-----------|------------------|
//! | Sine | Smooth | Tremolo |
//! | Triangle | Linear ramps | Slow swells |
//! | Sawtooth | Hard attack, falling ramp | Rhythmic pumping |
//! | Square | Hard on/off | Chopping gate |
//!
//! Sine, triangle and sawtooth are additive (Fourier) syntheses with Lanczos
//! sigma smoothing to tame the Gibbs ringing of the truncated series,
//! normalized to a peak of 1. The sawtooth is the falling series
//! `sum(sin(n x) / n)`. The square is not band-limited: it snaps the sign of
//! the fundamental to exactly +1 or -1, so the gate fully opens and closes.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::f32::consts::PI;
use libm::{fmodf, sinf};

/// Default number of samples in one generated cycle.
pub const TABLE_SIZE: usize = 2048;

/// Number of partials summed for the non-sine waveforms.
const HARMONICS: usize = 64;

/// The four canonical gate waveforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Waveform {
    /// Pure sine.
    #[default]
    Sine,
    /// Band-limited triangle.
    Triangle,
    /// Band-limited falling sawtooth.
    Sawtooth,
    /// Hard-switched square at exactly +1 and -1.
    Square,
}

impl Waveform {
    /// All waveforms, in selector order.
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Triangle,
        Waveform::Sawtooth,
        Waveform::Square,
    ];

    /// Pick a waveform from a normalized selector value.
    ///
    /// The `[0, 1]` range is split at 0.25, 0.5 and 0.75.
    ///
    /// # Example
    ///
    /// ```rust
    /// use darvaza_core::Waveform;
    ///
    /// assert_eq!(Waveform::from_normalized(0.0), Waveform::Sine);
    /// assert_eq!(Waveform::from_normalized(0.3), Waveform::Triangle);
    /// assert_eq!(Waveform::from_normalized(0.5), Waveform::Sawtooth);
    /// assert_eq!(Waveform::from_normalized(1.0), Waveform::Square);
    /// ```
    pub fn from_normalized(value: f32) -> Self {
        if value >= 0.75 {
            Waveform::Square
        } else if value >= 0.5 {
            Waveform::Sawtooth
        } else if value >= 0.25 {
            Waveform::Triangle
        } else {
            Waveform::Sine
        }
    }

    /// Position of this waveform in [`Waveform::ALL`].
    pub fn index(self) -> usize {
        match self {
            Waveform::Sine => 0,
            Waveform::Triangle => 1,
            Waveform::Sawtooth => 2,
            Waveform::Square => 3,
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Triangle => "triangle",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Square => "square",
        }
    }

    /// Amplitude of partial `n` (1-based) in this waveform's Fourier series.
    ///
    /// The square is built from its fundamental and then snapped.
    fn partial(self, n: usize) -> f32 {
        let k = n as f32;
        match self {
            Waveform::Sine | Waveform::Square => {
                if n == 1 {
                    1.0
                } else {
                    0.0
                }
            }
            Waveform::Sawtooth => 2.0 / (PI * k),
            Waveform::Triangle => {
                if n % 2 == 1 {
                    let sign = if (n / 2) % 2 == 0 { 1.0 } else { -1.0 };
                    sign * 8.0 / (PI * PI * k * k)
                } else {
                    0.0
                }
            }
        }
    }
}

/// Single-cycle wavetable with a phase accumulator.
///
/// ## Parameters
/// - `frequency`: cycles per second; zero holds the current sample
/// - `accumulator`: phase position in `[0, sample_rate)`
///
/// # Example
///
/// ```rust
/// use darvaza_core::{WaveTable, Waveform};
///
/// let mut table = WaveTable::generate(Waveform::Sine, 1024, 48000.0);
/// table.set_frequency(2.0);
///
/// let first = table.peek();
/// assert_eq!(first, table.buffer()[0]);
/// assert_eq!(table.accumulator(), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct WaveTable {
    buffer: Vec<f32>,
    sample_rate: f32,
    frequency: f32,
    accumulator: f32,
}

impl WaveTable {
    /// Create a silent table of `length` samples.
    pub fn new(length: usize, sample_rate: f32) -> Self {
        Self::from_samples(vec![0.0; length], sample_rate)
    }

    /// Wrap an existing cycle.
    pub fn from_samples(buffer: Vec<f32>, sample_rate: f32) -> Self {
        Self {
            buffer,
            sample_rate,
            frequency: 0.0,
            accumulator: 0.0,
        }
    }

    /// Synthesize one normalized cycle of `waveform`.
    pub fn generate(waveform: Waveform, length: usize, sample_rate: f32) -> Self {
        let mut buffer = vec![0.0f32; length];
        let harmonics = match waveform {
            Waveform::Sine | Waveform::Square => 1,
            Waveform::Triangle | Waveform::Sawtooth => HARMONICS,
        };
        let sigma_span = (harmonics + 1) as f32;

        for n in 1..=harmonics {
            let amplitude = waveform.partial(n);
            if amplitude == 0.0 {
                continue;
            }
            // Lanczos sigma factor
            let sigma = if harmonics == 1 {
                1.0
            } else {
                let x = PI * n as f32 / sigma_span;
                sinf(x) / x
            };
            for (i, sample) in buffer.iter_mut().enumerate() {
                let phase = 2.0 * PI * n as f32 * i as f32 / length as f32;
                *sample += amplitude * sigma * sinf(phase);
            }
        }

        if waveform == Waveform::Square {
            for sample in &mut buffer {
                *sample = if *sample >= 0.0 { 1.0 } else { -1.0 };
            }
        }

        let peak = buffer.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        if peak > 0.0 {
            for sample in &mut buffer {
                *sample /= peak;
            }
        }

        Self::from_samples(buffer, sample_rate)
    }

    /// Return the sample at the current phase, then advance the phase.
    #[inline]
    pub fn peek(&mut self) -> f32 {
        let len = self.buffer.len();
        if len == 0 {
            return 0.0;
        }

        let read_offset = if self.accumulator == 0.0 {
            0
        } else {
            ((self.accumulator / (self.sample_rate / len as f32)) as usize).min(len - 1)
        };

        self.accumulator += self.frequency;
        self.wrap_accumulator();

        self.buffer[read_offset]
    }

    /// Set the oscillation rate in Hz without touching the phase.
    #[inline]
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    /// Current oscillation rate in Hz.
    #[inline]
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Set the phase accumulator, wrapped into `[0, sample_rate)`.
    #[inline]
    pub fn set_accumulator(&mut self, accumulator: f32) {
        self.accumulator = accumulator;
        self.wrap_accumulator();
    }

    /// Current phase accumulator.
    #[inline]
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Sample rate the accumulator counts in.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Change the sample rate, keeping the phase position within the cycle.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if self.sample_rate > 0.0 {
            self.accumulator *= sample_rate / self.sample_rate;
        }
        self.sample_rate = sample_rate;
        self.wrap_accumulator();
    }

    /// The stored cycle.
    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    /// Number of samples in the stored cycle.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True when the table holds no samples.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Replace this table's cycle with `other`'s, keeping frequency and phase.
    ///
    /// Copies in place when both cycles have the same length, so swapping
    /// the gate shape does not allocate.
    pub fn copy_cycle_from(&mut self, other: &WaveTable) {
        if self.buffer.len() == other.buffer.len() {
            self.buffer.copy_from_slice(&other.buffer);
        } else {
            self.buffer.clone_from(&other.buffer);
        }
    }

    fn wrap_accumulator(&mut self) {
        let sr = self.sample_rate;
        if sr <= 0.0 {
            self.accumulator = 0.0;
            return;
        }
        if self.accumulator >= sr {
            self.accumulator -= sr;
            // only reachable when frequency exceeds the sample rate
            if self.accumulator >= sr {
                self.accumulator = fmodf(self.accumulator, sr);
            }
        } else if self.accumulator < 0.0 {
            self.accumulator += sr;
            if self.accumulator < 0.0 {
                self.accumulator = fmodf(self.accumulator, sr) + sr;
            }
        }
    }
}
