//! Tempo, time signature and measure clock for tempo-synced processing.
//!
//! [`MeasureClock`] turns host tempo and time signature into the sample
//! counts the engine schedules against (full measure, half measure, beat,
//! sixteenth) and keeps a running position inside the current measure.
//!
//! Gate speeds are expressed as subdivisions of one measure; see
//! [`gate_subdivision`].

use crate::math::cap;
use libm::{ceil, round, roundf};

/// Cycles per measure selectable from the gate speed controls.
///
/// 0.25 is one cycle every four measures, 1 one per measure, 4 one per
/// quarter note in 4/4, 32 one per thirty-second note.
pub const GATE_SUBDIVISIONS: [f32; 12] = [
    0.25, 0.5, 1.0, 2.0, 3.0, 4.0, 6.0, 8.0, 12.0, 16.0, 24.0, 32.0,
];

/// Index into [`GATE_SUBDIVISIONS`] selected by a normalized control.
///
/// # Example
///
/// ```rust
/// use darvaza_core::gate_subdivision_index;
///
/// assert_eq!(gate_subdivision_index(0.0), 0);
/// assert_eq!(gate_subdivision_index(2.0 / 11.0), 2);
/// assert_eq!(gate_subdivision_index(1.0), 11);
/// ```
#[inline]
pub fn gate_subdivision_index(value: f32) -> usize {
    let steps = (GATE_SUBDIVISIONS.len() - 1) as f32;
    roundf(cap(value, 1.0) * steps) as usize
}

/// Cycles per measure selected by a normalized control.
#[inline]
pub fn gate_subdivision(value: f32) -> f32 {
    GATE_SUBDIVISIONS[gate_subdivision_index(value)]
}

const DEFAULT_TEMPO: f32 = 120.0;
const DEFAULT_NUMERATOR: u32 = 4;
const DEFAULT_DENOMINATOR: u32 = 4;

/// Host tempo state and the measure position derived from it.
///
/// ## Derived counts
///
/// - full measure: `round(duration * sample_rate)`
/// - half measure: `ceil(full / 2)`
/// - beat: `ceil(full / numerator)`
/// - sixteenth: `ceil(full / 16)`
///
/// where `duration = 60 / tempo * numerator * 4 / denominator` seconds.
///
/// # Example
///
/// ```rust
/// use darvaza_core::MeasureClock;
///
/// let mut clock = MeasureClock::new(44100.0);
/// assert_eq!(clock.full_measure_samples(), 88200);
/// assert_eq!(clock.beat_samples(), 22050);
///
/// assert!(clock.set_tempo(90.0, 3, 4));
/// assert!(!clock.set_tempo(90.0, 3, 4));
/// assert_eq!(clock.full_measure_samples(), 88200);
/// assert_eq!(clock.beat_samples(), 29400);
/// ```
#[derive(Debug, Clone)]
pub struct MeasureClock {
    sample_rate: f32,
    tempo: f32,
    numerator: u32,
    denominator: u32,
    full_measure_duration: f32,
    full_measure_samples: usize,
    half_measure_samples: usize,
    beat_samples: usize,
    sixteenth_samples: usize,
    written_measure_samples: usize,
}

impl MeasureClock {
    /// Create a clock at 120 BPM in 4/4.
    pub fn new(sample_rate: f32) -> Self {
        let mut clock = Self {
            sample_rate,
            tempo: DEFAULT_TEMPO,
            numerator: DEFAULT_NUMERATOR,
            denominator: DEFAULT_DENOMINATOR,
            full_measure_duration: 0.0,
            full_measure_samples: 0,
            half_measure_samples: 0,
            beat_samples: 0,
            sixteenth_samples: 0,
            written_measure_samples: 0,
        };
        clock.recalculate();
        clock
    }

    /// Apply host tempo and time signature.
    ///
    /// Returns `true` when the timing state changed, so the caller knows to
    /// re-derive tempo-dependent rates. Non-finite or non-positive tempos and
    /// zero signature parts are ignored and return `false`.
    pub fn set_tempo(&mut self, tempo: f32, numerator: u32, denominator: u32) -> bool {
        if !tempo.is_finite() || tempo <= 0.0 || numerator == 0 || denominator == 0 {
            return false;
        }
        if tempo == self.tempo && numerator == self.numerator && denominator == self.denominator
        {
            return false;
        }
        self.tempo = tempo;
        self.numerator = numerator;
        self.denominator = denominator;
        self.recalculate();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "tempo: {tempo} bpm {numerator}/{denominator}, measure {} samples",
            self.full_measure_samples
        );
        true
    }

    /// Change the sample rate and re-derive every sample count.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate();
    }

    /// Tempo in beats per minute.
    pub fn tempo(&self) -> f32 {
        self.tempo
    }

    /// Time signature as `(numerator, denominator)`.
    pub fn time_signature(&self) -> (u32, u32) {
        (self.numerator, self.denominator)
    }

    /// Length of one measure in seconds.
    pub fn full_measure_duration(&self) -> f32 {
        self.full_measure_duration
    }

    /// Samples in one measure.
    pub fn full_measure_samples(&self) -> usize {
        self.full_measure_samples
    }

    /// Samples in half a measure.
    pub fn half_measure_samples(&self) -> usize {
        self.half_measure_samples
    }

    /// Samples in one beat.
    pub fn beat_samples(&self) -> usize {
        self.beat_samples
    }

    /// Samples in one sixteenth of a measure.
    pub fn sixteenth_samples(&self) -> usize {
        self.sixteenth_samples
    }

    /// Samples written since the start of the current measure.
    pub fn position(&self) -> usize {
        self.written_measure_samples
    }

    /// Return the current measure position, then advance it by one sample,
    /// wrapping at the measure boundary.
    #[inline]
    pub fn advance(&mut self) -> usize {
        let position = self.written_measure_samples;
        self.written_measure_samples += 1;
        if self.written_measure_samples >= self.full_measure_samples {
            self.written_measure_samples = 0;
        }
        position
    }

    /// True when `position` falls on a beat boundary.
    #[inline]
    pub fn is_beat_boundary(&self, position: usize) -> bool {
        self.beat_samples > 0 && position % self.beat_samples == 0
    }

    /// Rewind to the start of a measure.
    pub fn reset(&mut self) {
        self.written_measure_samples = 0;
    }

    /// Oscillator frequency for `subdivision` cycles per measure.
    ///
    /// `1 / (measure_duration / subdivision)`
    pub fn subdivision_frequency(&self, subdivision: f32) -> f32 {
        if self.full_measure_duration <= 0.0 {
            return 0.0;
        }
        1.0 / (self.full_measure_duration / subdivision)
    }

    fn recalculate(&mut self) {
        let beats = f64::from(self.numerator) * 4.0 / f64::from(self.denominator);
        let duration = 60.0 / f64::from(self.tempo) * beats;
        let full = round(duration * f64::from(self.sample_rate)).max(1.0);

        self.full_measure_duration = duration as f32;
        self.full_measure_samples = full as usize;
        self.half_measure_samples = ceil(full / 2.0) as usize;
        self.beat_samples = ceil(full / f64::from(self.numerator)) as usize;
        self.sixteenth_samples = ceil(full / 16.0) as usize;

        if self.written_measure_samples >= self.full_measure_samples {
            self.written_measure_samples %= self.full_measure_samples;
        }
    }
}
