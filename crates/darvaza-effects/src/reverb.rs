//! Freezable Freeverb-style reverb.
//!
//! Eight damped feedback combs run in parallel and their sum is diffused by
//! four series allpasses. Every parameter setter funnels into one `update()`
//! that recomputes the derived coefficients together, so the network never
//! sees a half-applied parameter change.
//!
//! # Freeze
//!
//! In freeze mode the combs run with unity feedback and no damping, and the
//! input gain drops to zero: the tail keeps circulating without loss and
//! nothing new enters it. [`Reverb::toggle_freeze`] flips between the two
//! modes; the engine calls it on beat boundaries. [`Reverb::mute`] clears the
//! delay lines unless the tail is frozen.
//!
//! # Parameters
//!
//! | Parameter | Range | Mapping | Default |
//! |-----------|-------|---------|---------|
//! | Room size | 0-1 | `v * 0.28 + 0.7` | 0.5 |
//! | Damp | 0-1 | `v * 0.4` | 0.5 |
//! | Wet | 0-1 | `v` | 1.0 |
//! | Dry | 0-1 | `v` | 0.5 |
//! | Width | 0-1 | `v` | 1.0 |
//! | Mode | 0-1 | `>= 0.5` freezes | 0.0 |

use darvaza_core::{AllpassFilter, CombFilter, Effect};

/// Freeverb comb filter delay times (at 44.1kHz reference).
const COMB_TUNINGS_44K: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];

/// Freeverb allpass filter delay times (at 44.1kHz reference).
const ALLPASS_TUNINGS_44K: [usize; 4] = [556, 441, 341, 225];

/// Reference sample rate for tuning constants.
const REFERENCE_RATE: f32 = 44100.0;

/// Added to every delay length.
const STEREO_SPREAD: usize = 23;

const MUTED: f32 = 0.0;
const FIXED_GAIN: f32 = 0.015;
const SCALE_WET: f32 = 1.0;
const SCALE_DRY: f32 = 1.0;
const SCALE_DAMP: f32 = 0.4;
const SCALE_ROOM: f32 = 0.28;
const OFFSET_ROOM: f32 = 0.7;
const INITIAL_ROOM: f32 = 0.5;
const INITIAL_DAMP: f32 = 0.5;
const INITIAL_WET: f32 = 1.0;
const INITIAL_DRY: f32 = 0.5;
const INITIAL_WIDTH: f32 = 1.0;
const INITIAL_MODE: f32 = 0.0;
const FREEZE_MODE: f32 = 0.5;

/// Scale a delay time from the reference rate to `sample_rate`.
fn scale_to_rate(samples: usize, sample_rate: f32) -> usize {
    (samples as f32 * sample_rate / REFERENCE_RATE) as usize + STEREO_SPREAD
}

/// Coefficients derived from the user parameters by `update()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbCoefficients {
    /// Wet gain for the primary output.
    pub wet1: f32,
    /// Wet cross-feed gain for a paired channel.
    pub wet2: f32,
    /// Comb feedback actually applied.
    pub room_size1: f32,
    /// Comb damping actually applied.
    pub damp1: f32,
    /// Input gain into the network.
    pub gain: f32,
}

/// Freeverb-style reverb with a freeze mode.
///
/// # Example
///
/// ```rust
/// use darvaza_core::Effect;
/// use darvaza_effects::Reverb;
///
/// let mut reverb = Reverb::new(44100.0);
/// reverb.set_room_size(1.0);
/// reverb.process(1.0);
///
/// reverb.toggle_freeze();
/// assert!(reverb.is_frozen());
/// assert_eq!(reverb.coefficients().gain, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Reverb {
    combs: [CombFilter; 8],
    allpasses: [AllpassFilter; 4],

    gain: f32,
    room_size: f32,
    room_size1: f32,
    damp: f32,
    damp1: f32,
    wet: f32,
    wet1: f32,
    wet2: f32,
    dry: f32,
    width: f32,
    mode: f32,

    sample_rate: f32,
}

impl Reverb {
    /// Create a reverb at the given sample rate with the Freeverb defaults.
    pub fn new(sample_rate: f32) -> Self {
        let (combs, allpasses) = Self::build_network(sample_rate);
        let mut reverb = Self {
            combs,
            allpasses,
            gain: FIXED_GAIN,
            room_size: 0.0,
            room_size1: 0.0,
            damp: 0.0,
            damp1: 0.0,
            wet: 0.0,
            wet1: 0.0,
            wet2: 0.0,
            dry: 0.0,
            width: 0.0,
            mode: INITIAL_MODE,
            sample_rate,
        };

        reverb.set_wet(INITIAL_WET);
        reverb.set_room_size(INITIAL_ROOM);
        reverb.set_dry(INITIAL_DRY);
        reverb.set_damp(INITIAL_DAMP);
        reverb.set_width(INITIAL_WIDTH);
        reverb.set_mode(INITIAL_MODE);
        reverb.mute();
        reverb
    }

    fn build_network(sample_rate: f32) -> ([CombFilter; 8], [AllpassFilter; 4]) {
        let combs = core::array::from_fn(|i| {
            CombFilter::new(scale_to_rate(COMB_TUNINGS_44K[i], sample_rate))
        });
        let allpasses = core::array::from_fn(|i| {
            let mut allpass = AllpassFilter::new(scale_to_rate(ALLPASS_TUNINGS_44K[i], sample_rate));
            allpass.set_feedback(0.5);
            allpass
        });
        (combs, allpasses)
    }

    /// Run one sample through the network.
    ///
    /// The dry path taps the gain-scaled input, so a frozen reverb (input
    /// gain zero) outputs the tail alone.
    #[inline]
    pub fn process_single(&mut self, input: f32) -> f32 {
        let input = input * self.gain;

        let mut out = 0.0;
        for comb in &mut self.combs {
            out += comb.process(input);
        }
        for allpass in &mut self.allpasses {
            out = allpass.process(out);
        }

        out * self.wet1 + input * self.dry
    }

    /// Clear every delay line, unless frozen.
    pub fn mute(&mut self) {
        if self.is_frozen() {
            return;
        }
        self.clear_network();
    }

    /// Flip between normal and freeze mode.
    pub fn toggle_freeze(&mut self) {
        let next = if self.is_frozen() { MUTED } else { FREEZE_MODE };
        self.set_mode(next);
    }

    /// True while the tail is frozen.
    pub fn is_frozen(&self) -> bool {
        self.mode >= FREEZE_MODE
    }

    /// Set the room size (0-1).
    pub fn set_room_size(&mut self, value: f32) {
        self.room_size = value * SCALE_ROOM + OFFSET_ROOM;
        self.update();
    }

    /// Room size control value.
    pub fn room_size(&self) -> f32 {
        (self.room_size - OFFSET_ROOM) / SCALE_ROOM
    }

    /// Set high-frequency damping (0-1).
    pub fn set_damp(&mut self, value: f32) {
        self.damp = value * SCALE_DAMP;
        self.update();
    }

    /// Damping control value.
    pub fn damp(&self) -> f32 {
        self.damp / SCALE_DAMP
    }

    /// Set the wet level (0-1).
    pub fn set_wet(&mut self, value: f32) {
        self.wet = value * SCALE_WET;
        self.update();
    }

    /// Wet control value.
    pub fn wet(&self) -> f32 {
        self.wet / SCALE_WET
    }

    /// Set the dry level (0-1). The dry gain is used directly, no update needed.
    pub fn set_dry(&mut self, value: f32) {
        self.dry = value * SCALE_DRY;
    }

    /// Dry control value.
    pub fn dry(&self) -> f32 {
        self.dry / SCALE_DRY
    }

    /// Set the stereo width (0-1).
    pub fn set_width(&mut self, value: f32) {
        self.width = value;
        self.update();
    }

    /// Width control value.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Set the mode; values at or above 0.5 freeze the tail.
    pub fn set_mode(&mut self, value: f32) {
        self.mode = value;
        self.update();
    }

    /// 1.0 when frozen, 0.0 otherwise.
    pub fn mode(&self) -> f32 {
        if self.is_frozen() { 1.0 } else { 0.0 }
    }

    /// Currently applied derived coefficients.
    pub fn coefficients(&self) -> ReverbCoefficients {
        ReverbCoefficients {
            wet1: self.wet1,
            wet2: self.wet2,
            room_size1: self.room_size1,
            damp1: self.damp1,
            gain: self.gain,
        }
    }

    /// Sum of squares held in the comb delay lines.
    pub fn tail_energy(&self) -> f32 {
        self.combs.iter().map(CombFilter::energy).sum()
    }

    /// Recompute every derived coefficient from the current parameters.
    pub fn update(&mut self) {
        self.wet1 = self.wet * (self.width / 2.0 + 0.5);
        self.wet2 = self.wet * ((1.0 - self.width) / 2.0);

        if self.is_frozen() {
            self.room_size1 = 1.0;
            self.damp1 = 0.0;
            self.gain = MUTED;
        } else {
            self.room_size1 = self.room_size;
            self.damp1 = self.damp;
            self.gain = FIXED_GAIN;
        }

        for comb in &mut self.combs {
            comb.set_feedback(self.room_size1);
            comb.set_damp(self.damp1);
        }
    }

    fn clear_network(&mut self) {
        for comb in &mut self.combs {
            comb.clear();
        }
        for allpass in &mut self.allpasses {
            allpass.clear();
        }
    }
}

impl Effect for Reverb {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.process_single(input)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        if sample_rate == self.sample_rate {
            return;
        }
        self.sample_rate = sample_rate;
        let (combs, allpasses) = Self::build_network(sample_rate);
        self.combs = combs;
        self.allpasses = allpasses;
        self.update();
    }

    fn reset(&mut self) {
        self.clear_network();
    }
}
