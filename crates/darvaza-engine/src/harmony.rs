//! Two-voice harmony scales for pitch-shifted playback.
//!
//! When harmonizing, the two channel groups used by the gates each read the
//! record ring at a fixed pitch below the input: channels at even indices
//! (0, 2, ...) form the *odd* group, channels at odd indices (1, 3, ...) the
//! *even* group. The pair of intervals gives the chord its colour.

use darvaza_core::{cap, pitch_ratio};
use libm::roundf;

/// A pair of downward intervals, one per channel group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarmonyScale {
    /// -1 / -8 semitones.
    Major,
    /// -2 / -8 semitones.
    Mixolydian,
    /// -4 / -8 semitones.
    Augmented,
    /// -5 / -10 semitones.
    Neutral,
    /// -2 / -9 semitones.
    Minor,
    /// -6 / -9 semitones.
    Diminished,
}

impl HarmonyScale {
    /// Every scale, in control order.
    pub const ALL: [HarmonyScale; 6] = [
        HarmonyScale::Major,
        HarmonyScale::Mixolydian,
        HarmonyScale::Augmented,
        HarmonyScale::Neutral,
        HarmonyScale::Minor,
        HarmonyScale::Diminished,
    ];

    /// Scale selected by a normalized control; 0 switches harmonizing off.
    ///
    /// # Example
    ///
    /// ```rust
    /// use darvaza_engine::HarmonyScale;
    ///
    /// assert_eq!(HarmonyScale::from_normalized(0.0), None);
    /// assert_eq!(HarmonyScale::from_normalized(0.05), Some(HarmonyScale::Major));
    /// assert_eq!(HarmonyScale::from_normalized(1.0), Some(HarmonyScale::Diminished));
    /// ```
    pub fn from_normalized(value: f32) -> Option<Self> {
        let value = cap(value, 1.0);
        if value <= 0.0 {
            return None;
        }
        let index = roundf(value * (Self::ALL.len() - 1) as f32) as usize;
        Some(Self::ALL[index])
    }

    /// Semitone offsets as `(odd group, even group)`.
    pub fn semitones(self) -> (i32, i32) {
        match self {
            HarmonyScale::Major => (-1, -8),
            HarmonyScale::Mixolydian => (-2, -8),
            HarmonyScale::Augmented => (-4, -8),
            HarmonyScale::Neutral => (-5, -10),
            HarmonyScale::Minor => (-2, -9),
            HarmonyScale::Diminished => (-6, -9),
        }
    }

    /// Playback ratios as `(odd group, even group)`.
    pub fn ratios(self) -> (f32, f32) {
        let (odd, even) = self.semitones();
        (pitch_ratio(odd as f32), pitch_ratio(even as f32))
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            HarmonyScale::Major => "major",
            HarmonyScale::Mixolydian => "mixolydian",
            HarmonyScale::Augmented => "augmented",
            HarmonyScale::Neutral => "neutral",
            HarmonyScale::Minor => "minor",
            HarmonyScale::Diminished => "diminished",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_steps() {
        assert_eq!(HarmonyScale::from_normalized(0.2), Some(HarmonyScale::Mixolydian));
        assert_eq!(HarmonyScale::from_normalized(0.4), Some(HarmonyScale::Augmented));
        assert_eq!(HarmonyScale::from_normalized(0.6), Some(HarmonyScale::Neutral));
        assert_eq!(HarmonyScale::from_normalized(0.8), Some(HarmonyScale::Minor));
        assert_eq!(HarmonyScale::from_normalized(-1.0), None);
    }

    #[test]
    fn test_ratios_pitch_down() {
        for scale in HarmonyScale::ALL {
            let (odd, even) = scale.ratios();
            assert!(odd < 1.0 && even < 1.0, "{} must pitch down", scale.name());
            assert!(even < odd, "{} even voice sits lower", scale.name());
        }
    }

    #[test]
    fn test_major_ratios() {
        let (odd, even) = HarmonyScale::Major.ratios();
        assert!((odd - 0.943_874_3).abs() < 1e-5);
        assert!((even - 0.629_960_5).abs() < 1e-5);
    }
}
