//! The ordered parameter model.
//!
//! Twelve normalized controls plus a bypass flag. The order of [`ParamId`]
//! is part of the persisted state layout and must not change.

use std::fmt;
use std::str::FromStr;

use darvaza_engine::Processor;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Identifier of one persisted parameter, in state order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamId {
    /// Gate subdivision for channels 0, 2, ...
    OddSpeed,
    /// Gate subdivision for channels 1, 3, ...
    EvenSpeed,
    /// Link the even gates to the odd speed.
    LinkGates,
    /// Gate shape.
    Waveform,
    /// Downsample amount.
    ResampleRate,
    /// Playback slowdown.
    PlaybackRate,
    /// Reverb on/off.
    Reverb,
    /// Harmony scale (0 = off).
    Harmonize,
    /// Reverse playback on/off.
    Reverse,
    /// Bit-crush amount.
    BitDepth,
    /// Gate speed randomization.
    RandomSpeed,
    /// Dry level where the gate is closed.
    DryMix,
}

impl ParamId {
    /// Every parameter in state order.
    pub const ALL: [ParamId; 12] = [
        ParamId::OddSpeed,
        ParamId::EvenSpeed,
        ParamId::LinkGates,
        ParamId::Waveform,
        ParamId::ResampleRate,
        ParamId::PlaybackRate,
        ParamId::Reverb,
        ParamId::Harmonize,
        ParamId::Reverse,
        ParamId::BitDepth,
        ParamId::RandomSpeed,
        ParamId::DryMix,
    ];

    /// Number of persisted parameters.
    pub const COUNT: usize = Self::ALL.len();

    /// Position in the state layout.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parameter at state position `index`.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Stable snake_case id, as used in presets.
    pub fn name(self) -> &'static str {
        match self {
            ParamId::OddSpeed => "odd_speed",
            ParamId::EvenSpeed => "even_speed",
            ParamId::LinkGates => "link_gates",
            ParamId::Waveform => "waveform",
            ParamId::ResampleRate => "resample_rate",
            ParamId::PlaybackRate => "playback_rate",
            ParamId::Reverb => "reverb",
            ParamId::Harmonize => "harmonize",
            ParamId::Reverse => "reverse",
            ParamId::BitDepth => "bit_depth",
            ParamId::RandomSpeed => "random_speed",
            ParamId::DryMix => "dry_mix",
        }
    }

    /// Front panel label.
    pub fn label(self) -> &'static str {
        match self {
            ParamId::OddSpeed => "Odd channel speed",
            ParamId::EvenSpeed => "Even channel speed",
            ParamId::LinkGates => "Link gates",
            ParamId::Waveform => "Door",
            ParamId::ResampleRate => "Regret",
            ParamId::PlaybackRate => "Sorrow",
            ParamId::Reverb => "Dwell",
            ParamId::Harmonize => "Weep",
            ParamId::Reverse => "Recast",
            ParamId::BitDepth => "Torture",
            ParamId::RandomSpeed => "Randomize closing speed",
            ParamId::DryMix => "Entry",
        }
    }

    /// What the control does.
    pub fn description(self) -> &'static str {
        match self {
            ParamId::OddSpeed => "gate subdivision of channels 0, 2, ...",
            ParamId::EvenSpeed => "gate subdivision of channels 1, 3, ...",
            ParamId::LinkGates => "even gates follow the odd speed and phase",
            ParamId::Waveform => "gate shape: sine, triangle, sawtooth, square",
            ParamId::ResampleRate => "downsample toward a 2 kHz effective rate",
            ParamId::PlaybackRate => "slow playback from 100 % to 50 % speed",
            ParamId::Reverb => "frozen-on-the-beat reverb",
            ParamId::Harmonize => "pitch the channel groups down to one of six scales",
            ParamId::Reverse => "play the recording backwards",
            ParamId::BitDepth => "bit reduction from 16 to 1 bit",
            ParamId::RandomSpeed => "double the gate speeds every other half measure",
            ParamId::DryMix => "dry signal let through the closed gate",
        }
    }

    /// Value of a fresh instance.
    pub fn default_value(self) -> f32 {
        match self {
            ParamId::OddSpeed => 0.35,
            ParamId::EvenSpeed | ParamId::LinkGates => 1.0,
            _ => 0.0,
        }
    }

    /// True for on/off controls (on at `>= 0.5`).
    pub fn is_toggle(self) -> bool {
        matches!(self, ParamId::LinkGates | ParamId::Reverb | ParamId::Reverse)
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ParamId::ALL
            .into_iter()
            .find(|id| {
                id.name().eq_ignore_ascii_case(needle) || id.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ConfigError::invalid_parameter(s, "unknown parameter id"))
    }
}

/// Clamp to `[0, 1]`; NaN becomes 0.
fn normalized(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

fn toggle(value: f32) -> bool {
    value >= 0.5
}

/// A complete parameter set.
///
/// Missing fields take their defaults when deserializing, so presets only
/// need to list what they change.
///
/// # Example
///
/// ```rust
/// use darvaza_config::{ParamId, Params};
///
/// let mut params = Params::default();
/// params.set(ParamId::PlaybackRate, 1.0);
/// assert_eq!(params.get(ParamId::PlaybackRate), 1.0);
/// assert_eq!(params.get(ParamId::OddSpeed), 0.35);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// See [`ParamId::OddSpeed`].
    pub odd_speed: f32,
    /// See [`ParamId::EvenSpeed`].
    pub even_speed: f32,
    /// See [`ParamId::LinkGates`].
    pub link_gates: f32,
    /// See [`ParamId::Waveform`].
    pub waveform: f32,
    /// See [`ParamId::ResampleRate`].
    pub resample_rate: f32,
    /// See [`ParamId::PlaybackRate`].
    pub playback_rate: f32,
    /// See [`ParamId::Reverb`].
    pub reverb: f32,
    /// See [`ParamId::Harmonize`].
    pub harmonize: f32,
    /// See [`ParamId::Reverse`].
    pub reverse: f32,
    /// See [`ParamId::BitDepth`].
    pub bit_depth: f32,
    /// See [`ParamId::RandomSpeed`].
    pub random_speed: f32,
    /// See [`ParamId::DryMix`].
    pub dry_mix: f32,
    /// Copy input to output untouched.
    pub bypass: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            odd_speed: ParamId::OddSpeed.default_value(),
            even_speed: ParamId::EvenSpeed.default_value(),
            link_gates: ParamId::LinkGates.default_value(),
            waveform: ParamId::Waveform.default_value(),
            resample_rate: ParamId::ResampleRate.default_value(),
            playback_rate: ParamId::PlaybackRate.default_value(),
            reverb: ParamId::Reverb.default_value(),
            harmonize: ParamId::Harmonize.default_value(),
            reverse: ParamId::Reverse.default_value(),
            bit_depth: ParamId::BitDepth.default_value(),
            random_speed: ParamId::RandomSpeed.default_value(),
            dry_mix: ParamId::DryMix.default_value(),
            bypass: false,
        }
    }
}

impl Params {
    /// Current value of `id`.
    pub fn get(&self, id: ParamId) -> f32 {
        match id {
            ParamId::OddSpeed => self.odd_speed,
            ParamId::EvenSpeed => self.even_speed,
            ParamId::LinkGates => self.link_gates,
            ParamId::Waveform => self.waveform,
            ParamId::ResampleRate => self.resample_rate,
            ParamId::PlaybackRate => self.playback_rate,
            ParamId::Reverb => self.reverb,
            ParamId::Harmonize => self.harmonize,
            ParamId::Reverse => self.reverse,
            ParamId::BitDepth => self.bit_depth,
            ParamId::RandomSpeed => self.random_speed,
            ParamId::DryMix => self.dry_mix,
        }
    }

    /// Set `id`, clamped to `[0, 1]`.
    pub fn set(&mut self, id: ParamId, value: f32) {
        let value = normalized(value);
        let slot = match id {
            ParamId::OddSpeed => &mut self.odd_speed,
            ParamId::EvenSpeed => &mut self.even_speed,
            ParamId::LinkGates => &mut self.link_gates,
            ParamId::Waveform => &mut self.waveform,
            ParamId::ResampleRate => &mut self.resample_rate,
            ParamId::PlaybackRate => &mut self.playback_rate,
            ParamId::Reverb => &mut self.reverb,
            ParamId::Harmonize => &mut self.harmonize,
            ParamId::Reverse => &mut self.reverse,
            ParamId::BitDepth => &mut self.bit_depth,
            ParamId::RandomSpeed => &mut self.random_speed,
            ParamId::DryMix => &mut self.dry_mix,
        };
        *slot = value;
    }

    /// All values in state order.
    pub fn values(&self) -> [f32; ParamId::COUNT] {
        ParamId::ALL.map(|id| self.get(id))
    }

    /// Clamp every value into `[0, 1]`, e.g. after deserializing.
    pub fn normalize(&mut self) {
        for id in ParamId::ALL {
            self.set(id, self.get(id));
        }
    }

    /// Apply an `id=value` assignment such as `playback_rate=0.5`.
    pub fn assign(&mut self, assignment: &str) -> Result<ParamId, ConfigError> {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| ConfigError::invalid_parameter(assignment, "expected id=value"))?;
        let id: ParamId = name.parse()?;
        let value: f32 = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid_parameter(assignment, "value is not a number"))?;
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::invalid_parameter(assignment, "value must be within 0..=1"));
        }
        self.set(id, value);
        Ok(id)
    }

    /// Forward every value to `processor`.
    ///
    /// The gate shape is applied before the gate speeds.
    pub fn apply(&self, processor: &mut Processor) {
        processor.create_gate_tables(self.waveform);
        processor.set_gate_speed(self.odd_speed, self.even_speed, toggle(self.link_gates));
        processor.randomize_gate_speed(self.random_speed);
        processor.set_bit_depth(self.bit_depth);
        processor.set_resample_rate(self.resample_rate);
        processor.set_playback_rate(self.playback_rate);
        processor.enable_reverse(toggle(self.reverse));
        processor.set_harmony(self.harmonize);
        processor.enable_reverb(toggle(self.reverb));
        processor.set_dry_mix(self.dry_mix);
        processor.set_bypass(self.bypass);
    }
}
