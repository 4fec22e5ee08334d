//! Factory presets bundled with darvaza.
//!
//! Built-in presets that are always available without external files.

use crate::Preset;

/// Factory preset ids.
pub static FACTORY_PRESET_NAMES: &[&str] = &[
    "init",
    "slow_motion",
    "choir",
    "torture_chamber",
    "frozen_hall",
    "recast",
    "restless",
];

/// TOML content for factory presets, embedded at compile time.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("init", INIT_PRESET),
    ("slow_motion", SLOW_MOTION_PRESET),
    ("choir", CHOIR_PRESET),
    ("torture_chamber", TORTURE_CHAMBER_PRESET),
    ("frozen_hall", FROZEN_HALL_PRESET),
    ("recast", RECAST_PRESET),
    ("restless", RESTLESS_PRESET),
];

/// Default parameters.
const INIT_PRESET: &str = r#"
name = "Init"
description = "Default state: linked gates, no playback effects"

[params]
"#;

/// Half speed playback under a measure-long gate.
const SLOW_MOTION_PRESET: &str = r#"
name = "Slow Motion"
description = "Half speed playback under a slow, linked sine gate"

[params]
odd_speed = 0.18
link_gates = 1.0
playback_rate = 1.0
dry_mix = 0.3
"#;

/// Harmonized playback with a little reverb.
const CHOIR_PRESET: &str = r#"
name = "Choir"
description = "Minor harmony voices, triangle gates, reverb frozen on the beat"

[params]
odd_speed = 0.45
even_speed = 0.55
link_gates = 0.0
waveform = 0.3
harmonize = 0.8
reverb = 1.0
dry_mix = 0.2
"#;

/// Heavy downsampling and bit reduction.
const TORTURE_CHAMBER_PRESET: &str = r#"
name = "Torture Chamber"
description = "Square gates over downsampled, 3-bit audio"

[params]
odd_speed = 0.64
waveform = 1.0
resample_rate = 0.6
bit_depth = 0.85
"#;

/// Reverb-forward preset.
const FROZEN_HALL_PRESET: &str = r#"
name = "Frozen Hall"
description = "Slowed playback into a reverb that freezes every other beat"

[params]
odd_speed = 0.27
playback_rate = 0.6
reverb = 1.0
dry_mix = 0.5
"#;

/// Reverse playback.
const RECAST_PRESET: &str = r#"
name = "Recast"
description = "Reverse playback through sawtooth gates"

[params]
odd_speed = 0.45
waveform = 0.6
reverse = 1.0
dry_mix = 0.25
"#;

/// Randomized gate speeds.
const RESTLESS_PRESET: &str = r#"
name = "Restless"
description = "Unlinked gates doubling their speed every other half measure"

[params]
odd_speed = 0.45
even_speed = 0.55
link_gates = 0.0
random_speed = 0.5
dry_mix = 0.4
"#;

/// Get all factory presets.
///
/// # Example
///
/// ```rust
/// use darvaza_config::factory_presets;
///
/// for preset in factory_presets() {
///     println!("{}: {}", preset.name, preset.description.as_deref().unwrap_or(""));
/// }
/// ```
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| Preset::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by id or display name, case-insensitively.
pub fn get_factory_preset(name: &str) -> Option<Preset> {
    let name_lower = name.to_lowercase();

    if let Some((_, toml)) = FACTORY_PRESETS_TOML
        .iter()
        .find(|(id, _)| id.to_lowercase() == name_lower)
    {
        return Preset::from_toml(toml).ok();
    }

    factory_presets()
        .into_iter()
        .find(|preset| preset.name.to_lowercase() == name_lower)
}

/// Factory preset ids.
pub fn factory_preset_names() -> &'static [&'static str] {
    FACTORY_PRESET_NAMES
}

/// True when `name` matches a factory preset.
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}
