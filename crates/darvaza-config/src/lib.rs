//! Configuration for the darvaza engine.
//!
//! - [`ParamId`] / [`Params`]: the twelve normalized controls and bypass,
//!   in their fixed persisted order, and [`Params::apply`] to push them into
//!   a [`Processor`](darvaza_engine::Processor)
//! - binary state: [`Params::to_state_bytes`] / [`Params::from_state_bytes`]
//! - [`Preset`]: named parameter sets as TOML, plus [`factory_presets`]
//! - [`EngineSettings`]: sample rate, record length, limiter and
//!   interpolation as TOML, converted to a
//!   [`ProcessorConfig`](darvaza_engine::ProcessorConfig)
//!
//! # Example
//!
//! ```rust
//! use darvaza_config::{EngineSettings, get_factory_preset};
//! use darvaza_engine::Processor;
//!
//! let settings = EngineSettings::default();
//! let mut processor = Processor::new(settings.to_processor_config());
//!
//! let preset = get_factory_preset("slow_motion").unwrap_or_default();
//! preset.params.apply(&mut processor);
//! assert!(processor.playback().is_slowed_down());
//! ```

mod error;
mod params;
mod preset;
mod settings;
mod state;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset,
};
pub use params::{ParamId, Params};
pub use preset::Preset;
pub use settings::{CrusherSettings, EngineSettings, InterpolationSettings, LimiterSettings};
pub use state::STATE_LEN;
