//! Darvaza Engine - the per-block processing orchestrator
//!
//! [`Processor`] owns the whole signal chain and runs it once per host block:
//!
//! ```text
//! input ─┬─> record ring ──> PlaybackEngine (downsample / slow / harmonize / reverse)
//!        │                          │
//!        └─> pre-mix ───────────────┴─> BitCrusher ─> Reverb? ─> × gate ─┐
//!        └─> dry copy ───────────────────────────── × (1 - gate) × dry ─┴─> Limiter ─> output
//! ```
//!
//! - [`PlaybackEngine`] / [`ChannelPlayback`] - fractional read pointers into
//!   the record ring, anti-alias filtering, smoothing and dither
//! - [`GateEngine`] - tempo-synced wavetable gates, odd/even channel groups
//! - [`HarmonyScale`] - the two-voice interval sets used when harmonizing
//! - [`TransportInfo`] - host play state and tempo, applied with
//!   [`Processor::sync_transport`]
//!
//! # Example
//!
//! ```rust
//! use darvaza_engine::{Processor, ProcessorConfig, TransportInfo};
//!
//! let mut processor = Processor::new(ProcessorConfig::new(44100.0, 2));
//! processor.sync_transport(&TransportInfo::playing(120.0, 4, 4));
//! processor.set_playback_rate(1.0); // half speed
//!
//! let left = vec![0.25f32; 512];
//! let right = vec![-0.25f32; 512];
//! let mut out_l = vec![0.0f32; 512];
//! let mut out_r = vec![0.0f32; 512];
//! processor.process(
//!     &[left.as_slice(), right.as_slice()],
//!     &mut [out_l.as_mut_slice(), out_r.as_mut_slice()],
//!     512,
//! );
//! assert!(out_l.iter().all(|s| s.abs() <= 0.6 + 1e-6));
//! ```
//!
//! # Real-time behaviour
//!
//! Buffers only grow. Once a block size and channel count have been seen,
//! processing more blocks of that shape allocates nothing.

pub mod config;
pub mod gate;
pub mod harmony;
pub mod playback;
pub mod processor;
pub mod transport;

pub use darvaza_core::{MeasureClock, Sample, Waveform};

pub use config::{
    Interpolation, MAX_RECORD_SECONDS, MIN_PLAYBACK_SPEED, MIN_SAMPLE_RATE, ProcessorConfig,
};
pub use gate::{GateEngine, GateGroup};
pub use harmony::HarmonyScale;
pub use playback::{ChannelPlayback, Dither, PlaybackEngine};
pub use processor::Processor;
pub use transport::TransportInfo;
