//! Darvaza Core - DSP primitives for the Darvaza signal chain
//!
//! This crate provides the building blocks the Darvaza engine is assembled
//! from, designed for real-time audio processing with zero allocation in the
//! audio path.
//!
//! # Core Abstractions
//!
//! ## Effect System
//!
//! - [`Effect`] - Object-safe trait for mono audio effects
//! - [`Sample`] - Host sample width (`f32` or `f64`), converted at the boundary
//!
//! ## Oscillators
//!
//! - [`WaveTable`] - Single-cycle wavetable with a phase accumulator
//! - [`Waveform`] - The four canonical gate shapes
//! - [`TablePool`] - Owned registry of canonical tables, cloned per channel
//!
//! ## Filters
//!
//! - [`CombFilter`] - Damped feedback comb for Freeverb-style networks
//! - [`AllpassFilter`] - Schroeder allpass for diffusion
//! - [`LowPassFilter`] - One-pole lowpass steered by a decimation ratio
//!
//! ## Buffers & Timing
//!
//! - [`AudioBuffer`] - Channel-major multichannel sample storage
//! - [`MeasureClock`] - Tempo, time signature and measure sample counters
//! - [`gate_subdivision`] - Normalized control to musical subdivision
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! darvaza-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use darvaza_core::{TablePool, Waveform};
//!
//! let pool = TablePool::with_canonical_tables(44100.0);
//! let mut gate = pool.get_table(Waveform::Sine).unwrap().clone();
//! gate.set_frequency(0.5);
//!
//! let level = gate.peek() * 0.5 + 0.5;
//! assert!((0.0..=1.0).contains(&level));
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: No allocations in audio processing paths
//! - **No dependencies on std**: Pure `no_std` with `libm` for math
//! - **Single internal precision**: Everything runs in `f32`; `f64` hosts
//!   convert at the boundary through [`Sample`]

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allpass;
pub mod audio_buffer;
pub mod comb;
pub mod effect;
pub mod lowpass;
pub mod math;
pub mod sample;
pub mod table_pool;
pub mod tempo;
pub mod wavetable;

// Re-export main types at crate root
pub use allpass::AllpassFilter;
pub use audio_buffer::AudioBuffer;
pub use comb::CombFilter;
pub use effect::Effect;
pub use lowpass::LowPassFilter;
pub use math::{cap, flush_denormal, pitch_ratio, scale, seconds_to_samples};
pub use sample::Sample;
pub use table_pool::TablePool;
pub use tempo::{
    GATE_SUBDIVISIONS, MeasureClock, gate_subdivision, gate_subdivision_index,
};
pub use wavetable::{TABLE_SIZE, WaveTable, Waveform};
