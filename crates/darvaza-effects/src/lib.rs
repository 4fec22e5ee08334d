//! Darvaza Effects - the processing stages of the Darvaza signal chain
//!
//! Built on darvaza-core:
//!
//! - [`BitCrusher`] - 16-bit integer-domain bit depth reduction
//! - [`Reverb`] - Freeverb-style comb/allpass network with a freeze mode
//! - [`Limiter`] - Linked multichannel lookahead peak limiter
//!
//! ## Example
//!
//! ```rust
//! use darvaza_core::Effect;
//! use darvaza_effects::{BitCrusher, Reverb};
//!
//! let mut crusher = BitCrusher::new(0.75, 1.0, 1.0);
//! let mut reverb = Reverb::new(44100.0);
//! reverb.set_room_size(1.0);
//!
//! let wet = reverb.process(crusher.process(0.5));
//! assert!(wet.is_finite());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod bitcrusher;
pub mod limiter;
pub mod reverb;

pub use bitcrusher::BitCrusher;
pub use limiter::Limiter;
pub use reverb::{Reverb, ReverbCoefficients};
