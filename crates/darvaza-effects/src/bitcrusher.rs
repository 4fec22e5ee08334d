//! Bit crusher: bit depth reduction in the signed 16-bit domain.
//!
//! # Algorithm
//!
//! Each sample is scaled by the input mix and converted to a signed 16-bit
//! integer. The low `16 - bits` bits are masked off (truncating
//! quantization), the result is re-centred by `(-1) >> (bits + 1)` and scaled
//! back to a float through the output mix:
//!
//! ```text
//! s   = i16(x * input_mix * 32767)
//! s  &= -1 << (16 - bits)
//! out = (s + (-1 >> (bits + 1))) * output_mix / 32767
//! ```
//!
//! # Amount
//!
//! The normalized amount control is inverted: 0 keeps the full 16 bits and
//! leaves the crusher inactive, 1 crushes down to a single bit.
//!
//! ```text
//! bits = floor(|amount - 1| * 15) + 1
//! ```

use darvaza_core::{Effect, cap, scale};
use libm::{floorf, roundf};

/// Full-scale value of the 16-bit integer domain.
const SHORT_MAX: f32 = 32767.0;

/// Highest (transparent) bit depth.
const MAX_BITS: u32 = 16;

/// 16-bit integer-domain bit crusher.
///
/// ## Parameters
/// - `amount`: 0.0-1.0, crush amount (0 = off, 1 = one bit)
/// - `input_mix`: 0.0-1.0, gain into the quantizer
/// - `output_mix`: 0.0-1.0, gain after the quantizer
///
/// # Example
///
/// ```rust
/// use darvaza_effects::BitCrusher;
///
/// let mut crusher = BitCrusher::new(0.0, 1.0, 1.0);
/// assert_eq!(crusher.bits(), 16);
/// assert!(!crusher.is_active());
///
/// crusher.set_amount(1.0);
/// assert_eq!(crusher.bits(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct BitCrusher {
    amount: f32,
    bits: u32,
    input_mix: f32,
    output_mix: f32,
}

impl Default for BitCrusher {
    fn default() -> Self {
        Self::new(0.0, 1.0, 1.0)
    }
}

impl BitCrusher {
    /// Create a crusher from a normalized amount and the two mix gains.
    pub fn new(amount: f32, input_mix: f32, output_mix: f32) -> Self {
        let mut crusher = Self {
            amount: 0.0,
            bits: MAX_BITS,
            input_mix: 1.0,
            output_mix: 1.0,
        };
        crusher.set_amount(amount);
        crusher.set_input_mix(input_mix);
        crusher.set_output_mix(output_mix);
        crusher
    }

    /// Bit depth selected by a normalized amount, in `[1, 16]`.
    ///
    /// Non-increasing in `amount`.
    pub fn bits_for_amount(amount: f32) -> u32 {
        let inverted = (cap(amount, 1.0) - 1.0).abs();
        floorf(scale(inverted, 1.0, 15.0)) as u32 + 1
    }

    /// Set the normalized crush amount.
    pub fn set_amount(&mut self, amount: f32) {
        self.amount = cap(amount, 1.0);
        self.bits = Self::bits_for_amount(self.amount);
    }

    /// Current normalized amount.
    pub fn amount(&self) -> f32 {
        self.amount
    }

    /// Current bit depth.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Set the gain into the quantizer, clamped to `[0, 1]`.
    pub fn set_input_mix(&mut self, mix: f32) {
        self.input_mix = cap(mix, 1.0);
    }

    /// Gain into the quantizer.
    pub fn input_mix(&self) -> f32 {
        self.input_mix
    }

    /// Set the gain after the quantizer, clamped to `[0, 1]`.
    pub fn set_output_mix(&mut self, mix: f32) {
        self.output_mix = cap(mix, 1.0);
    }

    /// Gain after the quantizer.
    pub fn output_mix(&self) -> f32 {
        self.output_mix
    }

    /// True when the amount reduces the bit depth below 16.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.bits < MAX_BITS
    }

    /// Quantize one sample to `bits` with the given mix gains.
    #[inline]
    pub fn crush(sample: f32, bits: u32, input_mix: f32, output_mix: f32) -> f32 {
        let bits = bits.clamp(1, MAX_BITS);
        // float-to-int casts saturate, so overs clip at the rails
        let short = roundf(sample * input_mix * SHORT_MAX) as i16;
        let prevent_offset: i32 = -1 >> (bits + 1);
        let masked = i32::from(short) & (-1i32 << (MAX_BITS - bits));
        (masked + prevent_offset) as f32 * output_mix / SHORT_MAX
    }
}

impl Effect for BitCrusher {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        if !self.is_active() {
            return input;
        }
        Self::crush(input, self.bits, self.input_mix, self.output_mix)
    }

    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        if !self.is_active() {
            return;
        }
        for sample in buffer.iter_mut() {
            *sample = Self::crush(*sample, self.bits, self.input_mix, self.output_mix);
        }
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}
