//! Property-based tests for darvaza-effects.
//!
//! Bit depth mapping, reverb coefficient consistency and freeze behaviour,
//! and the limiter ceiling under random input.

use darvaza_core::AudioBuffer;
use darvaza_effects::{BitCrusher, Limiter, Reverb};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Bit depth is within [1, 16] and never increases with the amount.
    #[test]
    fn bit_depth_monotonic(a in 0.0f32..=1.0f32, b in 0.0f32..=1.0f32) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let bits_lo = BitCrusher::bits_for_amount(lo);
        let bits_hi = BitCrusher::bits_for_amount(hi);
        prop_assert!((1..=16).contains(&bits_lo));
        prop_assert!((1..=16).contains(&bits_hi));
        prop_assert!(bits_hi <= bits_lo);
    }

    /// At full depth and unity mixes, 16-bit representable input comes back
    /// within one LSB.
    #[test]
    fn full_depth_is_near_identity(k in -32767i32..=32767) {
        let x = k as f32 / 32767.0;
        let y = BitCrusher::crush(x, 16, 1.0, 1.0);
        prop_assert!((y - x).abs() <= 1.001 / 32767.0);
    }

    /// Crushed output stays inside full scale (plus the one-LSB offset).
    #[test]
    fn crushed_output_bounded(x in -1.0f32..=1.0f32, amount in 0.0f32..=1.0f32) {
        let bits = BitCrusher::bits_for_amount(amount);
        let y = BitCrusher::crush(x, bits, 1.0, 1.0);
        prop_assert!(y.abs() <= 1.0 + 2.0 / 32767.0);
    }

    /// update() twice with unchanged parameters yields identical coefficients.
    #[test]
    fn reverb_update_idempotent(
        room in 0.0f32..=1.0f32,
        damp in 0.0f32..=1.0f32,
        wet in 0.0f32..=1.0f32,
        width in 0.0f32..=1.0f32,
        frozen in any::<bool>(),
    ) {
        let mut reverb = Reverb::new(44100.0);
        reverb.set_room_size(room);
        reverb.set_damp(damp);
        reverb.set_wet(wet);
        reverb.set_width(width);
        if frozen {
            reverb.toggle_freeze();
        }
        reverb.update();
        let first = reverb.coefficients();
        reverb.update();
        prop_assert_eq!(first, reverb.coefficients());
    }

    /// Once frozen, no input changes the tail and its energy holds.
    #[test]
    fn frozen_tail_holds(input in prop::array::uniform32(-1.0f32..=1.0f32)) {
        let mut reverb = Reverb::new(22050.0);
        for i in 0..2000 {
            reverb.process_single(input[i % 32]);
        }
        reverb.toggle_freeze();
        let energy = reverb.tail_energy();
        for i in 0..5000 {
            reverb.process_single(input[i % 32]);
        }
        prop_assert!((reverb.tail_energy() - energy).abs() <= energy * 1e-3 + 1e-9);
    }

    /// The limiter never lets a sample past its threshold.
    #[test]
    fn limiter_ceiling(
        threshold in 0.1f32..=1.0f32,
        gain in 0.5f32..8.0f32,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut limiter = Limiter::new(44100.0, 2.0, 50.0, threshold);
        let mut block = AudioBuffer::new(2, 256);
        for c in 0..2 {
            for (i, s) in block.channel_mut(c).iter_mut().enumerate() {
                *s = input[(i + c * 7) % 32] * gain;
            }
        }
        limiter.process(&mut block, 2, 256);
        for c in 0..2 {
            for s in block.channel(c) {
                prop_assert!(s.abs() <= threshold + 1e-6);
            }
        }
    }
}
