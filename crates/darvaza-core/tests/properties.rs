//! Property-based tests for darvaza-core DSP primitives.
//!
//! Tests oscillator phase range, gate envelope bounds, filter stability and
//! ring writes using proptest for randomized input generation.

use proptest::prelude::*;
use darvaza_core::{
    AllpassFilter, AudioBuffer, CombFilter, LowPassFilter, MeasureClock, TablePool, WaveTable,
    Waveform, gate_subdivision,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// The phase accumulator stays inside [0, sample_rate) for any
    /// frequency, including ones above the sample rate.
    #[test]
    fn accumulator_stays_in_range(
        frequency in 0.0f32..100_000.0f32,
        steps in 1usize..2000,
    ) {
        let sample_rate = 44100.0;
        let mut table = WaveTable::generate(Waveform::Sawtooth, 256, sample_rate);
        table.set_frequency(frequency);
        for _ in 0..steps {
            table.peek();
            let acc = table.accumulator();
            prop_assert!((0.0..sample_rate).contains(&acc), "accumulator {} out of range", acc);
        }
    }

    /// Gate envelopes built from canonical tables stay in [0, 1].
    #[test]
    fn gate_envelope_is_unipolar(
        selector in 0.0f32..=1.0f32,
        subdivision in 0.0f32..=1.0f32,
        tempo in 40.0f32..300.0f32,
    ) {
        let pool = TablePool::with_canonical_tables(48000.0);
        let mut clock = MeasureClock::new(48000.0);
        clock.set_tempo(tempo, 4, 4);

        let mut gate = pool.get_table(Waveform::from_normalized(selector)).unwrap().clone();
        gate.set_frequency(clock.subdivision_frequency(gate_subdivision(subdivision)));
        for _ in 0..4096 {
            let level = gate.peek() * 0.5 + 0.5;
            prop_assert!((0.0..=1.0).contains(&level), "gate level {} out of range", level);
        }
    }

    /// Gate subdivision never decreases as the control rises.
    #[test]
    fn subdivision_is_monotonic(a in 0.0f32..=1.0f32, b in 0.0f32..=1.0f32) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(gate_subdivision(lo) <= gate_subdivision(hi));
    }

    /// Comb and allpass stay finite for any sub-unity feedback and damping.
    #[test]
    fn reverb_filters_stay_finite(
        feedback in 0.0f32..0.99f32,
        damp in 0.0f32..=1.0f32,
        delay in 1usize..2000,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut comb = CombFilter::new(delay);
        comb.set_feedback(feedback);
        comb.set_damp(damp);
        let mut allpass = AllpassFilter::new(delay);
        for _ in 0..64 {
            for &sample in &input {
                let out = allpass.process(comb.process(sample));
                prop_assert!(out.is_finite());
            }
        }
    }

    /// The anti-alias lowpass never amplifies a bounded signal.
    #[test]
    fn lowpass_is_bounded(
        ratio in 1.0f32..32.0f32,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut lp = LowPassFilter::new(44100.0);
        lp.set_ratio(ratio);
        for &sample in input.iter().cycle().take(1024) {
            prop_assert!(lp.process(sample).abs() <= 1.0 + 1e-6);
        }
    }

    /// Wrapped writes land every sample at (start + i) mod length.
    #[test]
    fn wrapped_write_positions(
        len in 1usize..64,
        start in 0usize..256,
        count in 0usize..64,
    ) {
        let count = count.min(len);
        let mut buffer = AudioBuffer::new(1, len);
        let samples: Vec<f32> = (1..=count).map(|i| i as f32).collect();
        buffer.write_wrapped(0, start, &samples);
        for (i, sample) in samples.iter().enumerate() {
            prop_assert_eq!(buffer.channel(0)[(start + i) % len], *sample);
        }
    }
}
