//! Integration tests for darvaza-core: components used together the way the
//! engine wires them.

use darvaza_core::{
    AllpassFilter, CombFilter, Effect, MeasureClock, TablePool, Waveform, gate_subdivision,
};

struct Diffuser {
    comb: CombFilter,
    allpass: AllpassFilter,
}

impl Effect for Diffuser {
    fn process(&mut self, input: f32) -> f32 {
        self.allpass.process(self.comb.process(input))
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {
        self.comb.clear();
        self.allpass.clear();
    }
}

#[test]
fn measure_scenario_at_44k() {
    let mut clock = MeasureClock::new(44100.0);
    clock.set_tempo(120.0, 4, 4);
    assert_eq!(clock.full_measure_samples(), 88200);
    assert_eq!(clock.beat_samples(), 22050);
}

#[test]
fn one_measure_gate_completes_one_cycle_per_measure() {
    let pool = TablePool::with_canonical_tables(44100.0);
    let clock = MeasureClock::new(44100.0);
    let mut gate = pool.get_table(Waveform::Sine).unwrap().clone();
    gate.set_frequency(clock.subdivision_frequency(gate_subdivision(2.0 / 11.0)));
    assert!((gate.frequency() - 0.5).abs() < 1e-6);

    for _ in 0..clock.full_measure_samples() {
        gate.peek();
    }
    // back at the start of the cycle, give or take float residue
    let acc = gate.accumulator();
    assert!(acc < 1.0 || acc > 44099.0, "accumulator {}", acc);
}

#[test]
fn linked_tables_share_phase() {
    let pool = TablePool::with_canonical_tables(48000.0);
    let mut odd = pool.get_table(Waveform::Triangle).unwrap().clone();
    let mut even = pool.get_table(Waveform::Triangle).unwrap().clone();
    odd.set_frequency(2.0);
    even.set_frequency(2.0);
    for _ in 0..777 {
        odd.peek();
    }
    even.set_accumulator(odd.accumulator());
    for _ in 0..1000 {
        assert_eq!(odd.peek(), even.peek());
    }
}

#[test]
fn effect_trait_block_processing() {
    let mut diffuser = Diffuser {
        comb: CombFilter::new(37),
        allpass: AllpassFilter::new(11),
    };
    let mut block = vec![0.0f32; 128];
    block[0] = 1.0;
    diffuser.process_block_inplace(&mut block);
    assert!(block.iter().skip(37).any(|s| s.abs() > 0.0));

    diffuser.reset();
    let input = vec![0.0f32; 64];
    let mut output = vec![1.0f32; 64];
    diffuser.process_block(&input, &mut output);
    assert!(output.iter().all(|s| *s == 0.0));
}
