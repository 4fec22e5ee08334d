//! Criterion benchmarks for darvaza-effects
//!
//! Run with: cargo bench -p darvaza-effects
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use darvaza_core::{AudioBuffer, Effect};
use darvaza_effects::{BitCrusher, Limiter, Reverb};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_effects(c: &mut Criterion) {
    let mut group = c.benchmark_group("Effects");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(BenchmarkId::new("bitcrusher", block_size), &block_size, |b, _| {
            let mut crusher = BitCrusher::new(0.6, 1.0, 1.0);
            let mut block = input.clone();
            b.iter(|| {
                block.copy_from_slice(&input);
                crusher.process_block_inplace(black_box(&mut block));
            });
        });

        group.bench_with_input(BenchmarkId::new("reverb", block_size), &block_size, |b, _| {
            let mut reverb = Reverb::new(SAMPLE_RATE);
            reverb.set_room_size(1.0);
            b.iter(|| {
                for &sample in &input {
                    black_box(reverb.process_single(black_box(sample)));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("limiter_stereo", block_size), &block_size, |b, &n| {
            let mut limiter = Limiter::new(SAMPLE_RATE, 10.0, 500.0, 0.6);
            let mut block = AudioBuffer::new(2, n);
            b.iter(|| {
                for ch in 0..2 {
                    block.channel_mut(ch).copy_from_slice(&input);
                }
                limiter.process(black_box(&mut block), 2, n);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_effects);
criterion_main!(benches);
