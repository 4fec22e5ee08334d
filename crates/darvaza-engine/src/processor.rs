//! The per-block orchestrator.

use darvaza_core::{AudioBuffer, Effect, MeasureClock, Sample, TablePool, cap};
use darvaza_effects::{BitCrusher, Limiter, Reverb};

use crate::config::ProcessorConfig;
use crate::gate::GateEngine;
use crate::playback::{ChannelPlayback, PlaybackEngine};
use crate::transport::TransportInfo;

/// State owned by one channel.
#[derive(Debug, Clone)]
struct ChannelState {
    playback: ChannelPlayback,
    reverb: Reverb,
}

impl ChannelState {
    fn new(sample_rate: f32, lowpass_ratio: f32) -> Self {
        let mut reverb = Reverb::new(sample_rate);
        reverb.set_width(1.0);
        reverb.set_room_size(1.0);
        Self {
            playback: ChannelPlayback::new(sample_rate, lowpass_ratio),
            reverb,
        }
    }
}

/// The Darvaza signal chain.
///
/// Call the parameter setters and [`sync_transport`](Self::sync_transport)
/// ahead of each [`process`](Self::process) call. Processing never
/// allocates once buffers have grown to the largest block and channel count
/// seen.
///
/// Channels are processed up to the smaller of the input and output counts;
/// surplus outputs are silenced.
#[derive(Debug)]
pub struct Processor {
    config: ProcessorConfig,
    pool: TablePool,
    clock: MeasureClock,
    gates: GateEngine,
    playback: PlaybackEngine,
    channels: Vec<ChannelState>,
    bit_crusher: BitCrusher,
    limiter: Limiter,

    record: AudioBuffer,
    pre_mix: AudioBuffer,
    dry: AudioBuffer,
    max_record_samples: usize,
    write_pointer: usize,

    reverb_enabled: bool,
    dry_mix: f32,
    bypass: bool,
    playing: bool,
    // last tempo handed in was rejected; hosts resend it every block
    tempo_rejected: bool,
}

impl Processor {
    /// Build the chain. Canonical gate tables are generated here, once.
    pub fn new(config: ProcessorConfig) -> Self {
        let sample_rate = config.sample_rate;
        let pool = TablePool::with_canonical_tables(sample_rate);
        let clock = MeasureClock::new(sample_rate);
        let gates = GateEngine::new(&pool, config.channels, sample_rate);
        let mut playback = PlaybackEngine::new(sample_rate);
        playback.set_interpolation(config.interpolation);

        let lowpass_ratio = playback.lowpass_ratio();
        let channels = (0..config.channels)
            .map(|_| ChannelState::new(sample_rate, lowpass_ratio))
            .collect();

        let bit_crusher = BitCrusher::new(0.0, config.crusher_input_mix, config.crusher_output_mix);
        let mut limiter = Limiter::new(
            sample_rate,
            config.limiter_attack_ms,
            config.limiter_release_ms,
            config.limiter_threshold,
        );
        limiter.ensure_channels(config.channels);

        let mut processor = Self {
            max_record_samples: config.record_samples(),
            config,
            pool,
            clock,
            gates,
            playback,
            channels,
            bit_crusher,
            limiter,
            record: AudioBuffer::default(),
            pre_mix: AudioBuffer::default(),
            dry: AudioBuffer::default(),
            write_pointer: 0,
            reverb_enabled: false,
            dry_mix: 0.0,
            bypass: false,
            playing: false,
            tempo_rejected: false,
        };
        processor.refresh_gate_speed();
        processor
    }

    /// Process `block_size` samples from `inputs` into `outputs`.
    ///
    /// Zero-length blocks and empty channel lists are no-ops.
    pub fn process<T: Sample>(
        &mut self,
        inputs: &[&[T]],
        outputs: &mut [&mut [T]],
        block_size: usize,
    ) {
        let channels = inputs.len().min(outputs.len());
        let block_size = inputs
            .iter()
            .map(|c| c.len())
            .chain(outputs.iter().map(|c| c.len()))
            .fold(block_size, usize::min);
        if block_size == 0 || channels == 0 {
            return;
        }

        if self.bypass {
            for (input, output) in inputs.iter().zip(outputs.iter_mut()) {
                for (o, i) in output[..block_size].iter_mut().zip(input[..block_size].iter()) {
                    *o = *i;
                }
            }
            Self::silence_surplus(outputs, channels, block_size);
            return;
        }

        self.prepare(channels, block_size);
        for (c, input) in inputs.iter().take(channels).enumerate() {
            self.load(c, &input[..block_size]);
        }
        self.render_block(channels, block_size);
        self.store(outputs, channels, block_size);
    }

    /// Process `block_size` samples in place.
    ///
    /// The whole input block is captured before any output is written.
    pub fn process_in_place<T: Sample>(&mut self, buffers: &mut [&mut [T]], block_size: usize) {
        let channels = buffers.len();
        let block_size = buffers.iter().map(|c| c.len()).fold(block_size, usize::min);
        if block_size == 0 || channels == 0 || self.bypass {
            return;
        }

        self.prepare(channels, block_size);
        for (c, buffer) in buffers.iter().enumerate() {
            self.load(c, &buffer[..block_size]);
        }
        self.render_block(channels, block_size);
        self.store(buffers, channels, block_size);
    }

    /// Grow every per-channel structure and buffer to fit the block.
    fn prepare(&mut self, channels: usize, block_size: usize) {
        let sample_rate = self.config.sample_rate;
        let lowpass_ratio = self.playback.lowpass_ratio();
        while self.channels.len() < channels {
            self.channels.push(ChannelState::new(sample_rate, lowpass_ratio));
        }
        self.gates.ensure_channels(channels, &self.pool);
        self.limiter.ensure_channels(channels);

        let record_size = self.max_record_samples.max(block_size * 2);
        if self.record.ensure(channels, record_size) {
            tracing::debug!(channels, samples = record_size, "record buffer allocated");
            self.reset_read_write_pointers();
        }
        if self.pre_mix.ensure(channels, block_size) | self.dry.ensure(channels, block_size) {
            tracing::debug!(channels, block_size, "block buffers allocated");
        }
    }

    fn load<T: Sample>(&mut self, channel: usize, input: &[T]) {
        let pre_mix = &mut self.pre_mix.channel_mut(channel)[..input.len()];
        for (dest, sample) in pre_mix.iter_mut().zip(input) {
            *dest = sample.to_f32();
        }
        self.dry.channel_mut(channel)[..input.len()].copy_from_slice(pre_mix);
        self.record.write_wrapped(channel, self.write_pointer, pre_mix);
    }

    fn store<T: Sample>(&self, outputs: &mut [&mut [T]], channels: usize, block_size: usize) {
        for (c, output) in outputs.iter_mut().take(channels).enumerate() {
            let rendered = &self.pre_mix.channel(c)[..block_size];
            for (dest, sample) in output[..block_size].iter_mut().zip(rendered) {
                *dest = T::from_f32(*sample);
            }
        }
        Self::silence_surplus(outputs, channels, block_size);
    }

    fn silence_surplus<T: Sample>(outputs: &mut [&mut [T]], channels: usize, block_size: usize) {
        for output in outputs.iter_mut().skip(channels) {
            let len = block_size.min(output.len());
            output[..len].fill(T::default());
        }
    }

    fn render_block(&mut self, channels: usize, block_size: usize) {
        // 1. playback from the record ring, or keep the readers on the writer
        if self.playback.is_active() {
            let reverse_span = self.clock.full_measure_samples();
            for (c, state) in self.channels.iter_mut().take(channels).enumerate() {
                self.playback.render(
                    &mut state.playback,
                    c,
                    self.record.channel(c),
                    self.write_pointer,
                    reverse_span,
                    &mut self.pre_mix.channel_mut(c)[..block_size],
                );
            }
        } else {
            for state in &mut self.channels {
                state.playback.sync_to(self.write_pointer);
            }
        }

        // 2. bit crusher
        for c in 0..channels {
            self.bit_crusher
                .process_block_inplace(&mut self.pre_mix.channel_mut(c)[..block_size]);
        }

        // 3. reverb, gates, dry mix
        for i in 0..block_size {
            let position = self.clock.advance();
            self.gates.advance_randomizer(&self.clock);

            if self.playing && self.clock.is_beat_boundary(position) {
                for state in &mut self.channels {
                    state.reverb.toggle_freeze();
                }
            }

            for c in 0..channels {
                let mut sample = self.pre_mix.channel(c)[i];
                if self.reverb_enabled {
                    sample = self.channels[c].reverb.process_single(sample);
                }
                let level = self.gates.envelope(c);
                let dry = self.dry.channel(c)[i];
                self.pre_mix.channel_mut(c)[i] = sample * level + dry * (1.0 - level) * self.dry_mix;
            }
        }

        self.write_pointer = (self.write_pointer + block_size) % self.record.buffer_size();

        // 4. limiter
        self.limiter.process(&mut self.pre_mix, channels, block_size);
    }

    // ---- transport

    /// Apply the host transport for the coming block.
    ///
    /// Starting the transport rewinds the pointers, gates, measure clock and
    /// reverb freeze. Starting or stopping clears the record ring. A tempo or
    /// time signature change re-derives the gate speeds.
    pub fn sync_transport(&mut self, transport: &TransportInfo) {
        let was_playing = self.playing;
        self.playing = transport.playing;

        if !was_playing && self.playing {
            tracing::debug!("transport started");
            self.reset_read_write_pointers();
            self.reset_gates();
            self.clock.reset();
            for state in &mut self.channels {
                if state.reverb.is_frozen() {
                    state.reverb.toggle_freeze();
                }
            }
        }
        if was_playing != self.playing {
            if !self.playing {
                tracing::debug!("transport stopped");
            }
            self.clear_record_buffer();
        }

        self.set_tempo(transport.tempo, transport.numerator, transport.denominator);
    }

    /// Apply host tempo and time signature.
    ///
    /// Returns `true` when the timing changed; gate speeds are refreshed
    /// already. Invalid input keeps the previous timing and is logged once
    /// per run of rejected values.
    pub fn set_tempo(&mut self, tempo: f32, numerator: u32, denominator: u32) -> bool {
        if !tempo.is_finite() || tempo <= 0.0 || numerator == 0 || denominator == 0 {
            if !self.tempo_rejected {
                tracing::warn!(tempo, numerator, denominator, "ignoring invalid tempo");
                self.tempo_rejected = true;
            }
            return false;
        }
        self.tempo_rejected = false;
        let changed = self.clock.set_tempo(tempo, numerator, denominator);
        if changed {
            self.refresh_gate_speed();
        }
        changed
    }

    /// Rewind the write pointer and every read pointer to the ring start.
    pub fn reset_read_write_pointers(&mut self) {
        self.write_pointer = 0;
        for state in &mut self.channels {
            state.playback.sync_to(0);
            state.playback.reset();
        }
    }

    /// Restart every gate oscillator at phase zero.
    pub fn reset_gates(&mut self) {
        self.gates.reset();
    }

    /// Zero the record ring.
    pub fn clear_record_buffer(&mut self) {
        self.record.silence();
    }

    // ---- parameters

    /// Set the gate subdivisions (normalized) and the link flag.
    pub fn set_gate_speed(&mut self, odd_steps: f32, even_steps: f32, linked: bool) {
        self.gates.set_gate_speed(odd_steps, even_steps, linked, &self.clock);
    }

    /// Re-derive gate frequencies from the current tempo.
    pub fn refresh_gate_speed(&mut self) {
        self.gates.refresh(&self.clock);
    }

    /// Set the gate speed randomization control (first step is off).
    pub fn randomize_gate_speed(&mut self, value: f32) {
        self.gates.randomize(value, &self.clock);
    }

    /// Select the gate shape from a normalized control.
    pub fn create_gate_tables(&mut self, waveform: f32) {
        self.gates.set_waveform(waveform, &self.pool);
    }

    /// Set the bit-crush amount (0 = 16 bit, 1 = 1 bit).
    pub fn set_bit_depth(&mut self, amount: f32) {
        self.bit_crusher.set_amount(amount);
    }

    /// Set the crusher's input and output gains.
    pub fn set_crusher_mix(&mut self, input_mix: f32, output_mix: f32) {
        self.bit_crusher.set_input_mix(input_mix);
        self.bit_crusher.set_output_mix(output_mix);
    }

    /// Set the downsample amount (0 = off, 1 = 2 kHz effective rate).
    pub fn set_resample_rate(&mut self, value: f32) {
        let sync = self.playback.set_resample_rate(value);
        let ratio = self.playback.lowpass_ratio();
        for state in &mut self.channels {
            state.playback.set_lowpass_ratio(ratio);
        }
        if sync {
            self.sync_read_pointers();
        }
    }

    /// Set the slowdown (0 = 100 %, 1 = 50 %).
    pub fn set_playback_rate(&mut self, value: f32) {
        if self.playback.set_playback_rate(value) {
            self.sync_read_pointers();
        }
    }

    /// Select a harmony scale (0 = off).
    pub fn set_harmony(&mut self, value: f32) {
        if self.playback.set_harmony(value) {
            self.sync_read_pointers();
        }
    }

    /// Enable reverse playback.
    pub fn enable_reverse(&mut self, enabled: bool) {
        if self.playback.set_reverse(enabled) {
            self.sync_read_pointers();
        }
    }

    /// Enable the reverb. Disabling clears unfrozen tails.
    pub fn enable_reverb(&mut self, enabled: bool) {
        if self.reverb_enabled && !enabled {
            for state in &mut self.channels {
                state.reverb.mute();
            }
        }
        self.reverb_enabled = enabled;
    }

    /// Set the dry level mixed in where the gate is closed.
    pub fn set_dry_mix(&mut self, value: f32) {
        self.dry_mix = cap(value, 1.0);
    }

    /// Copy input to output untouched while set.
    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    fn sync_read_pointers(&mut self) {
        for state in &mut self.channels {
            state.playback.sync_to(self.write_pointer);
        }
    }

    // ---- inspection

    /// Settings the processor was built with.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Tempo and measure position.
    pub fn clock(&self) -> &MeasureClock {
        &self.clock
    }

    /// Gate oscillators.
    pub fn gates(&self) -> &GateEngine {
        &self.gates
    }

    /// Shared playback settings.
    pub fn playback(&self) -> &PlaybackEngine {
        &self.playback
    }

    /// The bit crusher.
    pub fn bit_crusher(&self) -> &BitCrusher {
        &self.bit_crusher
    }

    /// Reverb of `channel`.
    pub fn reverb(&self, channel: usize) -> Option<&Reverb> {
        self.channels.get(channel).map(|state| &state.reverb)
    }

    /// Fractional read pointer of `channel`.
    pub fn read_pointer(&self, channel: usize) -> Option<f64> {
        self.channels.get(channel).map(|state| state.playback.read_pointer())
    }

    /// Start of the next block in the record ring.
    pub fn write_pointer(&self) -> usize {
        self.write_pointer
    }

    /// The record ring.
    pub fn record_buffer(&self) -> &AudioBuffer {
        &self.record
    }

    /// True while the host transport is rolling.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// True when the reverb runs.
    pub fn is_reverb_enabled(&self) -> bool {
        self.reverb_enabled
    }

    /// Dry level.
    pub fn dry_mix(&self) -> f32 {
        self.dry_mix
    }

    /// True when bypassed.
    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    /// Output delay introduced by the limiter lookahead.
    pub fn latency_samples(&self) -> usize {
        self.limiter.latency_samples()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> Processor {
        Processor::new(ProcessorConfig::new(44100.0, 2))
    }

    fn run(processor: &mut Processor, value: f32, block: usize) -> (Vec<f32>, Vec<f32>) {
        let left = vec![value; block];
        let right = vec![-value; block];
        let mut out_l = vec![0.0f32; block];
        let mut out_r = vec![0.0f32; block];
        processor.process(
            &[left.as_slice(), right.as_slice()],
            &mut [out_l.as_mut_slice(), out_r.as_mut_slice()],
            block,
        );
        (out_l, out_r)
    }

    #[test]
    fn test_zero_length_is_noop() {
        let mut p = processor();
        let (l, _) = run(&mut p, 0.5, 0);
        assert!(l.is_empty());
        assert_eq!(p.clock().position(), 0);
        assert!(p.record_buffer().is_empty());
    }

    #[test]
    fn test_bypass_copies_input() {
        let mut p = processor();
        p.set_bypass(true);
        let (l, r) = run(&mut p, 0.9, 64);
        assert!(l.iter().all(|s| *s == 0.9));
        assert!(r.iter().all(|s| *s == -0.9));
        assert_eq!(p.clock().position(), 0);
    }

    #[test]
    fn test_write_pointer_and_clock_advance() {
        let mut p = processor();
        run(&mut p, 0.1, 512);
        assert_eq!(p.write_pointer(), 512);
        assert_eq!(p.clock().position(), 512);
        assert_eq!(p.record_buffer().channel(0)[..512], [0.1f32; 512]);
        assert_eq!(p.record_buffer().channel(1)[..512], [-0.1f32; 512]);
    }

    #[test]
    fn test_read_pointers_follow_writer_when_idle() {
        let mut p = processor();
        run(&mut p, 0.1, 256);
        run(&mut p, 0.1, 256);
        assert_eq!(p.read_pointer(0), Some(256.0));
        assert_eq!(p.read_pointer(1), Some(256.0));
    }

    #[test]
    fn test_output_respects_limiter() {
        let mut p = processor();
        p.set_dry_mix(1.0);
        for _ in 0..20 {
            let (l, r) = run(&mut p, 1.0, 256);
            assert!(l.iter().chain(r.iter()).all(|s| s.abs() <= 0.6 + 1e-6));
        }
    }

    #[test]
    fn test_transport_start_resets() {
        let mut p = processor();
        run(&mut p, 0.3, 300);
        assert!(!p.record_buffer().is_silent());

        p.sync_transport(&TransportInfo::playing(120.0, 4, 4));
        assert!(p.is_playing());
        assert_eq!(p.write_pointer(), 0);
        assert_eq!(p.clock().position(), 0);
        assert!(p.record_buffer().is_silent());
        assert_eq!(p.read_pointer(0), Some(0.0));

        run(&mut p, 0.3, 300);
        p.sync_transport(&TransportInfo::stopped(120.0, 4, 4));
        assert!(p.record_buffer().is_silent());
        assert_eq!(p.write_pointer(), 300, "stopping keeps the pointers");
    }

    #[test]
    fn test_reverb_freeze_toggles_on_beats_while_playing() {
        let mut p = processor();
        p.enable_reverb(true);
        p.sync_transport(&TransportInfo::playing(120.0, 4, 4));

        // position 0 is a beat boundary
        run(&mut p, 0.1, 16);
        assert!(p.reverb(0).is_some_and(Reverb::is_frozen));
        assert!(p.reverb(1).is_some_and(Reverb::is_frozen));

        // next beat at 22050
        let beat = p.clock().beat_samples();
        let mut remaining = beat - 16;
        while remaining > 0 {
            let block = remaining.min(512);
            run(&mut p, 0.1, block);
            remaining -= block;
        }
        assert!(p.reverb(0).is_some_and(Reverb::is_frozen));
        run(&mut p, 0.1, 1);
        assert!(p.reverb(0).is_some_and(|r| !r.is_frozen()));
    }

    #[test]
    fn test_no_freeze_while_stopped() {
        let mut p = processor();
        p.enable_reverb(true);
        run(&mut p, 0.1, 64);
        assert!(p.reverb(0).is_some_and(|r| !r.is_frozen()));
    }

    #[test]
    fn test_tempo_updates_gates() {
        let mut p = processor();
        p.set_gate_speed(2.0 / 11.0, 2.0 / 11.0, true);
        assert_eq!(p.gates().odd().frequency(), 0.5);
        assert!(p.set_tempo(60.0, 4, 4));
        assert_eq!(p.gates().odd().frequency(), 0.25);
        assert!(!p.set_tempo(60.0, 4, 4));
        assert!(!p.set_tempo(f32::NAN, 4, 4));
        assert!(!p.set_tempo(120.0, 0, 4));
    }

    #[test]
    fn test_surplus_outputs_silenced() {
        let mut p = processor();
        let input = vec![0.2f32; 32];
        let mut a = vec![1.0f32; 32];
        let mut b = vec![1.0f32; 32];
        p.process(&[input.as_slice()], &mut [a.as_mut_slice(), b.as_mut_slice()], 32);
        assert!(b.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_channel_growth() {
        let mut p = Processor::new(ProcessorConfig::new(44100.0, 1));
        let input = vec![0.2f32; 32];
        let mut outs = vec![vec![0.0f32; 32]; 4];
        let inputs = [input.as_slice(); 4];
        let mut out_refs: Vec<&mut [f32]> = outs.iter_mut().map(Vec::as_mut_slice).collect();
        p.process(&inputs, &mut out_refs, 32);
        assert_eq!(p.record_buffer().channel_count(), 4);
        assert_eq!(p.gates().channel_count(), 4);
        assert!(p.reverb(3).is_some());
    }

    #[test]
    fn test_dry_mix_capped() {
        let mut p = processor();
        p.set_dry_mix(3.0);
        assert_eq!(p.dry_mix(), 1.0);
        p.set_dry_mix(f32::NAN);
        assert_eq!(p.dry_mix(), 0.0);
    }

    #[test]
    fn test_crusher_mix_capped() {
        let mut p = processor();
        p.set_crusher_mix(0.5, 2.0);
        assert_eq!(p.bit_crusher().input_mix(), 0.5);
        assert_eq!(p.bit_crusher().output_mix(), 1.0);
    }

    #[test]
    fn test_invalid_tempo_keeps_timing_until_valid() {
        let mut p = processor();
        p.sync_transport(&TransportInfo::playing(100.0, 3, 4));
        let measure = p.clock().full_measure_samples();
        assert!(!p.tempo_rejected);

        for _ in 0..8 {
            p.sync_transport(&TransportInfo::playing(0.0, 3, 4));
            assert!(p.tempo_rejected);
            assert_eq!(p.clock().full_measure_samples(), measure);
        }
        assert!(!p.set_tempo(f32::NAN, 4, 4));
        assert!(p.tempo_rejected);

        p.sync_transport(&TransportInfo::playing(120.0, 4, 4));
        assert!(!p.tempo_rejected);
        assert_eq!(p.clock().tempo(), 120.0);
        assert!(!p.set_tempo(60.0, 0, 4));
        assert!(p.tempo_rejected);
    }
}
