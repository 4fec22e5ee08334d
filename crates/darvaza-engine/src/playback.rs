//! Variable-rate playback from the record ring.
//!
//! While downsampling, slowing, harmonizing or reversing is active the
//! pre-mix block is not the live input but a re-read of the record ring. Each
//! channel owns a fractional read pointer ([`ChannelPlayback`]); the shared
//! rate settings live in [`PlaybackEngine`].
//!
//! # Per output group
//!
//! The downsampler holds every read value for `sample_incr` output samples.
//! For each group:
//!
//! 1. read the two ring samples bracketing the read pointer and blend them
//!    by the [`Interpolation`] fraction
//! 2. run the anti-alias [`LowPassFilter`]
//! 3. smooth: `next = out * 0.5 + last; last = next * 0.25`
//! 4. add triangular dither
//! 5. advance the read pointer by `incr = f_sample_incr * rate`
//!
//! where `rate` is the slowdown rate, or the channel group's harmony ratio
//! while harmonizing.
//!
//! # Read pointer invariant
//!
//! A forward pointer never passes the newest sample of the current block
//! (`write + block - 1`). When an advance would carry it onto the first
//! unwritten slot or beyond, it snaps back to the start of the current block,
//! re-syncing playback with the live input. A reversed pointer runs away from the write position and jumps back
//! to the newest sample after travelling one measure.

use darvaza_core::{LowPassFilter, cap, scale};
use libm::floorf;

use crate::config::{Interpolation, MIN_PLAYBACK_SPEED, MIN_SAMPLE_RATE};
use crate::harmony::HarmonyScale;

/// One 16-bit word step.
const WORD_INCREMENT: f32 = 1.0 / 32768.0;

/// DC offset added with the dither.
const DC_OFFSET: f32 = WORD_INCREMENT * 0.5;

/// Triangular-PDF dither of one 16-bit step.
///
/// Uses a linear congruential generator (no heap allocation).
#[derive(Debug, Clone)]
pub struct Dither {
    state: u32,
}

impl Default for Dither {
    fn default() -> Self {
        Self { state: 0x5eed_da27 }
    }
}

impl Dither {
    /// Next dither value: `DC_OFFSET + step * (r1 - r2)`.
    #[inline]
    pub fn sample(&mut self) -> f32 {
        let r1 = self.next_random();
        let r2 = self.next_random();
        DC_OFFSET + WORD_INCREMENT * (r1 - r2)
    }

    /// Uniform value in `[0, 1)`.
    #[inline]
    fn next_random(&mut self) -> f32 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (self.state >> 16) as f32 / 65536.0
    }
}

/// Per-channel playback state.
#[derive(Debug, Clone)]
pub struct ChannelPlayback {
    read_pointer: f64,
    last_sample: f32,
    filter: LowPassFilter,
    reverse_travel: f64,
}

impl ChannelPlayback {
    /// Fresh state reading from the start of the ring.
    pub fn new(sample_rate: f32, lowpass_ratio: f32) -> Self {
        let mut filter = LowPassFilter::new(sample_rate);
        filter.set_ratio(lowpass_ratio);
        Self {
            read_pointer: 0.0,
            last_sample: 0.0,
            filter,
            reverse_travel: 0.0,
        }
    }

    /// Fractional read position in the record ring.
    pub fn read_pointer(&self) -> f64 {
        self.read_pointer
    }

    /// Move the read pointer to `position` (the write pointer, usually).
    pub fn sync_to(&mut self, position: usize) {
        self.read_pointer = position as f64;
        self.reverse_travel = 0.0;
    }

    /// Set the anti-alias filter's decimation ratio.
    pub fn set_lowpass_ratio(&mut self, ratio: f32) {
        self.filter.set_ratio(ratio);
    }

    /// The anti-alias filter.
    pub fn filter(&self) -> &LowPassFilter {
        &self.filter
    }

    /// Clear filter and smoothing history.
    pub fn reset(&mut self) {
        self.last_sample = 0.0;
        self.filter.reset();
        self.reverse_travel = 0.0;
    }
}

/// Rate settings shared by all channels.
///
/// # Example
///
/// ```rust
/// use darvaza_engine::PlaybackEngine;
///
/// let mut playback = PlaybackEngine::new(44100.0);
/// assert!(!playback.is_active());
///
/// playback.set_playback_rate(1.0);
/// assert_eq!(playback.playback_rate(), 0.5);
/// assert!(playback.is_slowed_down());
/// ```
#[derive(Debug, Clone)]
pub struct PlaybackEngine {
    max_downsample: f32,
    downsample_amount: f32,
    f_sample_incr: f32,
    sample_incr: usize,
    playback_rate: f32,
    harmony: Option<HarmonyScale>,
    harmony_ratios: (f32, f32),
    reverse: bool,
    interpolation: Interpolation,
    dither: Dither,
}

impl PlaybackEngine {
    /// Real-time playback settings at `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            max_downsample: (sample_rate / MIN_SAMPLE_RATE).max(1.0),
            downsample_amount: 1.0,
            f_sample_incr: 1.0,
            sample_incr: 1,
            playback_rate: 1.0,
            harmony: None,
            harmony_ratios: (1.0, 1.0),
            reverse: false,
            interpolation: Interpolation::default(),
            dither: Dither::default(),
        }
    }

    /// Set the interpolation mode.
    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    /// Current interpolation mode.
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Set the downsample amount from a normalized control.
    ///
    /// `0` plays at the full rate, `1` reaches an effective 2 kHz. Returns
    /// `true` when the change leaves playback idle, so the read pointers
    /// should jump back to the write pointer.
    pub fn set_resample_rate(&mut self, value: f32) -> bool {
        let amount = scale(value, 1.0, (self.max_downsample - 1.0).max(0.0)) + 1.0;
        if amount == self.downsample_amount {
            return false;
        }
        let was_downsampled = self.is_downsampled();

        self.downsample_amount = amount;
        self.f_sample_incr = floorf(amount).max(1.0);
        self.sample_incr = self.f_sample_incr as usize;

        was_downsampled && !self.is_downsampled() && !self.is_slowed_down()
    }

    /// Set the slowdown from a normalized control (0 = 100 %, 1 = 50 %).
    ///
    /// Returns `true` when playback stops being slowed.
    pub fn set_playback_rate(&mut self, value: f32) -> bool {
        let was_slowed = self.is_slowed_down();
        let inverted = (cap(value, 1.0) - 1.0).abs();
        self.playback_rate = scale(inverted, 1.0, 1.0 - MIN_PLAYBACK_SPEED) + MIN_PLAYBACK_SPEED;
        was_slowed && !self.is_slowed_down()
    }

    /// Select a harmony scale from a normalized control (0 = off).
    ///
    /// Returns `true` when playback stops being slowed.
    pub fn set_harmony(&mut self, value: f32) -> bool {
        let was_slowed = self.is_slowed_down();
        self.harmony = HarmonyScale::from_normalized(value);
        self.harmony_ratios = self.harmony.map_or((1.0, 1.0), HarmonyScale::ratios);
        was_slowed && !self.is_slowed_down()
    }

    /// Enable reverse playback.
    ///
    /// Returns `true` when this leaves playback idle.
    pub fn set_reverse(&mut self, enabled: bool) -> bool {
        let was_active = self.is_active();
        self.reverse = enabled;
        was_active && !self.is_active()
    }

    /// Downsample amount in `[1, sample_rate / 2000]`.
    pub fn downsample_amount(&self) -> f32 {
        self.downsample_amount
    }

    /// Whole samples each read value is held for.
    pub fn sample_incr(&self) -> usize {
        self.sample_incr
    }

    /// Slowdown rate in `[0.5, 1]`.
    pub fn playback_rate(&self) -> f32 {
        self.playback_rate
    }

    /// Active harmony scale.
    pub fn harmony(&self) -> Option<HarmonyScale> {
        self.harmony
    }

    /// True when reverse playback is on.
    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    /// True when holding reads for more than one sample.
    pub fn is_downsampled(&self) -> bool {
        self.downsample_amount > 1.0
    }

    /// True when reading slower than real time.
    pub fn is_slowed_down(&self) -> bool {
        self.playback_rate < 1.0 || self.harmony.is_some()
    }

    /// True when the pre-mix block comes from the record ring.
    pub fn is_active(&self) -> bool {
        self.is_downsampled() || self.is_slowed_down() || self.reverse
    }

    /// Anti-alias filter ratio for the current downsample amount.
    pub fn lowpass_ratio(&self) -> f32 {
        1.0 + self.downsample_amount / self.max_downsample
    }

    /// Read pointer advance per output group for `channel`.
    pub fn increment(&self, channel: usize) -> f32 {
        let rate = match self.harmony {
            Some(_) if channel % 2 == 0 => self.harmony_ratios.0,
            Some(_) => self.harmony_ratios.1,
            None => self.playback_rate,
        };
        self.f_sample_incr * rate
    }

    /// Render `out.len()` samples for one channel from `record`.
    ///
    /// `write_start` is where the current block begins in the ring; the block
    /// itself must already be written. `reverse_span` is the distance a
    /// reversed pointer travels before jumping back to the newest sample.
    pub fn render(
        &mut self,
        state: &mut ChannelPlayback,
        channel: usize,
        record: &[f32],
        write_start: usize,
        reverse_span: usize,
        out: &mut [f32],
    ) {
        let block = out.len();
        let len = record.len();
        if block == 0 || len == 0 {
            return;
        }

        let incr = f64::from(self.increment(channel));
        let hold = self.sample_incr.max(1);
        let span = reverse_span.min(len.saturating_sub(block) / 2).max(1) as f64;

        let mut i = 0;
        while i < block {
            let value = self.read(state, record, write_start, block);
            let filtered = state.filter.process(value);
            let next = filtered * 0.5 + state.last_sample;
            state.last_sample = next * 0.25;
            let sample = next + self.dither.sample();

            let end = (i + hold).min(block);
            out[i..end].fill(sample);
            i = end;

            if self.reverse {
                Self::retreat(state, incr, len, write_start, block, span);
            } else {
                Self::advance(state, incr, len, write_start, block);
            }
        }
    }

    fn read(&self, state: &ChannelPlayback, record: &[f32], write_start: usize, block: usize) -> f32 {
        let len = record.len();
        let base = state.read_pointer.floor();
        let index = (base as usize) % len;
        let remainder = (state.read_pointer - base) as f32;

        // never blend in the slot past the newest written sample
        let newest = (write_start + block - 1) % len;
        let neighbour = if index == newest { index } else { (index + 1) % len };

        let current = record[index];
        current + (record[neighbour] - current) * self.interpolation.fraction(remainder)
    }

    fn advance(state: &mut ChannelPlayback, incr: f64, len: usize, write_start: usize, block: usize) {
        let len_f = len as f64;
        // distance to the first slot not yet written this block
        let room = ((write_start + block) as f64 - state.read_pointer).rem_euclid(len_f);
        let room = if room == 0.0 { len_f } else { room };

        if incr >= room {
            state.read_pointer = write_start as f64;
            return;
        }
        let mut next = state.read_pointer + incr;
        if next >= len_f {
            next -= len_f;
        }
        state.read_pointer = next;
    }

    fn retreat(
        state: &mut ChannelPlayback,
        incr: f64,
        len: usize,
        write_start: usize,
        block: usize,
        span: f64,
    ) {
        let mut next = state.read_pointer - incr;
        if next < 0.0 {
            next += len as f64;
        }
        state.reverse_travel += incr;
        if state.reverse_travel >= span {
            next = ((write_start + block - 1) % len) as f64;
            state.reverse_travel = 0.0;
        }
        state.read_pointer = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| i as f32 / len as f32).collect()
    }

    #[test]
    fn test_default_is_idle() {
        let playback = PlaybackEngine::new(44100.0);
        assert!(!playback.is_active());
        assert_eq!(playback.sample_incr(), 1);
        assert_eq!(playback.increment(0), 1.0);
    }

    #[test]
    fn test_resample_rate_mapping() {
        let mut playback = PlaybackEngine::new(44100.0);
        assert!(!playback.set_resample_rate(1.0));
        assert!((playback.downsample_amount() - 22.05).abs() < 1e-4);
        assert_eq!(playback.sample_incr(), 22);
        assert!(playback.is_downsampled());
        assert!((playback.lowpass_ratio() - 2.0).abs() < 1e-6);

        // going back to real time asks for a pointer sync
        assert!(playback.set_resample_rate(0.0));
        assert_eq!(playback.sample_incr(), 1);
        // unchanged value is a no-op
        assert!(!playback.set_resample_rate(0.0));
    }

    #[test]
    fn test_no_sync_while_still_slowed() {
        let mut playback = PlaybackEngine::new(44100.0);
        playback.set_playback_rate(1.0);
        playback.set_resample_rate(0.5);
        assert!(!playback.set_resample_rate(0.0));
        assert!(playback.set_playback_rate(0.0));
    }

    #[test]
    fn test_playback_rate_mapping() {
        let mut playback = PlaybackEngine::new(48000.0);
        playback.set_playback_rate(0.0);
        assert_eq!(playback.playback_rate(), 1.0);
        playback.set_playback_rate(0.5);
        assert_eq!(playback.playback_rate(), 0.75);
        playback.set_playback_rate(1.0);
        assert_eq!(playback.playback_rate(), 0.5);
    }

    #[test]
    fn test_harmony_increments_per_group() {
        let mut playback = PlaybackEngine::new(48000.0);
        playback.set_playback_rate(1.0);
        playback.set_harmony(0.05);
        let (odd, even) = HarmonyScale::Major.ratios();
        assert_eq!(playback.increment(0), odd);
        assert_eq!(playback.increment(1), even);
        assert_eq!(playback.increment(2), odd);
        assert_eq!(playback.increment(3), even);
        assert!(!playback.set_harmony(0.0), "rate control keeps it slowed");
    }

    #[test]
    fn test_dither_is_small() {
        let mut dither = Dither::default();
        let mut sum = 0.0f64;
        for _ in 0..10_000 {
            let d = dither.sample();
            assert!(d.abs() <= WORD_INCREMENT * 1.5 + 1e-9);
            sum += f64::from(d);
        }
        let mean = sum / 10_000.0;
        assert!((mean - f64::from(DC_OFFSET)).abs() < 2e-6, "mean {}", mean);
    }

    #[test]
    fn test_forward_pointer_snaps_to_write_start() {
        let len = 1024;
        let record = ramp(len);
        let mut playback = PlaybackEngine::new(44100.0);
        let mut state = ChannelPlayback::new(44100.0, playback.lowpass_ratio());
        state.sync_to(100);

        // normal speed for one block ends exactly at the next block start
        let mut out = vec![0.0; 64];
        playback.render(&mut state, 0, &record, 100, 0, &mut out);
        assert_eq!(state.read_pointer(), 100.0, "snapped instead of leaving the block");
    }

    #[test]
    fn test_large_step_from_behind_snaps() {
        let record = ramp(4096);
        let mut playback = PlaybackEngine::new(44100.0);
        playback.set_resample_rate(1.0);
        let mut state = ChannelPlayback::new(44100.0, playback.lowpass_ratio());
        state.read_pointer = 99.5;

        // one held group of 22 would land past the 16-sample block
        let mut out = vec![0.0; 16];
        playback.render(&mut state, 0, &record, 100, 0, &mut out);
        assert_eq!(state.read_pointer(), 100.0);
    }

    #[test]
    fn test_slow_pointer_falls_behind_writer() {
        let len = 4096;
        let record = ramp(len);
        let mut playback = PlaybackEngine::new(44100.0);
        playback.set_playback_rate(1.0);
        let mut state = ChannelPlayback::new(44100.0, playback.lowpass_ratio());

        let block = 128;
        let mut out = vec![0.0; block];
        for k in 0..10 {
            let write = k * block;
            playback.render(&mut state, 0, &record, write, 0, &mut out);
            // half speed covers half a block per block
            assert_eq!(state.read_pointer(), (k as f64 + 1.0) * 64.0);
            assert!(state.read_pointer() < (write + block) as f64);
        }
    }

    #[test]
    fn test_downsample_holds_values() {
        let record = ramp(1000);
        let mut playback = PlaybackEngine::new(8000.0);
        playback.set_resample_rate(1.0);
        assert_eq!(playback.sample_incr(), 4);
        let mut state = ChannelPlayback::new(8000.0, playback.lowpass_ratio());
        let mut out = vec![0.0; 16];
        playback.render(&mut state, 0, &record, 0, 0, &mut out);
        for group in out.chunks(4) {
            assert!(group.iter().all(|s| *s == group[0]));
        }
        assert_eq!(state.read_pointer(), 0.0, "four groups of four end on the block boundary and snap");
    }

    #[test]
    fn test_fixed_fraction_ignores_remainder() {
        let record = vec![0.0, 1.0, 0.0, 0.0];
        let playback = PlaybackEngine::new(44100.0);
        let mut state = ChannelPlayback::new(44100.0, 1.0);
        state.read_pointer = 0.5;
        assert_eq!(playback.read(&state, &record, 0, 4), 0.0);

        let mut linear = PlaybackEngine::new(44100.0);
        linear.set_interpolation(Interpolation::Linear);
        assert_eq!(linear.read(&state, &record, 0, 4), 0.5);
    }

    #[test]
    fn test_read_never_blends_past_newest() {
        let record = vec![0.5, 0.5, 0.5, 9.0];
        let mut playback = PlaybackEngine::new(44100.0);
        playback.set_interpolation(Interpolation::Linear);
        let mut state = ChannelPlayback::new(44100.0, 1.0);
        // block 0..3, slot 3 holds stale data from the previous lap
        state.read_pointer = 2.5;
        assert_eq!(playback.read(&state, &record, 0, 3), 0.5);
    }

    #[test]
    fn test_reverse_walks_backwards_then_jumps() {
        let len = 2048;
        let record = ramp(len);
        let mut playback = PlaybackEngine::new(44100.0);
        playback.set_reverse(true);
        let mut state = ChannelPlayback::new(44100.0, 1.0);
        state.sync_to(1000);

        let mut out = vec![0.0; 10];
        playback.render(&mut state, 0, &record, 1000, 100, &mut out);
        assert_eq!(state.read_pointer(), 990.0);

        let mut out = vec![0.0; 100];
        playback.render(&mut state, 0, &record, 1010, 100, &mut out);
        // the span was reached during this block and the pointer restarted
        // from the newest sample of the block (1109)
        assert!(state.read_pointer() <= 1109.0);
        assert!(state.read_pointer() > 1000.0);
    }
}
