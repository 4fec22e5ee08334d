//! Tempo-synced wavetable gates.
//!
//! Every channel owns a [`WaveTable`] oscillator whose bipolar output is
//! mapped to a unipolar gain (`peek * 0.5 + 0.5`). Channels are split into
//! two groups: even indices (0, 2, ...) form the *odd* group and follow the
//! odd gate speed, odd indices form the *even* group. Linking the groups
//! forces the even group onto the odd speed and aligns each even-group
//! oscillator's phase with its left neighbour.
//!
//! With randomization active each group flips between its configured
//! subdivision and double that subdivision every half measure, counted per
//! group from the measure position at which randomization was switched on.

use darvaza_core::{
    MeasureClock, TABLE_SIZE, TablePool, WaveTable, Waveform, gate_subdivision,
    gate_subdivision_index,
};

/// Speed state for one channel group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateGroup {
    steps: f32,
    doubled: bool,
    counter: usize,
    frequency: f32,
}

impl GateGroup {
    fn new(steps: f32) -> Self {
        Self {
            steps,
            doubled: false,
            counter: 0,
            frequency: 0.0,
        }
    }

    /// Normalized subdivision control this group was set to.
    pub fn steps(&self) -> f32 {
        self.steps
    }

    /// Cycles per measure currently in effect.
    pub fn subdivision(&self) -> f32 {
        let base = gate_subdivision(self.steps);
        if self.doubled { base * 2.0 } else { base }
    }

    /// True while randomization has doubled this group's speed.
    pub fn is_doubled(&self) -> bool {
        self.doubled
    }

    /// Oscillator frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    fn refresh(&mut self, clock: &MeasureClock) {
        self.frequency = clock.subdivision_frequency(self.subdivision());
    }

    /// Count one sample; flip the doubling at the half-measure mark.
    fn tick(&mut self, half_measure: usize, clock: &MeasureClock) {
        self.counter += 1;
        if self.counter >= half_measure {
            self.counter = 0;
            self.doubled = !self.doubled;
            self.refresh(clock);
        }
    }
}

/// Per-channel gate oscillators and their speed settings.
///
/// # Example
///
/// ```rust
/// use darvaza_core::{MeasureClock, TablePool};
/// use darvaza_engine::GateEngine;
///
/// let pool = TablePool::with_canonical_tables(44100.0);
/// let clock = MeasureClock::new(44100.0);
/// let mut gates = GateEngine::new(&pool, 2, 44100.0);
///
/// // one cycle per measure on both groups
/// gates.set_gate_speed(2.0 / 11.0, 0.0, true, &clock);
/// assert_eq!(gates.odd().frequency(), 0.5);
/// assert_eq!(gates.even().frequency(), 0.5);
///
/// let level = gates.envelope(0);
/// assert!((0.0..=1.0).contains(&level));
/// ```
#[derive(Debug, Clone)]
pub struct GateEngine {
    tables: Vec<WaveTable>,
    waveform: Waveform,
    sample_rate: f32,
    odd: GateGroup,
    even: GateGroup,
    linked: bool,
    random_index: usize,
}

impl GateEngine {
    /// Create gates for `channels` channels from the pool's sine table.
    pub fn new(pool: &TablePool, channels: usize, sample_rate: f32) -> Self {
        let mut gates = Self {
            tables: Vec::with_capacity(channels),
            waveform: Waveform::Sine,
            sample_rate,
            odd: GateGroup::new(0.0),
            even: GateGroup::new(0.0),
            linked: false,
            random_index: 0,
        };
        gates.ensure_channels(channels, pool);
        gates
    }

    /// Grow to `channels` oscillators. Returns `true` if any were added.
    ///
    /// New oscillators start at phase zero, or at their left neighbour's
    /// phase when the groups are linked.
    pub fn ensure_channels(&mut self, channels: usize, pool: &TablePool) -> bool {
        if self.tables.len() >= channels {
            return false;
        }
        while self.tables.len() < channels {
            let channel = self.tables.len();
            let mut table = self.canonical(pool);
            table.set_frequency(self.group(channel).frequency);
            if self.linked && channel % 2 == 1 {
                table.set_accumulator(self.tables[channel - 1].accumulator());
            }
            self.tables.push(table);
        }
        true
    }

    /// Number of oscillators.
    pub fn channel_count(&self) -> usize {
        self.tables.len()
    }

    /// Select the gate shape from a normalized control.
    ///
    /// Oscillators keep their phase and speed. Returns `true` when the shape
    /// changed.
    pub fn set_waveform(&mut self, value: f32, pool: &TablePool) -> bool {
        let waveform = Waveform::from_normalized(value);
        if waveform == self.waveform {
            return false;
        }
        self.waveform = waveform;
        match pool.get_table(waveform) {
            Some(source) => {
                for table in &mut self.tables {
                    table.copy_cycle_from(source);
                }
            }
            None => {
                let source = WaveTable::generate(waveform, TABLE_SIZE, self.sample_rate);
                for table in &mut self.tables {
                    table.copy_cycle_from(&source);
                }
            }
        }
        true
    }

    /// Current gate shape.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Set both group speeds from normalized subdivision controls.
    ///
    /// When `linked`, the even group follows `odd_steps`. Switching the link
    /// on aligns each even-group phase with its left neighbour.
    pub fn set_gate_speed(
        &mut self,
        odd_steps: f32,
        even_steps: f32,
        linked: bool,
        clock: &MeasureClock,
    ) {
        let was_linked = self.linked;
        self.linked = linked;
        self.odd.steps = odd_steps;
        self.even.steps = if linked { odd_steps } else { even_steps };

        if linked && !was_linked {
            for channel in (1..self.tables.len()).step_by(2) {
                let accumulator = self.tables[channel - 1].accumulator();
                self.tables[channel].set_accumulator(accumulator);
            }
        }

        self.refresh(clock);
    }

    /// True when the groups are linked.
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Set the randomization control. The first step switches it off.
    ///
    /// Switching on starts both half-measure counters at the current measure
    /// position; switching off returns both groups to their base speed.
    pub fn randomize(&mut self, value: f32, clock: &MeasureClock) {
        let was_randomized = self.is_randomized();
        self.random_index = gate_subdivision_index(value);

        if self.is_randomized() && !was_randomized {
            let half = clock.half_measure_samples().max(1);
            let start = clock.position() % half;
            self.odd.counter = start;
            self.even.counter = start;
        } else if !self.is_randomized() && was_randomized {
            self.odd.doubled = false;
            self.even.doubled = false;
            self.refresh(clock);
        }
    }

    /// True while speed randomization is on.
    pub fn is_randomized(&self) -> bool {
        self.random_index > 0
    }

    /// Count one sample of randomization time. No-op while randomization is
    /// off.
    #[inline]
    pub fn advance_randomizer(&mut self, clock: &MeasureClock) {
        if !self.is_randomized() {
            return;
        }
        let half = clock.half_measure_samples().max(1);

        let odd_was = self.odd.doubled;
        self.odd.tick(half, clock);
        if self.odd.doubled != odd_was {
            Self::apply(&mut self.tables, 0, self.odd.frequency);
        }

        let even_was = self.even.doubled;
        self.even.tick(half, clock);
        if self.even.doubled != even_was {
            Self::apply(&mut self.tables, 1, self.even.frequency);
        }
    }

    /// Gate level for `channel` in `[0, 1]`; advances that oscillator.
    #[inline]
    pub fn envelope(&mut self, channel: usize) -> f32 {
        self.tables
            .get_mut(channel)
            .map_or(1.0, |table| table.peek() * 0.5 + 0.5)
    }

    /// Restart every oscillator at phase zero.
    pub fn reset(&mut self) {
        for table in &mut self.tables {
            table.set_accumulator(0.0);
        }
    }

    /// Recompute oscillator frequencies after a tempo change.
    pub fn refresh(&mut self, clock: &MeasureClock) {
        self.odd.refresh(clock);
        self.even.refresh(clock);
        Self::apply(&mut self.tables, 0, self.odd.frequency);
        Self::apply(&mut self.tables, 1, self.even.frequency);
    }

    /// Change the oscillators' sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for table in &mut self.tables {
            table.set_sample_rate(sample_rate);
        }
    }

    /// Odd group (channels 0, 2, ...).
    pub fn odd(&self) -> &GateGroup {
        &self.odd
    }

    /// Even group (channels 1, 3, ...).
    pub fn even(&self) -> &GateGroup {
        &self.even
    }

    /// Oscillator for `channel`.
    pub fn table(&self, channel: usize) -> Option<&WaveTable> {
        self.tables.get(channel)
    }

    fn group(&self, channel: usize) -> &GateGroup {
        if channel % 2 == 0 { &self.odd } else { &self.even }
    }

    fn canonical(&self, pool: &TablePool) -> WaveTable {
        let mut table = match pool.get_table(self.waveform) {
            Some(table) => table.clone(),
            None => WaveTable::generate(self.waveform, TABLE_SIZE, self.sample_rate),
        };
        table.set_sample_rate(self.sample_rate);
        table.set_accumulator(0.0);
        table
    }

    fn apply(tables: &mut [WaveTable], first: usize, frequency: f32) {
        for table in tables.iter_mut().skip(first).step_by(2) {
            table.set_frequency(frequency);
        }
    }
}
