//! Registry of canonical wavetables.
//!
//! A [`TablePool`] holds at most one [`WaveTable`] per [`Waveform`]. It is an
//! ordinary owned value: the engine builds one at construction and borrows
//! from it whenever a channel needs a fresh copy of a canonical cycle, and
//! tests can build their own without any shared state.
//!
//! Tables handed out by [`TablePool::get_table`] are the canonical
//! instances. Callers clone before giving a channel its own phase.

use crate::wavetable::{TABLE_SIZE, WaveTable, Waveform};

/// Owned store mapping each waveform kind to one canonical table.
///
/// # Example
///
/// ```rust
/// use darvaza_core::{TablePool, WaveTable, Waveform};
///
/// let mut pool = TablePool::new();
/// assert!(pool.set_table(Waveform::Sine, WaveTable::generate(Waveform::Sine, 512, 48000.0)));
/// // a kind is only ever registered once
/// assert!(!pool.set_table(Waveform::Sine, WaveTable::new(512, 48000.0)));
///
/// let per_channel = pool.get_table(Waveform::Sine).unwrap().clone();
/// assert_eq!(per_channel.len(), 512);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TablePool {
    tables: [Option<WaveTable>; 4],
}

impl TablePool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool holding all four canonical waveforms at [`TABLE_SIZE`].
    pub fn with_canonical_tables(sample_rate: f32) -> Self {
        let mut pool = Self::new();
        for waveform in Waveform::ALL {
            pool.set_table(
                waveform,
                WaveTable::generate(waveform, TABLE_SIZE, sample_rate),
            );
        }
        pool
    }

    /// Register `table` for `waveform`.
    ///
    /// Returns `false` and leaves the pool unchanged when a table for that
    /// kind already exists.
    pub fn set_table(&mut self, waveform: Waveform, table: WaveTable) -> bool {
        let slot = &mut self.tables[waveform.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(table);
        true
    }

    /// The canonical table for `waveform`, if registered.
    pub fn get_table(&self, waveform: Waveform) -> Option<&WaveTable> {
        self.tables[waveform.index()].as_ref()
    }

    /// True when a table for `waveform` is registered.
    pub fn has_table(&self, waveform: Waveform) -> bool {
        self.tables[waveform.index()].is_some()
    }

    /// Remove and return the table for `waveform`.
    pub fn remove_table(&mut self, waveform: Waveform) -> Option<WaveTable> {
        self.tables[waveform.index()].take()
    }

    /// Release every registered table.
    pub fn flush(&mut self) {
        for slot in &mut self.tables {
            *slot = None;
        }
    }

    /// Number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.iter().filter(|t| t.is_some()).count()
    }

    /// True when no table is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
