//! Channel-major multichannel sample storage.
//!
//! [`AudioBuffer`] keeps every channel in one contiguous allocation, channel
//! after channel. The engine uses it in two roles:
//!
//! - the **record buffer**: long, addressed as a ring by a shared write pointer
//! - **scratch buffers** (pre-mix, dry copy, post-mix): one block long,
//!   rewritten every block
//!
//! Buffers only ever grow. [`AudioBuffer::ensure`] reallocates (dropping the
//! contents) when the requested shape is larger than the current one and
//! otherwise leaves storage untouched, so steady-state processing performs no
//! allocation.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Fixed-shape multichannel buffer, all channels the same length.
///
/// # Example
///
/// ```rust
/// use darvaza_core::AudioBuffer;
///
/// let mut buffer = AudioBuffer::new(2, 4);
/// buffer.channel_mut(1).copy_from_slice(&[0.1, 0.2, 0.3, 0.4]);
/// assert_eq!(buffer.channel(0), &[0.0; 4]);
/// assert_eq!(buffer.channel(1)[2], 0.3);
///
/// buffer.silence();
/// assert!(buffer.is_silent());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AudioBuffer {
    data: Vec<f32>,
    channels: usize,
    buffer_size: usize,
}

impl AudioBuffer {
    /// Create a zeroed buffer of `channels` x `buffer_size` samples.
    pub fn new(channels: usize, buffer_size: usize) -> Self {
        Self {
            data: vec![0.0; channels * buffer_size],
            channels,
            buffer_size,
        }
    }

    /// Number of channels.
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels
    }

    /// Samples per channel.
    #[inline]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// True when the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when the buffer already holds at least `channels` x `buffer_size`.
    #[inline]
    pub fn fits(&self, channels: usize, buffer_size: usize) -> bool {
        self.channels >= channels && self.buffer_size >= buffer_size
    }

    /// Grow to at least `channels` x `buffer_size`.
    ///
    /// Returns `true` when storage was recreated; the contents are then all
    /// zero. Never shrinks.
    pub fn ensure(&mut self, channels: usize, buffer_size: usize) -> bool {
        if self.fits(channels, buffer_size) {
            return false;
        }
        let channels = channels.max(self.channels);
        let buffer_size = buffer_size.max(self.buffer_size);
        *self = Self::new(channels, buffer_size);
        true
    }

    /// Samples of one channel.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= channel_count()`.
    #[inline]
    pub fn channel(&self, channel: usize) -> &[f32] {
        let start = channel * self.buffer_size;
        &self.data[start..start + self.buffer_size]
    }

    /// Mutable samples of one channel.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= channel_count()`.
    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        let start = channel * self.buffer_size;
        &mut self.data[start..start + self.buffer_size]
    }

    /// Write `samples` into `channel` starting at `start`, wrapping around
    /// the end of the channel.
    ///
    /// # Panics
    ///
    /// Panics if `samples` is longer than the channel.
    pub fn write_wrapped(&mut self, channel: usize, start: usize, samples: &[f32]) {
        let size = self.buffer_size;
        assert!(samples.len() <= size, "write longer than buffer");
        if size == 0 {
            return;
        }
        let start = start % size;
        let dest = self.channel_mut(channel);
        let first = samples.len().min(size - start);
        dest[start..start + first].copy_from_slice(&samples[..first]);
        let rest = samples.len() - first;
        dest[..rest].copy_from_slice(&samples[first..]);
    }

    /// Zero every sample.
    pub fn silence(&mut self) {
        self.data.fill(0.0);
    }

    /// True when every sample is exactly zero.
    pub fn is_silent(&self) -> bool {
        self.data.iter().all(|s| *s == 0.0)
    }
}
