//! Host sample width abstraction.
//!
//! Hosts hand the engine either single or double precision buffers. All
//! internal processing happens in `f32`; [`Sample`] converts at the edges.

/// A sample type the engine accepts at its input/output boundary.
///
/// # Example
///
/// ```rust
/// use darvaza_core::Sample;
///
/// fn peak<T: Sample>(block: &[T]) -> f32 {
///     block.iter().fold(0.0f32, |acc, s| acc.max(s.to_f32().abs()))
/// }
///
/// assert_eq!(peak(&[0.25f64, -0.5]), 0.5);
/// ```
pub trait Sample: Copy + Default + Send + 'static {
    /// Convert to the engine's internal precision.
    fn to_f32(self) -> f32;

    /// Convert from the engine's internal precision.
    fn from_f32(value: f32) -> Self;
}

impl Sample for f32 {
    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        value
    }
}

impl Sample for f64 {
    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        f64::from(value)
    }
}
