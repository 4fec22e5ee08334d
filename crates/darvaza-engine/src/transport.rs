//! Host transport snapshot.

/// Play state and musical timing reported by the host for one block.
///
/// Passed to [`Processor::sync_transport`](crate::Processor::sync_transport)
/// before processing. A stop/start edge resets the pointers and gates, and
/// any edge clears the record ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportInfo {
    /// True while the host transport is rolling.
    pub playing: bool,
    /// Tempo in beats per minute.
    pub tempo: f32,
    /// Time signature numerator.
    pub numerator: u32,
    /// Time signature denominator.
    pub denominator: u32,
}

impl Default for TransportInfo {
    fn default() -> Self {
        Self::stopped(120.0, 4, 4)
    }
}

impl TransportInfo {
    /// A rolling transport.
    pub fn playing(tempo: f32, numerator: u32, denominator: u32) -> Self {
        Self {
            playing: true,
            tempo,
            numerator,
            denominator,
        }
    }

    /// A stopped transport.
    pub fn stopped(tempo: f32, numerator: u32, denominator: u32) -> Self {
        Self {
            playing: false,
            ..Self::playing(tempo, numerator, denominator)
        }
    }
}
