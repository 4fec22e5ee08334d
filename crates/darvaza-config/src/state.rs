//! Binary state stream.
//!
//! Layout: the twelve parameter values as little-endian `f32` in
//! [`ParamId`] order, then the bypass flag as a little-endian `i32`
//! (positive is bypassed).

use crate::error::ConfigError;
use crate::params::{ParamId, Params};

/// Size of an encoded state in bytes.
pub const STATE_LEN: usize = ParamId::COUNT * 4 + 4;

impl Params {
    /// Encode as the binary state layout.
    ///
    /// # Example
    ///
    /// ```rust
    /// use darvaza_config::{Params, STATE_LEN};
    ///
    /// let bytes = Params::default().to_state_bytes();
    /// assert_eq!(bytes.len(), STATE_LEN);
    /// assert_eq!(Params::from_state_bytes(&bytes).ok(), Some(Params::default()));
    /// ```
    pub fn to_state_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(STATE_LEN);
        for value in self.values() {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.extend_from_slice(&i32::from(self.bypass).to_le_bytes());
        bytes
    }

    /// Decode the binary state layout. Values are clamped to `[0, 1]` and
    /// trailing bytes are ignored.
    pub fn from_state_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() < STATE_LEN {
            return Err(ConfigError::TruncatedState {
                expected: STATE_LEN,
                actual: bytes.len(),
            });
        }

        let mut words = bytes.chunks_exact(4).map(|chunk| {
            let mut word = [0u8; 4];
            word.copy_from_slice(chunk);
            word
        });

        let mut params = Params::default();
        for id in ParamId::ALL {
            if let Some(word) = words.next() {
                params.set(id, f32::from_le_bytes(word));
            }
        }
        params.bypass = words.next().is_some_and(|word| i32::from_le_bytes(word) > 0);
        Ok(params)
    }
}
