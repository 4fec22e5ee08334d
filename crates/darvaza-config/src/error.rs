//! Error types for configuration operations.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong with presets, settings and saved state.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A preset or settings file could not be read.
    #[error("cannot read '{path}': {source}")]
    ReadFile {
        /// File that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A preset or settings file could not be written.
    #[error("cannot write '{path}': {source}")]
    WriteFile {
        /// File that was written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The parent directory of a saved file could not be created.
    #[error("cannot create directory '{path}': {source}")]
    CreateDir {
        /// Directory that was created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML.
    #[error("invalid TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML encoding failed.
    #[error("cannot encode TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// No factory preset or file with this name.
    #[error("no such preset: {0}")]
    PresetNotFound(String),

    /// Binary state shorter than the fixed layout
    #[error("state too short: expected {expected} bytes, got {actual}")]
    TruncatedState {
        /// Bytes the layout needs.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },

    /// A parameter id or value was rejected.
    #[error("invalid parameter '{param}': {reason}")]
    InvalidParameter {
        /// Parameter id or assignment as given.
        param: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl ConfigError {
    /// Wrap a read failure for `path`.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Wrap a write failure for `path`.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Wrap a directory creation failure for `path`.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Reject `param` with a reason.
    pub fn invalid_parameter(param: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidParameter {
            param: param.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn not_found() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "mock")
    }

    #[test]
    fn test_read_error_keeps_path_and_source() {
        let err = ConfigError::read_file("/presets/choir.toml", not_found());
        let msg = err.to_string();
        assert!(msg.contains("cannot read"), "got: {msg}");
        assert!(msg.contains("/presets/choir.toml"), "got: {msg}");
        assert!(err.source().is_some(), "read errors carry the io::Error");
    }

    #[test]
    fn test_write_error_keeps_path() {
        let err = ConfigError::write_file("/out/settings.toml", not_found());
        assert!(
            matches!(err, ConfigError::WriteFile { ref path, .. } if path == std::path::Path::new("/out/settings.toml"))
        );
        assert!(err.to_string().contains("cannot write"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_create_dir_error_has_source() {
        let err = ConfigError::create_dir("/x", not_found());
        assert!(err.to_string().contains("cannot create directory"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_truncated_state_message() {
        let err = ConfigError::TruncatedState {
            expected: 52,
            actual: 12,
        };
        assert_eq!(err.to_string(), "state too short: expected 52 bytes, got 12");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_preset_not_found_message() {
        let err = ConfigError::PresetNotFound("my-preset".to_string());
        assert_eq!(err.to_string(), "no such preset: my-preset");
    }

    #[test]
    fn test_invalid_parameter_message() {
        let err = ConfigError::invalid_parameter("speed", "unknown parameter id");
        assert_eq!(err.to_string(), "invalid parameter 'speed': unknown parameter id");
        assert!(err.source().is_none());
    }
}
