//! uniqseq - Error types for the detector core
//!
//! The core never retries: every failure here is either a configuration
//! mistake caught before the first record is processed, or a fatal failure
//! of the external fingerprint transform. Both are reported to the caller
//! and end the run.

use std::fmt;
use std::io;
use std::process::ExitStatus;

/// Raised by `DedupConfig::validate` before any record is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `window_size` must be at least 1.
    ZeroWindowSize,
    /// `max_candidates` must be at least 1.
    ZeroMaxCandidates,
    /// `--byte-mode` was combined with `--track`/`--bypass`; the CLI
    /// forbids this even though the core itself has no opinion.
    ConflictingFilters,
}

impl ConfigError {
    pub fn message(&self) -> &'static str {
        match self {
            ConfigError::ZeroWindowSize => "window_size must be >= 1",
            ConfigError::ZeroMaxCandidates => "max_candidates must be >= 1",
            ConfigError::ConflictingFilters => {
                "--byte-mode cannot be combined with --track or --bypass"
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ConfigError {}

/// Raised when the external fingerprint transform fails. Fatal to the run;
/// any output already emitted before this point remains valid.
#[derive(Debug)]
pub enum TransformError {
    /// The transform command could not be spawned.
    Spawn(io::Error),
    /// The transform exited with a non-zero status.
    NonZeroExit(ExitStatus),
    /// The transform produced no output for a non-empty input.
    EmptyOutput,
    /// I/O failure while feeding the transform or reading its output.
    Io(io::Error),
}

impl TransformError {
    pub fn message(&self) -> String {
        match self {
            TransformError::Spawn(e) => format!("failed to spawn hash-transform command: {}", e),
            TransformError::NonZeroExit(status) => {
                format!("hash-transform command exited with {}", status)
            }
            TransformError::EmptyOutput => "hash-transform command produced no output".to_string(),
            TransformError::Io(e) => format!("I/O error talking to hash-transform command: {}", e),
        }
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for TransformError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_messages() {
        assert_eq!(ConfigError::ZeroWindowSize.message(), "window_size must be >= 1");
        assert_eq!(ConfigError::ZeroMaxCandidates.message(), "max_candidates must be >= 1");
    }

    #[test]
    fn transform_error_display() {
        let e = TransformError::EmptyOutput;
        assert_eq!(e.to_string(), "hash-transform command produced no output");
    }
}
