//! uniqseq - Detector configuration
//!
//! All knobs are per-instance; there is no global state shared across
//! `Deduplicator` instances.

use regex::Regex;

use crate::error::ConfigError;

/// Default cap on active candidates.
pub const DEFAULT_MAX_CANDIDATES: usize = 30;

/// An external fingerprint transform: raw bytes in, fingerprint bytes out.
/// Boxed so the CLI can supply a subprocess-backed closure without the core
/// knowing anything about `std::process`.
pub type TransformFn = Box<dyn Fn(&[u8]) -> Result<Vec<u8>, crate::error::TransformError>>;

/// Constructor parameters for a `Deduplicator`.
///
/// `delimiter` and `byte_mode` are deliberately absent: both are framing
/// concerns owned by the CLI layer, never seen by the core.
pub struct DedupConfig {
    /// The matched-sequence length N. Must be >= 1.
    pub window_size: u64,
    /// Prefix bytes stripped before fingerprinting.
    pub skip_chars: usize,
    /// Flip normal vs inverse emission.
    pub inverse: bool,
    /// If set, only records matching this pattern are TRACKED.
    pub track_pattern: Option<Regex>,
    /// If set, records matching this pattern are BYPASSED (track wins on match).
    pub bypass_pattern: Option<Regex>,
    /// Optional external fingerprint transform.
    pub hash_transform: Option<TransformFn>,
    /// The cap on active candidates. Must be >= 1.
    pub max_candidates: usize,
    /// Optional LRU bound on the seen-window index, for callers that want
    /// memory use capped on very long streams.
    pub seen_window_capacity: Option<usize>,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            window_size: 1,
            skip_chars: 0,
            inverse: false,
            track_pattern: None,
            bypass_pattern: None,
            hash_transform: None,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            seen_window_capacity: None,
        }
    }
}

impl DedupConfig {
    /// Validate the configuration before any record is consumed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size < 1 {
            return Err(ConfigError::ZeroWindowSize);
        }
        if self.max_candidates < 1 {
            return Err(ConfigError::ZeroMaxCandidates);
        }
        Ok(())
    }
}
