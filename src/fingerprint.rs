//! uniqseq - Fingerprint pipeline
//!
//! Pure, stateless per-record transformation: raw bytes in, a filter
//! verdict and a comparison fingerprint out. Two records with identical
//! fingerprints are equivalent for matching purposes regardless of their
//! raw bytes.

use regex::Regex;

use crate::error::TransformError;

/// Filter verdict: whether a record participates in window matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Participates in candidate matching and can be suppressed.
    Tracked,
    /// Passed through as-is; never matched, never suppressed.
    Bypassed,
}

/// A comparison key derived from a record. Compared for equality only.
pub type Fingerprint = Vec<u8>;

/// Computes `(Verdict, Fingerprint)` for a raw record.
///
/// Contract: pure and deterministic per record, no state carried between
/// calls.
pub struct FingerprintPipeline {
    track_pattern: Option<Regex>,
    bypass_pattern: Option<Regex>,
    skip_chars: usize,
    transform: Option<Box<dyn Fn(&[u8]) -> Result<Vec<u8>, TransformError>>>,
}

impl FingerprintPipeline {
    pub fn new(
        track_pattern: Option<Regex>,
        bypass_pattern: Option<Regex>,
        skip_chars: usize,
        transform: Option<Box<dyn Fn(&[u8]) -> Result<Vec<u8>, TransformError>>>,
    ) -> Self {
        Self {
            track_pattern,
            bypass_pattern,
            skip_chars,
            transform,
        }
    }

    /// Determine the filter verdict for a raw record.
    ///
    /// Track wins on match when both patterns are configured. Default with
    /// neither pattern set: Tracked.
    fn verdict(&self, raw: &[u8]) -> Verdict {
        let text = String::from_utf8_lossy(raw);

        if let Some(track) = &self.track_pattern {
            return if track.is_match(&text) {
                Verdict::Tracked
            } else {
                Verdict::Bypassed
            };
        }

        if let Some(bypass) = &self.bypass_pattern {
            return if bypass.is_match(&text) {
                Verdict::Bypassed
            } else {
                Verdict::Tracked
            };
        }

        Verdict::Tracked
    }

    /// Strip the configured prefix. Records shorter than `skip_chars`
    /// fingerprint as the empty string.
    fn skip<'a>(&self, raw: &'a [u8]) -> &'a [u8] {
        raw.get(self.skip_chars..).unwrap_or(&[])
    }

    /// Compute `(verdict, fingerprint)` for a raw record.
    ///
    /// BYPASSED records still get a fingerprint computed (harmless — it is
    /// simply never looked at by the candidate tracker) so callers don't
    /// need a separate code path.
    pub fn compute(&self, raw: &[u8]) -> Result<(Verdict, Fingerprint), TransformError> {
        let verdict = self.verdict(raw);
        let skipped = self.skip(raw);

        let fingerprint = match &self.transform {
            Some(f) => f(skipped)?,
            None => skipped.to_vec(),
        };

        Ok((verdict, fingerprint))
    }
}
