//! uniqseq - Seen-window index
//!
//! Maps a window fingerprint (the N fingerprints of a window, in order) to
//! the absolute position where it was first registered. Populated only by
//! the facade's ingestion tracking (`dedup::IngestRun`), never by the
//! candidate tracker itself — the tracker only reads this index to advance
//! or spawn candidates, it never writes to it.
//!
//! The N fingerprints are kept inline per window rather than behind a
//! second, global position→fingerprint log, so a candidate's expected next
//! fingerprint can be looked up directly.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::fingerprint::Fingerprint;

/// The ordered tuple of N consecutive fingerprints identifying a window.
/// Equality is structural: two windows match only if every fingerprint in
/// the tuple matches, in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowKey(Vec<Fingerprint>);

impl WindowKey {
    pub fn new(fingerprints: Vec<Fingerprint>) -> Self {
        Self(fingerprints)
    }

    /// The `(k+1)`-th fingerprint of this window (0-indexed).
    pub fn fingerprint_at(&self, k: usize) -> Option<&Fingerprint> {
        self.0.get(k)
    }

    pub fn first(&self) -> Option<&Fingerprint> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Lookup key for "does a window start with this fingerprint" spawning.
/// Kept separate from `WindowKey` since spawning only needs the first
/// fingerprint, not the whole tuple.
type FirstFingerprint = Fingerprint;

/// A seen window: its first-emit position plus the window's own
/// fingerprints (needed by the candidate tracker to advance phases).
#[derive(Debug, Clone)]
pub struct SeenWindow {
    pub first_emit_position: u64,
    pub key: WindowKey,
}

enum Backend {
    Unbounded(HashMap<FirstFingerprint, Vec<SeenWindow>>),
    Bounded(LruCache<WindowKey, SeenWindow>, HashMap<FirstFingerprint, Vec<WindowKey>>),
}

/// Maps `WindowKey -> first_emit_position`, with O(1)-ish spawn lookups by
/// first fingerprint. No removal is required for correctness; an optional
/// LRU bound trims entries not currently referenced by any live candidate,
/// for callers that want memory use capped on very long streams.
pub struct SeenWindowIndex {
    backend: Backend,
}

impl SeenWindowIndex {
    pub fn unbounded() -> Self {
        Self {
            backend: Backend::Unbounded(HashMap::new()),
        }
    }

    pub fn bounded(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            backend: Backend::Bounded(LruCache::new(cap), HashMap::new()),
        }
    }

    /// Register a newly completed window. Called only by `IngestRun` at
    /// ingestion time.
    pub fn register(&mut self, key: WindowKey, first_emit_position: u64) {
        let first = match key.first() {
            Some(f) => f.clone(),
            None => return,
        };

        match &mut self.backend {
            Backend::Unbounded(map) => {
                let entry = SeenWindow {
                    first_emit_position,
                    key: key.clone(),
                };
                map.entry(first).or_default().push(entry);
            }
            Backend::Bounded(cache, by_first) => {
                let entry = SeenWindow {
                    first_emit_position,
                    key: key.clone(),
                };
                if cache.put(key.clone(), entry).is_none() {
                    by_first.entry(first).or_default().push(key);
                }
            }
        }
    }

    /// All seen windows whose first fingerprint equals `fp`, used to spawn
    /// new candidates.
    pub fn windows_starting_with(&mut self, fp: &Fingerprint) -> Vec<WindowKey> {
        match &mut self.backend {
            Backend::Unbounded(map) => map
                .get(fp)
                .map(|v| v.iter().map(|w| w.key.clone()).collect())
                .unwrap_or_default(),
            Backend::Bounded(cache, by_first) => {
                let Some(keys) = by_first.get(fp) else {
                    return Vec::new();
                };
                keys.iter()
                    .filter(|k| cache.contains(k))
                    .cloned()
                    .collect()
            }
        }
    }

    /// Look up the `k`-th fingerprint of the window identified by `key`,
    /// touching the LRU recency if bounded.
    pub fn fingerprint_at(&mut self, key: &WindowKey, k: usize) -> Option<Fingerprint> {
        match &mut self.backend {
            Backend::Unbounded(map) => {
                let first = key.first()?;
                map.get(first)?
                    .iter()
                    .find(|w| &w.key == key)
                    .and_then(|w| w.key.fingerprint_at(k))
                    .cloned()
            }
            Backend::Bounded(cache, _) => cache.get(key).and_then(|w| w.key.fingerprint_at(k)).cloned(),
        }
    }
}
