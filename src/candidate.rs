//! uniqseq - Candidate tracker
//!
//! Tracks up to K in-progress "I might be in the middle of a repeat"
//! matches, each at its own phase offset, and the set of positions they
//! have claimed as suppressed. K is small by default (30), so a linear
//! scan for advance/evict is the right tool — no heap needed.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::fingerprint::{Fingerprint, Verdict};
use crate::seen::{SeenWindowIndex, WindowKey};

/// An in-progress potential match: the window that began at input
/// position `start_position` is matching through its `phase`-th record
/// (0 <= phase < N).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub start_position: u64,
    pub phase: usize,
}

/// A live candidate plus the window it is being matched against. The
/// window key is what lets us look up the expected next fingerprint
/// without a second, global position-indexed fingerprint log.
struct LiveCandidate {
    candidate: Candidate,
    key: WindowKey,
}

/// Set of active candidates plus the positions they have completed and
/// suppressed. A fixed-size bitmask sized to a known dataset length
/// doesn't fit an unbounded stream, so suppressed positions are tracked in
/// a sparse `HashSet<u64>` instead, pruned by the caller once a position's
/// emission decision is finalized.
pub struct CandidateTracker {
    candidates: Vec<LiveCandidate>,
    suppressed: HashSet<u64>,
    max_candidates: usize,
    window_size: u64,
}

impl CandidateTracker {
    pub fn new(max_candidates: usize, window_size: u64) -> Self {
        Self {
            candidates: Vec::new(),
            suppressed: HashSet::new(),
            max_candidates,
            window_size,
        }
    }

    /// Whether `position` was claimed as part of a completed duplicate
    /// window.
    pub fn is_suppressed(&self, position: u64) -> bool {
        self.suppressed.contains(&position)
    }

    /// Drop bookkeeping for a position once its emission decision is final
    /// and it has left the FIFO — keeps `suppressed` bounded to live work.
    pub fn forget(&mut self, position: u64) {
        self.suppressed.remove(&position);
    }

    /// The smallest `start_position` among live candidates, if any. Used
    /// by the emission controller's finality rule — a record can't be
    /// final while a candidate that started at or before it is still live.
    pub fn oldest_start(&self) -> Option<u64> {
        self.candidates.iter().map(|c| c.candidate.start_position).min()
    }

    pub fn active_count(&self) -> usize {
        self.candidates.len()
    }

    /// Advance, spawn, or kill candidates on arrival of a record.
    pub fn on_record(
        &mut self,
        position: u64,
        fingerprint: &Fingerprint,
        verdict: Verdict,
        seen: &mut SeenWindowIndex,
    ) {
        if verdict == Verdict::Bypassed {
            // Bypassed records break any multi-line match spanning them:
            // treat as an always-mismatching record for phase advancement,
            // resetting any candidate that expected its next match here.
            self.candidates.retain(|c| {
                c.candidate.start_position + c.candidate.phase as u64 + 1 != position
            });
            return;
        }

        let mut still_live = Vec::with_capacity(self.candidates.len());
        let mut newly_suppressed: Vec<(u64, u64)> = Vec::new();

        for live in self.candidates.drain(..) {
            let next_phase = live.candidate.phase + 1;
            let expected = seen.fingerprint_at(&live.key, next_phase);

            match expected {
                Some(exp) if &exp == fingerprint => {
                    if next_phase as u64 == self.window_size - 1 {
                        let start = position + 1 - self.window_size;
                        newly_suppressed.push((start, position));
                    } else {
                        still_live.push(LiveCandidate {
                            candidate: Candidate {
                                start_position: live.candidate.start_position,
                                phase: next_phase,
                            },
                            key: live.key,
                        });
                    }
                }
                _ => {
                    // Mismatch, or the expected fingerprint vanished (e.g.
                    // an LRU-bounded seen index evicted the window) — the
                    // candidate dies.
                }
            }
        }
        self.candidates = still_live;
        for (start, end) in newly_suppressed {
            for p in start..=end {
                self.suppressed.insert(p);
            }
        }

        // Spawn: does any seen window begin with this fingerprint?
        for key in seen.windows_starting_with(fingerprint) {
            if key.len() as u64 != self.window_size {
                continue;
            }

            if self.window_size == 1 {
                // A one-fingerprint window is already complete the instant
                // it is matched — there is no further record to advance
                // through (state diagram: SPAWNED can only reach COMPLETE
                // directly when the ADVANCING range 0<k<N-1 is empty).
                self.suppressed.insert(position);
                continue;
            }

            self.spawn(LiveCandidate {
                candidate: Candidate {
                    start_position: position,
                    phase: 0,
                },
                key,
            });
        }
    }

    fn spawn(&mut self, live: LiveCandidate) {
        if self
            .candidates
            .iter()
            .any(|c| c.candidate.start_position == live.candidate.start_position)
        {
            return; // a window can only start once per position, defensive no-op
        }

        if self.candidates.len() < self.max_candidates {
            self.candidates.push(live);
            return;
        }

        // Evict the candidate with the latest start_position; ties favor
        // the more advanced (larger phase) candidate, so older and
        // further-along matches survive over fresher ones.
        let evict_idx = self
            .candidates
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.candidate
                    .start_position
                    .cmp(&b.candidate.start_position)
                    .then(a.candidate.phase.cmp(&b.candidate.phase))
            })
            .map(|(i, _)| i);

        let Some(idx) = evict_idx else {
            self.candidates.push(live);
            return;
        };

        let incoming_is_latest = match live
            .candidate
            .start_position
            .cmp(&self.candidates[idx].candidate.start_position)
        {
            Ordering::Greater => true,
            Ordering::Equal => live.candidate.phase >= self.candidates[idx].candidate.phase,
            Ordering::Less => false,
        };

        if incoming_is_latest {
            // The new candidate is itself the one that would be evicted —
            // a fresh spawn loses the least, so simply drop it.
            return;
        }

        self.candidates[idx] = live;
    }
}
