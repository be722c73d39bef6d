//! uniqseq - Emission controller
//!
//! Decides, for each record sitting at the front of the positional FIFO,
//! whether its fate is final yet, and if so whether to write it to the
//! sink. Seen-window registration is *not* done here — it happens at
//! ingestion time in the facade, since gating it on emission finality
//! would lag registration behind the very candidates it needs to unblock
//! (see `dedup::IngestRun`).

use crate::candidate::CandidateTracker;
use crate::fifo::PositionalFifo;

/// Destination for surviving records, in strictly increasing position
/// order. Kept as a trait (rather than a concrete `io::Write` parameter)
/// so tests can collect into a plain `Vec` without framing concerns.
pub trait Sink {
    fn emit(&mut self, position: u64, record: &[u8]);
}

/// Collects `(position, record)` pairs — used by tests and by callers
/// that want the result in memory rather than streamed to a writer.
impl Sink for Vec<(u64, Vec<u8>)> {
    fn emit(&mut self, position: u64, record: &[u8]) {
        self.push((position, record.to_vec()));
    }
}

/// Decides finality and suppression for buffered records.
pub struct EmissionController {
    inverse: bool,
    window_size: u64,
}

impl EmissionController {
    pub fn new(inverse: bool, window_size: u64) -> Self {
        Self { inverse, window_size }
    }

    /// Drain every record from the front of `fifo` whose emission decision
    /// is final, given the position of the next record about to be
    /// ingested (or `None` once input has ended — see `flush`).
    pub fn drain_finalized(
        &mut self,
        fifo: &mut PositionalFifo,
        candidates: &CandidateTracker,
        next_incoming_position: Option<u64>,
        sink: &mut impl Sink,
    ) {
        loop {
            let Some(front) = fifo.peek_front() else {
                return;
            };
            let p = front.position;

            let final_now = match next_incoming_position {
                None => true, // flush: no more input, everything is final
                Some(next) => {
                    next >= p + self.window_size && candidates.oldest_start().is_none_or_gt(p)
                }
            };

            if !final_now {
                return;
            }

            let entry = fifo.pop_front().expect("peeked entry must exist");
            let suppressed = candidates.is_suppressed(entry.position);

            let emit = if self.inverse { suppressed } else { !suppressed };
            if emit {
                sink.emit(entry.position, &entry.raw);
            }
        }
    }
}

/// Small helper trait to express "no candidate with start <= p remains",
/// spelled as "every live candidate's start is strictly greater than p,
/// or there are none at all".
trait OldestStartExt {
    fn is_none_or_gt(self, p: u64) -> bool;
}

impl OldestStartExt for Option<u64> {
    fn is_none_or_gt(self, p: u64) -> bool {
        match self {
            None => true,
            Some(oldest) => oldest > p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fifo::PendingEntry;
    use crate::fingerprint::Verdict;

    fn push_entry(fifo: &mut PositionalFifo, position: u64, raw: &[u8], fp: &[u8], verdict: Verdict) {
        fifo.push(PendingEntry {
            position,
            raw: raw.to_vec(),
            fingerprint: fp.to_vec(),
            verdict,
        });
    }

    #[test]
    fn finalizes_and_emits_non_suppressed_records_in_normal_mode() {
        let mut fifo = PositionalFifo::new();
        let candidates = CandidateTracker::new(30, 2);
        let mut ctrl = EmissionController::new(false, 2);

        push_entry(&mut fifo, 0, b"A", b"A", Verdict::Tracked);
        push_entry(&mut fifo, 1, b"B", b"B", Verdict::Tracked);

        let mut out: Vec<(u64, Vec<u8>)> = Vec::new();
        ctrl.drain_finalized(&mut fifo, &candidates, Some(2), &mut out);

        assert_eq!(out, vec![(0, b"A".to_vec()), (1, b"B".to_vec())]);
    }

    #[test]
    fn waits_for_lookahead_before_emitting() {
        let mut fifo = PositionalFifo::new();
        let candidates = CandidateTracker::new(30, 3);
        let mut ctrl = EmissionController::new(false, 3);

        push_entry(&mut fifo, 0, b"A", b"A", Verdict::Tracked);
        let mut out: Vec<(u64, Vec<u8>)> = Vec::new();
        // Only one record ingested so far — can't look N-1=2 ahead yet.
        ctrl.drain_finalized(&mut fifo, &candidates, Some(1), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn inverse_mode_emits_only_suppressed() {
        let mut fifo = PositionalFifo::new();
        let mut candidates = CandidateTracker::new(30, 1);
        let mut seen = crate::seen::SeenWindowIndex::unbounded();
        seen.register(crate::seen::WindowKey::new(vec![b"A".to_vec()]), 0);
        candidates.on_record(5, &b"A".to_vec(), Verdict::Tracked, &mut seen);
        assert!(candidates.is_suppressed(5));

        let mut ctrl = EmissionController::new(true, 1);
        push_entry(&mut fifo, 5, b"A", b"A", Verdict::Tracked);
        let mut out: Vec<(u64, Vec<u8>)> = Vec::new();
        ctrl.drain_finalized(&mut fifo, &candidates, Some(6), &mut out);
        assert_eq!(out, vec![(5, b"A".to_vec())]);
    }

    #[test]
    fn flush_emits_everything_remaining() {
        let mut fifo = PositionalFifo::new();
        let candidates = CandidateTracker::new(30, 3);
        let mut ctrl = EmissionController::new(false, 3);

        push_entry(&mut fifo, 0, b"A", b"A", Verdict::Tracked);
        let mut out: Vec<(u64, Vec<u8>)> = Vec::new();
        ctrl.drain_finalized(&mut fifo, &candidates, None, &mut out);
        assert_eq!(out, vec![(0, b"A".to_vec())]);
    }
}
