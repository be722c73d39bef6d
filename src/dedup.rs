//! uniqseq - Deduplicator facade
//!
//! Wires the fingerprint pipeline, FIFO, seen-window index, candidate
//! tracker, and emission controller together behind the two operations a
//! caller actually needs: feed one record in, flush at end of stream. Owns
//! the monotonic position counter — nothing downstream ever invents a
//! position.

use std::collections::VecDeque;

use crate::candidate::CandidateTracker;
use crate::config::DedupConfig;
use crate::emit::{EmissionController, Sink};
use crate::error::{ConfigError, TransformError};
use crate::fifo::{PendingEntry, PositionalFifo};
use crate::fingerprint::{Fingerprint, FingerprintPipeline, Verdict};
use crate::seen::{SeenWindowIndex, WindowKey};

/// Tracks the last `window_size` ingested TRACKED fingerprints, in
/// contiguous input-position order, and registers a window with the
/// seen-window index the instant one completes.
///
/// Registration happens at *ingestion*, not at emission: gating it on a
/// record's emission finality would lag registration behind the very
/// candidate spawns it needs to unblock, since emission finality for
/// position `p` itself requires looking `window_size - 1` records past
/// `p`. A window's identity is a fact about input content, independent
/// of whether any of its positions are later suppressed, so registering
/// eagerly (even for positions that turn out to be suppressed) is safe —
/// `first_emit_position` is informational only and never consulted by
/// matching.
struct IngestRun {
    entries: VecDeque<(u64, Fingerprint)>,
    window_size: u64,
}

impl IngestRun {
    fn new(window_size: u64) -> Self {
        Self {
            entries: VecDeque::new(),
            window_size,
        }
    }

    fn observe(&mut self, position: u64, verdict: Verdict, fingerprint: &Fingerprint, seen: &mut SeenWindowIndex) {
        if verdict == Verdict::Bypassed {
            self.entries.clear();
            return;
        }

        if let Some((last_pos, _)) = self.entries.back() {
            if last_pos + 1 != position {
                self.entries.clear();
            }
        }

        self.entries.push_back((position, fingerprint.clone()));
        while self.entries.len() as u64 > self.window_size {
            self.entries.pop_front();
        }

        if self.entries.len() as u64 == self.window_size {
            let first_position = self.entries.front().unwrap().0;
            let key = WindowKey::new(self.entries.iter().map(|(_, fp)| fp.clone()).collect());
            seen.register(key, first_position);
        }
    }
}

/// Streaming multi-line sequence deduplicator.
///
/// Construct once per stream with [`Deduplicator::new`], call
/// [`Deduplicator::process_record`] for every input record in order, and
/// [`Deduplicator::flush`] once after the last one.
pub struct Deduplicator {
    pipeline: FingerprintPipeline,
    fifo: PositionalFifo,
    seen: SeenWindowIndex,
    candidates: CandidateTracker,
    emitter: EmissionController,
    ingest_run: IngestRun,
    window_size: u64,
    next_position: u64,
    last_forgotten: u64,
}

impl Deduplicator {
    pub fn new(config: DedupConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let seen = match config.seen_window_capacity {
            Some(cap) => SeenWindowIndex::bounded(cap),
            None => SeenWindowIndex::unbounded(),
        };

        Ok(Self {
            pipeline: FingerprintPipeline::new(
                config.track_pattern,
                config.bypass_pattern,
                config.skip_chars,
                config.hash_transform,
            ),
            fifo: PositionalFifo::new(),
            seen,
            candidates: CandidateTracker::new(config.max_candidates, config.window_size),
            emitter: EmissionController::new(config.inverse, config.window_size),
            ingest_run: IngestRun::new(config.window_size),
            window_size: config.window_size,
            next_position: 0,
            last_forgotten: 0,
        })
    }

    /// Feed one record (without its line terminator) into the pipeline.
    /// May emit zero or more already-finalized records to `sink`.
    pub fn process_record(
        &mut self,
        record: &[u8],
        sink: &mut impl Sink,
    ) -> Result<(), TransformError> {
        let position = self.next_position;
        self.next_position += 1;

        let (verdict, fingerprint) = self.pipeline.compute(record)?;

        // Candidates advance/spawn using only windows registered from
        // *earlier* positions — this record hasn't contributed itself yet,
        // so it can never match against a window ending on itself.
        self.candidates.on_record(position, &fingerprint, verdict, &mut self.seen);
        self.ingest_run.observe(position, verdict, &fingerprint, &mut self.seen);

        self.fifo.push(PendingEntry {
            position,
            raw: record.to_vec(),
            fingerprint,
            verdict,
        });

        self.emitter.drain_finalized(&mut self.fifo, &self.candidates, Some(self.next_position), sink);
        self.forget_finalized();
        Ok(())
    }

    /// Flush every record still buffered once input has ended. Everything
    /// remaining in the FIFO is final by definition — there's no more
    /// input left to look ahead into.
    pub fn flush(&mut self, sink: &mut impl Sink) -> Result<(), TransformError> {
        self.emitter.drain_finalized(&mut self.fifo, &self.candidates, None, sink);
        self.forget_finalized();
        Ok(())
    }

    pub fn window_size(&self) -> u64 {
        self.window_size
    }

    /// Drop suppressed-position bookkeeping that has fallen behind the
    /// FIFO's front — it can no longer be queried once a position has
    /// left the FIFO, so there's no reason to keep it around.
    fn forget_finalized(&mut self) {
        let front = self.fifo.peek_front().map(|e| e.position).unwrap_or(self.next_position);
        for p in self.last_forgotten..front {
            self.candidates.forget(p);
        }
        self.last_forgotten = front;
    }
}
