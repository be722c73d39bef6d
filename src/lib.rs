//! uniqseq — streaming multi-line sequence deduplicator.
//!
//! Detects and suppresses repeated runs of N consecutive records in a
//! single forward pass over a stream, with memory bounded independently
//! of stream length. See [`dedup::Deduplicator`] for the public API.

pub mod candidate;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod emit;
pub mod error;
pub mod fifo;
pub mod fingerprint;
pub mod seen;
