//! uniqseq - streaming multi-line sequence deduplicator
//!
//! Reads records from a file or stdin, feeds them through
//! [`uniqseq::dedup::Deduplicator`] in order, and writes survivors (or, in
//! `--inverse` mode, the suppressed duplicates) to stdout.

use std::fs;
use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use uniqseq::cli::{self, Args};
use uniqseq::config::DedupConfig;
use uniqseq::dedup::Deduplicator;
use uniqseq::emit::Sink;

struct StdoutSink {
    writer: io::BufWriter<io::Stdout>,
    delimiter: Vec<u8>,
    emitted: u64,
}

impl Sink for StdoutSink {
    fn emit(&mut self, _position: u64, record: &[u8]) {
        self.emitted += 1;
        // Errors writing to stdout (e.g. a closed pipe) are not recoverable
        // mid-stream; match `uniq`'s own behavior of simply stopping.
        let _ = self.writer.write_all(record);
        let _ = self.writer.write_all(&self.delimiter);
    }
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("uniqseq: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: Args) -> Result<i32> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(e) = cli::validate_args(&args) {
        eprintln!("uniqseq: {}", e);
        return Ok(2);
    }

    let delimiter = match cli::resolve_delimiter(&args) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("uniqseq: {}", e);
            return Ok(2);
        }
    };

    let track_pattern = match cli::compile_pattern(&args.track) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("uniqseq: invalid --track pattern: {}", e);
            return Ok(2);
        }
    };
    let bypass_pattern = match cli::compile_pattern(&args.bypass) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("uniqseq: invalid --bypass pattern: {}", e);
            return Ok(2);
        }
    };

    let hash_transform = args.hash_transform.clone().map(cli::spawn_transform_command);

    let config = DedupConfig {
        window_size: args.window_size,
        skip_chars: args.skip_chars,
        inverse: args.inverse,
        track_pattern,
        bypass_pattern,
        hash_transform,
        max_candidates: args.max_candidates,
        seen_window_capacity: args.seen_window_capacity,
    };

    let mut dedup = match Deduplicator::new(config) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("uniqseq: {}", e);
            return Ok(2);
        }
    };

    let input_bytes = if args.input == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .with_context(|| "failed to read from stdin")?;
        buf
    } else {
        fs::read(&args.input).with_context(|| format!("failed to read {}", args.input))?
    };

    let records = cli::split_records(&input_bytes, &delimiter);
    let total_in = records.len() as u64;

    let mut sink = StdoutSink {
        writer: io::BufWriter::new(io::stdout()),
        delimiter: delimiter.clone(),
        emitted: 0,
    };

    for record in &records {
        dedup
            .process_record(record, &mut sink)
            .with_context(|| "hash-transform command failed")?;
    }
    dedup
        .flush(&mut sink)
        .with_context(|| "hash-transform command failed")?;
    sink.writer.flush().with_context(|| "failed to write output")?;

    if !args.quiet {
        info!(
            records_in = total_in,
            records_out = sink.emitted,
            suppressed = total_in.saturating_sub(sink.emitted),
            "uniqseq finished"
        );
    }

    Ok(0)
}
