//! End-to-end scenarios over realistic record streams.

use regex::Regex;
use uniqseq::config::DedupConfig;
use uniqseq::dedup::Deduplicator;

fn run(config: DedupConfig, records: &[&[u8]]) -> Vec<Vec<u8>> {
    let mut dedup = Deduplicator::new(config).unwrap();
    let mut out: Vec<(u64, Vec<u8>)> = Vec::new();
    for r in records {
        dedup.process_record(r, &mut out).unwrap();
    }
    dedup.flush(&mut out).unwrap();
    out.into_iter().map(|(_, r)| r).collect()
}

fn texts(bufs: &[Vec<u8>]) -> Vec<&[u8]> {
    bufs.iter().map(|b| b.as_slice()).collect()
}

#[test]
fn three_line_repeat_normal_and_inverse() {
    let records: &[&[u8]] = &[b"A", b"B", b"C", b"A", b"B", b"C", b"D"];

    let normal = run(DedupConfig { window_size: 3, ..Default::default() }, records);
    assert_eq!(texts(&normal), vec![b"A".as_slice(), b"B", b"C", b"D"]);

    let inverse = run(
        DedupConfig { window_size: 3, inverse: true, ..Default::default() },
        records,
    );
    assert_eq!(texts(&inverse), vec![b"A".as_slice(), b"B", b"C"]);
}

#[test]
fn single_line_window_normal_and_inverse() {
    let records: &[&[u8]] = &[b"A", b"B", b"C", b"A", b"B", b"C", b"D"];

    let normal = run(DedupConfig { window_size: 1, ..Default::default() }, records);
    assert_eq!(texts(&normal), vec![b"A".as_slice(), b"B", b"C", b"D"]);

    let inverse = run(
        DedupConfig { window_size: 1, inverse: true, ..Default::default() },
        records,
    );
    assert_eq!(texts(&inverse), vec![b"A".as_slice(), b"B", b"C"]);
}

#[test]
fn timestamp_prefixed_error_trace_is_collapsed_preserving_original_bytes() {
    // `{:021}` zero-pads to exactly 21 characters — a fixed-width stand-in
    // timestamp prefix, without hand-counting digits.
    let ts = |n: u32| -> String { format!("{n:021}") };
    let block = |n: u32| -> Vec<Vec<u8>> {
        let prefix = ts(n);
        assert_eq!(prefix.len(), 21);
        vec![
            format!("{prefix}ERROR: build failed").into_bytes(),
            format!("{prefix}  at step compile").into_bytes(),
            format!("{prefix}  at step link").into_bytes(),
        ]
    };

    let mut records = block(0);
    records.extend(block(1));
    records.push(format!("{}DONE", ts(2)).into_bytes());

    let refs: Vec<&[u8]> = records.iter().map(|r| r.as_slice()).collect();

    let out = run(
        DedupConfig { window_size: 3, skip_chars: 21, ..Default::default() },
        &refs,
    );

    assert_eq!(out.len(), records.len() - 3);
    // The first block's original, timestamped bytes survive untouched.
    assert_eq!(out[0], records[0]);
    assert_eq!(out[1], records[1]);
    assert_eq!(out[2], records[2]);
    assert_eq!(out[3], records[6]);
}

#[test]
fn two_line_cycle_collapses_to_first_occurrence() {
    let records: &[&[u8]] = &[b"A", b"B", b"A", b"B", b"A", b"B"];
    let out = run(DedupConfig { window_size: 2, ..Default::default() }, records);
    assert_eq!(texts(&out), vec![b"A".as_slice(), b"B"]);
}

#[test]
fn interleaved_ten_line_blocks_second_pass_fully_suppressed() {
    let mut records: Vec<Vec<u8>> = Vec::new();
    for i in 0..10 {
        records.push(format!("A-{i}").into_bytes());
    }
    for i in 0..10 {
        records.push(format!("B-{i}").into_bytes());
    }
    let first_pass = records.clone();
    records.extend(first_pass.clone());

    let refs: Vec<&[u8]> = records.iter().map(|r| r.as_slice()).collect();
    let out = run(DedupConfig { window_size: 10, ..Default::default() }, &refs);

    assert_eq!(out.len(), 20);
    assert_eq!(out, first_pass);
}

#[test]
fn bypassed_records_never_matched_regardless_of_window_size() {
    let records: &[&[u8]] = &[b"X", b"Y", b"Z"];
    let track_pattern = Some(Regex::new("^E").unwrap());

    for window_size in [1, 2, 3, 10] {
        let normal = run(
            DedupConfig {
                window_size,
                track_pattern: track_pattern.clone(),
                ..Default::default()
            },
            records,
        );
        assert_eq!(texts(&normal), vec![b"X".as_slice(), b"Y", b"Z"]);

        let inverse = run(
            DedupConfig {
                window_size,
                inverse: true,
                track_pattern: track_pattern.clone(),
                ..Default::default()
            },
            records,
        );
        assert!(inverse.is_empty());
    }
}
