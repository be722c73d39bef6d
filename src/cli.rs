//! uniqseq - Command-line surface
//!
//! Argument parsing and the framing concerns the core deliberately knows
//! nothing about: record delimiting, byte-mode display, and shelling out
//! to an external `--hash-transform` command.

use std::io::{Read, Write};
use std::process::{Command, Stdio};

use argh::FromArgs;
use regex::Regex;

use crate::error::{ConfigError, TransformError};

/// uniqseq - streaming multi-line sequence deduplicator
#[derive(FromArgs)]
pub struct Args {
    /// path to the input file, or "-"/omitted for stdin
    #[argh(positional, default = "String::from(\"-\")")]
    pub input: String,

    /// matched-sequence length N (default 1)
    #[argh(option, short = 'w', default = "1")]
    pub window_size: u64,

    /// prefix bytes to strip before fingerprinting (default 0)
    #[argh(option, short = 's', default = "0")]
    pub skip_chars: usize,

    /// emit only suppressed records instead of survivors
    #[argh(switch, short = 'i')]
    pub inverse: bool,

    /// only records matching this pattern are tracked for matching
    #[argh(option)]
    pub track: Option<String>,

    /// records matching this pattern are bypassed (passed through, never matched)
    #[argh(option)]
    pub bypass: Option<String>,

    /// shell command that transforms a record's bytes on stdin into a fingerprint on stdout
    #[argh(option)]
    pub hash_transform: Option<String>,

    /// record delimiter (default "\n")
    #[argh(option, default = "String::from(\"\\n\")")]
    pub delimiter: String,

    /// record delimiter as hex bytes, overrides --delimiter
    #[argh(option)]
    pub delimiter_hex: Option<String>,

    /// treat input as opaque bytes rather than UTF-8 text for filter patterns
    #[argh(switch, short = 'b')]
    pub byte_mode: bool,

    /// cap on concurrently tracked candidate matches (default 30)
    #[argh(option, default = "crate::config::DEFAULT_MAX_CANDIDATES")]
    pub max_candidates: usize,

    /// optional LRU bound on the seen-window index
    #[argh(option)]
    pub seen_window_capacity: Option<usize>,

    /// suppress the end-of-run summary line
    #[argh(switch, short = 'q')]
    pub quiet: bool,
}

/// Errors raised while interpreting CLI arguments, before any record is
/// processed. Distinct from `ConfigError` even though `ConflictingFilters`
/// overlaps, since a bad `--delimiter-hex` string has nothing to do with
/// `DedupConfig`.
#[derive(Debug)]
pub enum ArgsError {
    Config(ConfigError),
    InvalidTrackPattern(regex::Error),
    InvalidBypassPattern(regex::Error),
    InvalidDelimiterHex(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgsError::Config(e) => write!(f, "{}", e),
            ArgsError::InvalidTrackPattern(e) => write!(f, "invalid --track pattern: {}", e),
            ArgsError::InvalidBypassPattern(e) => write!(f, "invalid --bypass pattern: {}", e),
            ArgsError::InvalidDelimiterHex(s) => write!(f, "invalid --delimiter-hex value: {}", s),
        }
    }
}

impl std::error::Error for ArgsError {}

/// Resolve the raw delimiter bytes: `--delimiter-hex` wins over `--delimiter`.
pub fn resolve_delimiter(args: &Args) -> Result<Vec<u8>, ArgsError> {
    match &args.delimiter_hex {
        Some(hex) => parse_hex(hex).ok_or_else(|| ArgsError::InvalidDelimiterHex(hex.clone())),
        None => Ok(args.delimiter.as_bytes().to_vec()),
    }
}

fn parse_hex(hex: &str) -> Option<Vec<u8>> {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

/// Split `input` into records on `delimiter`, dropping one trailing empty
/// record if the input ends with a delimiter (matches `uniq`'s own
/// line-based convention rather than producing a spurious empty record).
pub fn split_records<'a>(input: &'a [u8], delimiter: &[u8]) -> Vec<&'a [u8]> {
    if delimiter.is_empty() || input.is_empty() {
        return vec![input];
    }

    let mut records = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + delimiter.len() <= input.len() {
        if &input[i..i + delimiter.len()] == delimiter {
            records.push(&input[start..i]);
            i += delimiter.len();
            start = i;
        } else {
            i += 1;
        }
    }
    records.push(&input[start..]);

    if records.last().map(|r: &&[u8]| r.is_empty()).unwrap_or(false) {
        records.pop();
    }
    records
}

/// Validate the mutual-exclusion rule between byte-mode and the filter
/// patterns: byte-mode input has no natural text encoding for a regex
/// filter to run against.
pub fn validate_args(args: &Args) -> Result<(), ArgsError> {
    if args.byte_mode && (args.track.is_some() || args.bypass.is_some()) {
        return Err(ArgsError::Config(ConfigError::ConflictingFilters));
    }
    Ok(())
}

pub fn compile_pattern(pattern: &Option<String>) -> Result<Option<Regex>, regex::Error> {
    pattern.as_deref().map(Regex::new).transpose()
}

/// Build a `TransformFn` that shells out to `command`, feeding it the
/// record on stdin and reading its fingerprint back from stdout.
pub fn spawn_transform_command(command: String) -> crate::config::TransformFn {
    Box::new(move |bytes: &[u8]| -> Result<Vec<u8>, TransformError> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(TransformError::Spawn)?;

        child
            .stdin
            .take()
            .expect("piped stdin")
            .write_all(bytes)
            .map_err(TransformError::Io)?;

        let mut output = Vec::new();
        child
            .stdout
            .take()
            .expect("piped stdout")
            .read_to_end(&mut output)
            .map_err(TransformError::Io)?;

        let status = child.wait().map_err(TransformError::Io)?;
        if !status.success() {
            return Err(TransformError::NonZeroExit(status));
        }
        if output.is_empty() {
            return Err(TransformError::EmptyOutput);
        }

        // Trim exactly one trailing newline, the common case for shell
        // utilities like `sha256sum` or `md5sum` piped through `cut`.
        if output.last() == Some(&b'\n') {
            output.pop();
        }
        Ok(output)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_default_newline_delimiter() {
        let args = default_args();
        assert_eq!(resolve_delimiter(&args).unwrap(), b"\n".to_vec());
    }

    #[test]
    fn delimiter_hex_overrides_delimiter() {
        let mut args = default_args();
        args.delimiter_hex = Some("0x00".to_string());
        assert_eq!(resolve_delimiter(&args).unwrap(), vec![0u8]);
    }

    #[test]
    fn invalid_delimiter_hex_is_rejected() {
        let mut args = default_args();
        args.delimiter_hex = Some("zz".to_string());
        assert!(resolve_delimiter(&args).is_err());
    }

    #[test]
    fn byte_mode_with_track_is_rejected() {
        let mut args = default_args();
        args.byte_mode = true;
        args.track = Some("foo".to_string());
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn split_records_drops_trailing_empty() {
        let records = split_records(b"a\nb\nc\n", b"\n");
        assert_eq!(records, vec![b"a".as_slice(), b"b", b"c"]);
    }

    #[test]
    fn split_records_keeps_no_trailing_delimiter_as_is() {
        let records = split_records(b"a\nb\nc", b"\n");
        assert_eq!(records, vec![b"a".as_slice(), b"b", b"c"]);
    }

    fn default_args() -> Args {
        Args {
            input: "-".to_string(),
            window_size: 1,
            skip_chars: 0,
            inverse: false,
            track: None,
            bypass: None,
            hash_transform: None,
            delimiter: "\n".to_string(),
            delimiter_hex: None,
            byte_mode: false,
            max_candidates: crate::config::DEFAULT_MAX_CANDIDATES,
            seen_window_capacity: None,
            quiet: false,
        }
    }
}
