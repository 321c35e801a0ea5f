use clap::{Args, Subcommand};
use std::path::PathBuf;

use delimprims_frame::DelimiterPattern;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod deframe;
pub mod frame;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Frame a payload with begin/end delimiters.
    Frame(FrameArgs),
    /// Extract delimited messages from a framed byte stream.
    Deframe(DeframeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Frame(args) => frame::run(args, format),
        Command::Deframe(args) => deframe::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Begin delimiter (escapes: \n, \r, \t, \0, \\, \xNN).
    #[arg(long, value_name = "BYTES")]
    pub begin: String,
    /// End delimiter (same escape syntax).
    #[arg(long, value_name = "BYTES")]
    pub end: String,
    /// Raw string payload.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read payload from file. Defaults to stdin when neither is given.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DeframeArgs {
    /// Delimiter pattern as BEGIN=END (repeatable; list order breaks ties).
    #[arg(long = "pattern", value_name = "BEGIN=END", required = true)]
    pub patterns: Vec<String>,
    /// Read the framed stream from a file instead of stdin.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Maximum message size in bytes (0 = unbounded).
    #[arg(long, value_name = "BYTES", default_value = "0")]
    pub max_size: usize,
    /// Exit after extracting N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Decode a delimiter given on the command line into raw bytes.
pub(crate) fn unescape_delimiter(input: &str) -> CliResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let Some(&escape) = bytes.get(i + 1) else {
            return Err(CliError::new(
                USAGE,
                format!("trailing backslash in delimiter: {input}"),
            ));
        };

        let (byte, advance) = match escape {
            b'n' => (b'\n', 2),
            b'r' => (b'\r', 2),
            b't' => (b'\t', 2),
            b'0' => (b'\0', 2),
            b'\\' => (b'\\', 2),
            b'x' => {
                let value = bytes
                    .get(i + 2..i + 4)
                    .and_then(|hex| std::str::from_utf8(hex).ok())
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                    .ok_or_else(|| {
                        CliError::new(USAGE, format!("invalid \\x escape in delimiter: {input}"))
                    })?;
                (value, 4)
            }
            other => {
                return Err(CliError::new(
                    USAGE,
                    format!("unsupported escape \\{} in delimiter", char::from(other)),
                ));
            }
        };

        out.push(byte);
        i += advance;
    }

    if out.is_empty() {
        return Err(CliError::new(USAGE, "delimiter must not be empty"));
    }

    Ok(out)
}

/// Parse a `BEGIN=END` pattern argument.
pub(crate) fn parse_pattern(spec: &str) -> CliResult<DelimiterPattern> {
    let Some((begin, end)) = spec.split_once('=') else {
        return Err(CliError::new(
            USAGE,
            format!("pattern must be BEGIN=END: {spec}"),
        ));
    };
    Ok(DelimiterPattern::new(
        unescape_delimiter(begin)?,
        unescape_delimiter(end)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_plain_text() {
        assert_eq!(unescape_delimiter("<<").unwrap(), b"<<");
    }

    #[test]
    fn unescape_named_escapes() {
        assert_eq!(unescape_delimiter("\\r\\n").unwrap(), b"\r\n");
        assert_eq!(unescape_delimiter("\\t").unwrap(), b"\t");
        assert_eq!(unescape_delimiter("\\0").unwrap(), b"\0");
        assert_eq!(unescape_delimiter("\\\\").unwrap(), b"\\");
    }

    #[test]
    fn unescape_hex_escapes() {
        assert_eq!(unescape_delimiter("\\x02").unwrap(), vec![0x02]);
        assert_eq!(unescape_delimiter("\\x02stx").unwrap(), b"\x02stx");
        assert_eq!(unescape_delimiter("\\xFF").unwrap(), vec![0xFF]);
    }

    #[test]
    fn unescape_rejects_bad_input() {
        assert_eq!(unescape_delimiter("").unwrap_err().code, USAGE);
        assert_eq!(unescape_delimiter("x\\").unwrap_err().code, USAGE);
        assert_eq!(unescape_delimiter("\\q").unwrap_err().code, USAGE);
        assert_eq!(unescape_delimiter("\\x2").unwrap_err().code, USAGE);
        assert_eq!(unescape_delimiter("\\xzz").unwrap_err().code, USAGE);
    }

    #[test]
    fn parse_pattern_splits_on_first_equals() {
        let pattern = parse_pattern("<<=>>").unwrap();
        assert_eq!(pattern.begin, b"<<");
        assert_eq!(pattern.end, b">>");
    }

    #[test]
    fn parse_pattern_with_escapes() {
        let pattern = parse_pattern("\\x02=\\x03").unwrap();
        assert_eq!(pattern.begin, vec![0x02]);
        assert_eq!(pattern.end, vec![0x03]);
    }

    #[test]
    fn parse_pattern_rejects_missing_separator() {
        assert_eq!(parse_pattern("nodelim").unwrap_err().code, USAGE);
    }
}
