/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `simplity` binary. Every
/// variant maps to a stable exit code (1 or 2) via [`CliError::exit_code`]:
///
/// - Exit code **2**: input failure. The tool could not read or parse its
///   input, so no validation ran.
/// - Exit code **1**: logical failure. The tool ran to completion and the
///   answer is "no": an invalid value, lint errors, or an envelope that
///   breaks the envelope rules.
use std::fmt;
use std::path::PathBuf;

use simplity_core::{ResponseError, SchemaError};

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `simplity` CLI can produce.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read a file.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// The input exceeds the configured `--max-file-size` limit.
    FileTooLarge {
        /// `"-"` for stdin, or the filesystem path.
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes; unknown for stdin.
        actual: Option<u64>,
    },

    /// The input bytes are not valid UTF-8.
    InvalidUtf8 {
        /// `"-"` for stdin, or the filesystem path.
        source: String,
        /// The byte offset of the first invalid byte sequence.
        byte_offset: usize,
    },

    /// An I/O error occurred while reading from stdin.
    StdinReadError {
        /// The underlying I/O error message.
        detail: String,
    },

    /// A generic I/O error not covered by the more specific variants above.
    IoError {
        /// `"-"` for stdin, `"stdout"`/`"stderr"`, or the filesystem path.
        source: String,
        /// The underlying I/O error message.
        detail: String,
    },

    /// An input is not the JSON document it should be.
    ParseFailed {
        /// What was being parsed, e.g. the file name.
        source: String,
        /// Parser message including line and column.
        detail: String,
    },

    /// A schema catalog parsed but could not be loaded.
    SchemaLoad(SchemaError),

    /// An argument value is unusable.
    InvalidArgument {
        /// Why.
        detail: String,
    },

    // --- Exit code 1: logical failures ---
    /// The value failed validation. The result has already been printed.
    InvalidValue,

    /// The lint found one or more errors. The diagnostics have already been
    /// printed.
    LintErrors,

    /// The requested envelope breaks the envelope rules.
    InvalidEnvelope(ResponseError),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::StdinReadError { .. }
            | Self::IoError { .. }
            | Self::ParseFailed { .. }
            | Self::SchemaLoad(_)
            | Self::InvalidArgument { .. } => 2,

            Self::InvalidValue | Self::LintErrors | Self::InvalidEnvelope(_) => 1,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: Some(actual),
            } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: None,
            } => {
                format!("error: file too large: {source} exceeded limit of {limit} bytes")
            }
            Self::InvalidUtf8 {
                source,
                byte_offset,
            } => {
                format!(
                    "error: invalid UTF-8 in {source}: first invalid byte at offset {byte_offset}"
                )
            }
            Self::StdinReadError { detail } => {
                format!("error: failed to read stdin: {detail}")
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error on {source}: {detail}")
            }
            Self::ParseFailed { source, detail } => {
                format!("error: {source} is not valid JSON: {detail}")
            }
            Self::SchemaLoad(e) => format!("error: {e}"),
            Self::InvalidArgument { detail } => format!("error: {detail}"),
            Self::InvalidValue => "error: the value is not valid".to_owned(),
            Self::LintErrors => "error: the schema catalog has one or more errors".to_owned(),
            Self::InvalidEnvelope(e) => format!("error: invalid response: {e}"),
        }
    }

    /// Wraps a JSON error raised while parsing `source`.
    pub fn parse_failed(source: &str, e: &serde_json::Error) -> Self {
        Self::ParseFailed {
            source: source.to_owned(),
            detail: format!("line {}, column {}: {e}", e.line(), e.column()),
        }
    }

    /// Wraps an error raised while writing to `stream`.
    pub fn write_failed(stream: &str, e: &std::io::Error) -> Self {
        Self::IoError {
            source: stream.to_owned(),
            detail: e.to_string(),
        }
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        match e {
            SchemaError::Parse(json) => Self::parse_failed("schema catalog", &json),
            SchemaError::InvalidRegex { .. } | SchemaError::NameMismatch { .. } => {
                Self::SchemaLoad(e)
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
