/// Command module for the `simplity` CLI.
///
/// Each submodule implements one subcommand. The `run` function in each
/// module takes the parsed arguments and returns `Ok(())` on success or
/// a [`crate::error::CliError`] on failure.
use std::io::Write;
use std::path::Path;

use simplity_core::MessageCatalog;

use crate::OutputFormat;
use crate::error::CliError;
use crate::format::{FormatMode, FormatterConfig};
use crate::io::read_optional;

pub mod lint;
pub mod messages;
pub mod respond;
pub mod statuses;
pub mod validate_value;

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Where and how a command reports: the `--format` mode plus the formatter
/// flags.
#[derive(Debug, Clone)]
pub struct Output {
    /// Human or NDJSON.
    pub mode: FormatMode,
    /// Colors, quiet, verbose.
    pub config: FormatterConfig,
}

impl Output {
    /// Builds the output settings from the global CLI flags.
    pub fn new(format: OutputFormat, quiet: bool, verbose: bool, no_color: bool) -> Self {
        let mode = match format {
            OutputFormat::Human => FormatMode::Human,
            OutputFormat::Json => FormatMode::Json,
        };
        Self {
            mode,
            config: FormatterConfig::from_flags(no_color, quiet, verbose),
        }
    }

    /// Writes `doc` to stdout: pretty-printed in human mode, one line in
    /// JSON mode.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::IoError`] if stdout cannot be written.
    pub fn print_json(&self, doc: &serde_json::Value) -> Result<(), CliError> {
        let text = match self.mode {
            FormatMode::Human => serde_json::to_string_pretty(doc),
            FormatMode::Json => serde_json::to_string(doc),
        }
        .map_err(|e| CliError::IoError {
            source: "stdout".to_owned(),
            detail: e.to_string(),
        })?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "{text}").map_err(|e| CliError::write_failed("stdout", &e))
    }
}

// ---------------------------------------------------------------------------
// Shared loaders
// ---------------------------------------------------------------------------

/// Loads the message catalog: the system messages, overlaid with the app
/// messages in `path` if one is given.
///
/// # Errors
///
/// Returns a read error for `path`, or [`CliError::ParseFailed`] if the file
/// is not a JSON object of strings.
pub fn load_messages(path: Option<&Path>, max_size: u64) -> Result<MessageCatalog, CliError> {
    match read_optional(path, max_size)? {
        None => Ok(MessageCatalog::new()),
        Some(json) => MessageCatalog::from_json_str(&json)
            .map_err(|e| CliError::parse_failed("message catalog", &e)),
    }
}
