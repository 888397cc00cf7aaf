/// Diagnostic formatting: human-readable and JSON (NDJSON) modes.
///
/// Two kinds of findings reach stderr:
///
/// - lint [`Diagnostic`]s from `simplity lint`;
/// - rendered [`DetailedMessage`]s from `simplity validate-value` and
///   `simplity respond`.
///
/// In human mode each finding is one line, its severity tag color-coded.
/// Colors are disabled when `--no-color` is set, the `NO_COLOR` environment
/// variable is present (per <https://no-color.org>), or stderr is not a TTY.
/// In JSON mode each finding is a single-line JSON object.
///
/// A **quiet** flag suppresses everything but errors; a **verbose** flag adds
/// timing.
use std::io::{IsTerminal as _, Write};
use std::time::Duration;

use simplity_core::{AlertType, DetailedMessage, Diagnostic, Location, Severity};

// ---------------------------------------------------------------------------
// Color support detection
// ---------------------------------------------------------------------------

/// Returns `true` if ANSI color codes should be emitted to stderr.
pub fn colors_enabled(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stderr().is_terminal()
}

// ---------------------------------------------------------------------------
// ANSI escape sequences
// ---------------------------------------------------------------------------

const ANSI_RED: &str = "\x1b[31m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_CYAN: &str = "\x1b[36m";
const ANSI_GREEN: &str = "\x1b[32m";
const ANSI_RESET: &str = "\x1b[0m";

// ---------------------------------------------------------------------------
// FormatterConfig
// ---------------------------------------------------------------------------

/// Configuration for the formatter, derived from CLI flags.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Whether ANSI colors are enabled.
    pub colors: bool,
    /// Suppress all non-error stderr output.
    pub quiet: bool,
    /// Emit timing to stderr.
    pub verbose: bool,
}

impl FormatterConfig {
    /// Constructs a [`FormatterConfig`] from the raw CLI flags.
    pub fn from_flags(no_color_flag: bool, quiet: bool, verbose: bool) -> Self {
        Self {
            colors: colors_enabled(no_color_flag),
            quiet,
            verbose,
        }
    }
}

/// Output format selection, mirroring the CLI `--format` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    /// Human-readable, optionally colored output.
    Human,
    /// Structured NDJSON output.
    Json,
}

// ---------------------------------------------------------------------------
// Lint diagnostics
// ---------------------------------------------------------------------------

/// Writes a lint [`Diagnostic`] as one line.
///
/// Human format: `[E] SCH-03  schema "qty" field "regex": ...`
///
/// JSON format:
/// ```json
/// {"rule_id":"SCH-03","severity":"error","schema":"qty","field":"regex","message":"..."}
/// ```
///
/// Warnings are suppressed in quiet mode.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_diagnostic<W: Write>(
    writer: &mut W,
    diag: &Diagnostic,
    mode: FormatMode,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet && diag.severity == Severity::Warning {
        return Ok(());
    }
    let (tag, color, severity) = match diag.severity {
        Severity::Error => ("[E]", ANSI_RED, "error"),
        Severity::Warning => ("[W]", ANSI_YELLOW, "warning"),
    };

    match mode {
        FormatMode::Human => {
            let tag = paint(tag, color, config);
            writeln!(
                writer,
                "{tag} {rule_id}  {location}: {message}",
                rule_id = diag.rule_id,
                location = diag.location,
                message = diag.message,
            )
        }
        FormatMode::Json => {
            let (schema, field) = match &diag.location {
                Location::Catalog => (None, None),
                Location::Schema { key, field } => (Some(key.as_str()), field.as_deref()),
            };
            let line = serde_json::json!({
                "rule_id": diag.rule_id.code(),
                "severity": severity,
                "schema": schema,
                "field": field,
                "message": diag.message,
            });
            writeln!(writer, "{line}")
        }
    }
}

/// Writes the closing summary line.
///
/// Human: `2 errors, 1 warning`. JSON: `{"summary":{"errors":2,"warnings":1}}`.
/// Suppressed in quiet mode.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_summary<W: Write>(
    writer: &mut W,
    errors: usize,
    warnings: usize,
    mode: FormatMode,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet {
        return Ok(());
    }
    match mode {
        FormatMode::Human => writeln!(
            writer,
            "{errors} {}, {warnings} {}",
            pluralize(errors, "error", "errors"),
            pluralize(warnings, "warning", "warnings"),
        ),
        FormatMode::Json => {
            let line = serde_json::json!({
                "summary": { "errors": errors, "warnings": warnings }
            });
            writeln!(writer, "{line}")
        }
    }
}

// ---------------------------------------------------------------------------
// Rendered messages
// ---------------------------------------------------------------------------

/// Writes a rendered [`DetailedMessage`] as one line.
///
/// Human format: `[E] qty: value may be at most 10 (_maxValue)`. JSON mode
/// writes the message's wire form. Non-error messages are suppressed in quiet
/// mode.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_message<W: Write>(
    writer: &mut W,
    msg: &DetailedMessage,
    mode: FormatMode,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet && !msg.is_error() {
        return Ok(());
    }
    match mode {
        FormatMode::Human => {
            let (tag, color) = match msg.message_type() {
                AlertType::Error => ("[E]", ANSI_RED),
                AlertType::Warning => ("[W]", ANSI_YELLOW),
                AlertType::Info => ("[I]", ANSI_CYAN),
                AlertType::Success => ("[S]", ANSI_GREEN),
            };
            let tag = paint(tag, color, config);
            match msg.field_name() {
                Some(field) => writeln!(writer, "{tag} {field}: {} ({})", msg.text(), msg.id()),
                None => writeln!(writer, "{tag} {} ({})", msg.text(), msg.id()),
            }
        }
        FormatMode::Json => {
            let line = serde_json::to_string(msg).map_err(std::io::Error::other)?;
            writeln!(writer, "{line}")
        }
    }
}

/// Writes timing information in verbose mode; a no-op otherwise.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_timing<W: Write>(
    writer: &mut W,
    label: &str,
    duration: Duration,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if !config.verbose {
        return Ok(());
    }
    writeln!(writer, "{label} in {}ms", duration.as_millis())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn paint(tag: &str, color: &str, config: &FormatterConfig) -> String {
    if config.colors {
        format!("{color}{tag}{ANSI_RESET}")
    } else {
        tag.to_owned()
    }
}

/// Returns the singular or plural form of `word` depending on `count`.
fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
