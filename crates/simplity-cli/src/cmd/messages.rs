//! Implementation of `simplity messages`.
//!
//! Lists the built-in message ids with their templates. Human mode prints an
//! aligned table; JSON mode prints one object mapping id to template.
use std::io::Write as _;

use simplity_core::SystemMessage;

use crate::cmd::Output;
use crate::error::CliError;
use crate::format::FormatMode;

/// Runs the `messages` command.
///
/// # Errors
///
/// Returns [`CliError::IoError`] if stdout cannot be written.
pub fn run(output: &Output) -> Result<(), CliError> {
    match output.mode {
        FormatMode::Json => output.print_json(&catalog_json()),
        FormatMode::Human => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for line in table_lines() {
                writeln!(out, "{line}").map_err(|e| CliError::write_failed("stdout", &e))?;
            }
            Ok(())
        }
    }
}

/// One line per message: the id padded to a common width, then the template.
fn table_lines() -> Vec<String> {
    let width = SystemMessage::ALL
        .iter()
        .map(|m| m.id().len())
        .max()
        .unwrap_or_default();
    SystemMessage::ALL
        .iter()
        .map(|m| format!("{:<width$}  {}", m.id(), m.text()))
        .collect()
}

fn catalog_json() -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = SystemMessage::ALL
        .iter()
        .map(|m| (m.id().to_owned(), serde_json::Value::from(m.text())))
        .collect();
    serde_json::Value::Object(map)
}
