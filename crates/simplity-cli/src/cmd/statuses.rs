//! Implementation of `simplity statuses`.
//!
//! Lists every service status with its canonical description and whether it
//! may carry a payload.
use std::io::Write as _;

use simplity_core::ServiceStatus;

use crate::cmd::Output;
use crate::error::CliError;
use crate::format::FormatMode;

/// Runs the `statuses` command.
///
/// # Errors
///
/// Returns [`CliError::IoError`] if stdout cannot be written.
pub fn run(output: &Output) -> Result<(), CliError> {
    match output.mode {
        FormatMode::Json => output.print_json(&statuses_json()),
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

fn table_lines() -> Vec<String> {
    let width = ServiceStatus::ALL
        .iter()
        .map(|s| s.as_str().len())
        .max()
        .unwrap_or_default();
    ServiceStatus::ALL
        .iter()
        .map(|s| format!("{:<width$}  {}", s.as_str(), s.description()))
        .collect()
}

fn statuses_json() -> serde_json::Value {
    ServiceStatus::ALL
        .iter()
        .map(|s| {
            serde_json::json!({
                "status": s.as_str(),
                "description": s.description(),
                "allowsData": s.allows_data(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lists_every_status_in_order() {
        let lines = table_lines();
        assert_eq!(lines.len(), 10);
        assert!(lines[0].starts_with("completed "));
        assert!(lines[0].ends_with("Completed with success"));
        assert!(lines[9].starts_with("serverError"));
    }

    #[test]
    fn json_flags_payload_carrying_statuses() {
        let doc = statuses_json();
        let rows = doc.as_array().map(Vec::as_slice).unwrap_or_default();
        assert_eq!(rows.len(), 10);
        let with_data: Vec<&str> = rows
            .iter()
            .filter(|r| r["allowsData"] == true)
            .filter_map(|r| r["status"].as_str())
            .collect();
        assert_eq!(with_data, ["completed", "completedWithErrors"]);
    }
}
