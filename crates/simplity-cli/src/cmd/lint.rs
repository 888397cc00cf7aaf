//! Implementation of `simplity lint <file>`.
//!
//! Checks a value schema catalog with the SCH-* rules and emits diagnostics
//! to stderr, followed by a summary line.
//!
//! Exit codes:
//! - 0 = no errors (warnings allowed)
//! - 1 = at least one error-severity diagnostic
//! - 2 = the catalog is not JSON, or could not be read
use std::time::Instant;

use simplity_core::{LintConfig, LintResult, MessageCatalog, lint_catalog_str};

use crate::error::CliError;
use crate::cmd::Output;
use crate::format::{write_diagnostic, write_summary, write_timing};

/// Runs the `lint` command over `content`.
///
/// # Errors
///
/// - [`CliError::ParseFailed`] (exit 2) when `content` is not JSON.
/// - [`CliError::LintErrors`] (exit 1) when any rule reports an error.
pub fn run(
    content: &str,
    messages: &MessageCatalog,
    check_message_names: bool,
    output: &Output,
) -> Result<(), CliError> {
    let start = Instant::now();
    let result = lint(content, messages, check_message_names)?;

    let stderr = std::io::stderr();
    let mut err_out = stderr.lock();
    for diag in &result.diagnostics {
        write_diagnostic(&mut err_out, diag, output.mode, &output.config)
            .map_err(|e| CliError::write_failed("stderr", &e))?;
    }
    write_summary(
        &mut err_out,
        result.errors().count(),
        result.warnings().count(),
        output.mode,
        &output.config,
    )
    .map_err(|e| CliError::write_failed("stderr", &e))?;
    write_timing(&mut err_out, "linted", start.elapsed(), &output.config)
        .map_err(|e| CliError::write_failed("stderr", &e))?;

    if result.has_errors() {
        Err(CliError::LintErrors)
    } else {
        Ok(())
    }
}

/// Parses and lints `content` without printing anything.
///
/// # Errors
///
/// Returns [`CliError::ParseFailed`] when `content` is not JSON.
pub fn lint(
    content: &str,
    messages: &MessageCatalog,
    check_message_names: bool,
) -> Result<LintResult, CliError> {
    let config = LintConfig {
        check_message_names,
    };
    lint_catalog_str(content, messages, &config)
        .map_err(|e| CliError::parse_failed("schema catalog", &e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use simplity_core::LintRuleId;

    use super::*;
    use crate::format::{FormatMode, FormatterConfig};

    const CLEAN: &str = r#"{
        "qty": {"name": "qty", "valueType": "integer", "minValue": 1, "maxValue": 10},
        "zip": {"name": "zip", "valueType": "text", "regex": "^[0-9]{6}$"}
    }"#;

    const UNKNOWN_MESSAGE: &str = r#"{
        "zip": {"name": "zip", "valueType": "text", "messageName": "badZip"}
    }"#;

    fn quiet() -> Output {
        Output {
            mode: FormatMode::Human,
            config: FormatterConfig {
                colors: false,
                quiet: true,
                verbose: false,
            },
        }
    }

    #[test]
    fn clean_catalog_passes() {
        run(CLEAN, &MessageCatalog::new(), true, &quiet()).expect("clean");
    }

    #[test]
    fn inverted_bounds_fail_with_exit_1() {
        let content = r#"{"qty": {"name": "qty", "valueType": "integer", "minValue": 9, "maxValue": 2}}"#;
        let err = run(content, &MessageCatalog::new(), true, &quiet()).expect_err("errors");
        assert!(matches!(err, CliError::LintErrors));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn not_json_is_exit_2() {
        let err = run("{oops", &MessageCatalog::new(), true, &quiet()).expect_err("parse");
        assert!(matches!(err, CliError::ParseFailed { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unknown_message_is_only_a_warning() {
        let result = lint(UNKNOWN_MESSAGE, &MessageCatalog::new(), true).expect("lint");
        assert!(!result.has_errors());
        assert_eq!(result.by_rule(LintRuleId::Sch06).count(), 1);
        run(UNKNOWN_MESSAGE, &MessageCatalog::new(), true, &quiet()).expect("warnings pass");
    }

    #[test]
    fn message_check_can_be_disabled() {
        let result = lint(UNKNOWN_MESSAGE, &MessageCatalog::new(), false).expect("lint");
        assert!(result.is_empty());
    }

    #[test]
    fn app_messages_satisfy_the_message_check() {
        let mut messages = MessageCatalog::new();
        messages.insert("badZip", "not a zip code");
        let result = lint(UNKNOWN_MESSAGE, &messages, true).expect("lint");
        assert!(result.is_empty());
    }
}
