//! Implementation of `simplity validate-value --schema <name> <value>`.
//!
//! Resolves the named value schema and validates one text value against it.
//! The [`ValueValidationResult`] is printed to stdout as JSON; in human mode
//! the rendered messages also go to stderr.
//!
//! Exit codes:
//! - 0 = valid
//! - 1 = invalid (including an unknown schema name)
//! - 2 = the schema or message catalog could not be read or loaded
use std::path::Path;
use std::time::Instant;

use simplity_core::{
    MessageCatalog, ValidationContext, ValueSchemas, ValueValidationResult, validate_named,
};

use crate::PathOrStdin;
use crate::cmd::{Output, load_messages};
use crate::error::CliError;
use crate::format::{FormatMode, write_message, write_timing};
use crate::io::read_input;

/// Arguments of one `validate-value` invocation.
#[derive(Debug)]
pub struct Args<'a> {
    /// Name of the value schema.
    pub schema: &'a str,
    /// Schema catalog source; the built-in schemas when `None`.
    pub schemas: Option<&'a PathOrStdin>,
    /// App message catalog.
    pub messages: Option<&'a Path>,
    /// The text to validate.
    pub value: &'a str,
}

/// Runs the `validate-value` command.
///
/// # Errors
///
/// - Input failures (exit 2) for unreadable or malformed catalogs.
/// - [`CliError::InvalidValue`] (exit 1) when the value is not valid.
pub fn run(
    args: &Args<'_>,
    ctx: &ValidationContext,
    max_file_size: u64,
    output: &Output,
) -> Result<(), CliError> {
    let start = Instant::now();
    let schemas = load_schemas(args.schemas, max_file_size)?;
    let catalog = load_messages(args.messages, max_file_size)?;

    let result = validate_named(&schemas, args.schema, args.value, ctx);
    tracing::debug!(
        schema = args.schema,
        valid = result.is_valid(),
        "validated value"
    );

    let doc = serde_json::to_value(&result).map_err(|e| CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    })?;
    output.print_json(&doc)?;

    if output.mode == FormatMode::Human {
        report_messages(&result, &catalog, args.schema, output)?;
    }
    let stderr = std::io::stderr();
    write_timing(&mut stderr.lock(), "validated", start.elapsed(), &output.config)
        .map_err(|e| CliError::write_failed("stderr", &e))?;

    if result.is_valid() {
        Ok(())
    } else {
        Err(CliError::InvalidValue)
    }
}

/// Loads the schema catalog from `source` on top of the built-in schemas.
///
/// # Errors
///
/// Returns a read error, [`CliError::ParseFailed`] for malformed JSON, or
/// [`CliError::SchemaLoad`] for a catalog that parses but cannot be loaded.
pub fn load_schemas(
    source: Option<&PathOrStdin>,
    max_file_size: u64,
) -> Result<ValueSchemas, CliError> {
    match source {
        None => Ok(ValueSchemas::with_system()),
        Some(src) => {
            let json = read_input(src, max_file_size)?;
            Ok(ValueSchemas::from_json_str(&json)?)
        }
    }
}

fn report_messages(
    result: &ValueValidationResult,
    catalog: &MessageCatalog,
    schema: &str,
    output: &Output,
) -> Result<(), CliError> {
    let stderr = std::io::stderr();
    let mut err_out = stderr.lock();
    for msg in result.messages() {
        let detailed = msg.to_detailed(catalog, Some(schema));
        write_message(&mut err_out, &detailed, output.mode, &output.config)
            .map_err(|e| CliError::write_failed("stderr", &e))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
