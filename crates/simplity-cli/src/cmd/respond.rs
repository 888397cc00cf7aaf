//! Implementation of `simplity respond --status <status>`.
//!
//! Assembles a service response envelope through the checked builder and
//! prints it as JSON. The envelope rules apply: a status other than
//! `completed` needs an error message, and only `completed` and
//! `completedWithErrors` may carry data.
//!
//! Exit codes:
//! - 0 = the envelope was printed
//! - 1 = the envelope breaks the envelope rules
//! - 2 = `--data` is not a JSON object, or the message catalog is unusable
use simplity_core::{
    DetailedMessage, MessageCatalog, ServerResponse, ServiceResponse, ServiceStatus, Vo,
};

use crate::cmd::Output;
use crate::error::CliError;
use crate::format::{FormatMode, write_message};

/// Arguments of one `respond` invocation.
#[derive(Debug)]
pub struct Args<'a> {
    /// Response status.
    pub status: ServiceStatus,
    /// Id of the error message to attach.
    pub message_id: Option<&'a str>,
    /// Field the message is about.
    pub field: Option<&'a str>,
    /// Run-time parameters of the message.
    pub params: &'a [String],
    /// Payload as JSON text.
    pub data: Option<&'a str>,
    /// Session id to echo.
    pub session_id: Option<&'a str>,
}

/// Runs the `respond` command.
///
/// # Errors
///
/// - [`CliError::InvalidArgument`] (exit 2) when `--data` is not an object.
/// - [`CliError::InvalidEnvelope`] (exit 1) when the builder rejects the
///   envelope.
pub fn run(args: &Args<'_>, catalog: &MessageCatalog, output: &Output) -> Result<(), CliError> {
    let response = build(args, catalog)?;

    if output.mode == FormatMode::Human {
        let stderr = std::io::stderr();
        let mut err_out = stderr.lock();
        for msg in response.response.messages() {
            write_message(&mut err_out, msg, output.mode, &output.config)
                .map_err(|e| CliError::write_failed("stderr", &e))?;
        }
    }

    let doc = serde_json::to_value(&response).map_err(|e| CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    })?;
    output.print_json(&doc)
}

/// Builds the server response described by `args`.
///
/// # Errors
///
/// As for [`run`].
pub fn build(args: &Args<'_>, catalog: &MessageCatalog) -> Result<ServerResponse, CliError> {
    let mut builder = ServiceResponse::builder(args.status);

    if let Some(id) = args.message_id {
        let mut msg = DetailedMessage::error(id, catalog.render(id, args.params));
        if let Some(field) = args.field {
            msg = msg.with_field_name(field);
        }
        if !args.params.is_empty() {
            msg = msg.with_params(args.params.to_vec());
        }
        builder = builder.message(msg);
    }

    if let Some(text) = args.data {
        builder = builder.data(parse_data(text)?);
    }

    let response = builder.build().map_err(CliError::InvalidEnvelope)?;
    tracing::debug!(status = %args.status, "assembled response");
    Ok(ServerResponse::new(
        response,
        args.session_id.map(str::to_owned),
    ))
}

fn parse_data(text: &str) -> Result<Vo, CliError> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(CliError::InvalidArgument {
            detail: format!("--data must be a JSON object, not {}", json_kind(&other)),
        }),
        Err(e) => Err(CliError::parse_failed("--data", &e)),
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
