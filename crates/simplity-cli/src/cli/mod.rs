//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use simplity_core::ServiceStatus;

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// Output format for CLI commands.
///
/// `Human` emits colored diagnostics to stderr and plain text to stdout.
/// `Json` emits NDJSON diagnostics and JSON documents.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, optionally colored output (default).
    Human,
    /// Structured JSON / NDJSON output.
    Json,
}

/// Parses a service status by its wire name, e.g. `noSuchService`.
fn parse_status(s: &str) -> Result<ServiceStatus, String> {
    ServiceStatus::from_name(s).ok_or_else(|| {
        let known = ServiceStatus::ALL.map(ServiceStatus::as_str);
        format!("unknown status \"{s}\"; expected one of: {}", known.join(", "))
    })
}

/// All top-level subcommands exposed by the `simplity` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Validate one value against a value schema.
    ///
    /// Prints the validation result as JSON to stdout. Exits 0 when the value
    /// is valid and 1 when it is not.
    #[command(name = "validate-value")]
    ValidateValue {
        /// Name of the value schema, e.g. `_name`.
        #[arg(long)]
        schema: String,
        /// JSON file mapping schema names to schemas, or `-` for stdin.
        /// The built-in schemas are always available.
        #[arg(long, value_name = "FILE")]
        schemas: Option<PathOrStdin>,
        /// JSON file mapping message ids to templates.
        #[arg(long, value_name = "FILE")]
        messages: Option<PathBuf>,
        /// The text to validate.
        #[arg(value_name = "VALUE", allow_hyphen_values = true)]
        value: String,
    },

    /// Check a value schema catalog for mistakes.
    Lint {
        /// JSON file mapping schema names to schemas, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
        /// JSON file mapping message ids to templates, consulted for
        /// `messageName` references.
        #[arg(long, value_name = "FILE")]
        messages: Option<PathBuf>,
        /// Do not check `messageName` references.
        #[arg(long)]
        no_message_check: bool,
    },

    /// List the built-in messages.
    Messages,

    /// List the service statuses and their descriptions.
    Statuses,

    /// Assemble a service response envelope and print it as JSON.
    Respond {
        /// Response status, e.g. `completed` or `noSuchService`.
        #[arg(long, value_parser = parse_status)]
        status: ServiceStatus,
        /// Add an error message with this id.
        #[arg(long, value_name = "ID")]
        message_id: Option<String>,
        /// Field the message is about.
        #[arg(long, value_name = "FIELD", requires = "message_id")]
        field: Option<String>,
        /// Run-time parameter of the message (repeatable).
        #[arg(long, value_name = "PARAM", requires = "message_id")]
        param: Vec<String>,
        /// JSON object to attach as the payload.
        #[arg(long, value_name = "JSON")]
        data: Option<String>,
        /// Session id to echo in the response.
        #[arg(long)]
        session_id: Option<String>,
        /// JSON file mapping message ids to templates.
        #[arg(long, value_name = "FILE")]
        messages: Option<PathBuf>,
    },
}

/// Root CLI struct for the `simplity` binary.
#[derive(Parser)]
#[command(
    name = "simplity",
    version,
    about = "Simplity value validation CLI",
    long_about = "Command-line tool for the Simplity value validation contract.\n\
                  Validates values against value schemas, lints schema catalogs,\n\
                  and assembles service response envelopes."
)]
pub struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Output format: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Suppress all stderr output except errors.
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit debug logging and timing to stderr.
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Maximum input file size in bytes (default: 16 MiB).
    #[arg(
        long,
        global = true,
        env = "SIMPLITY_MAX_FILE_SIZE",
        default_value = "16777216"
    )]
    pub max_file_size: u64,

    /// Disable ANSI color codes in output.
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Date that date windows are relative to (`yyyy-mm-dd`; default: the
    /// current UTC date).
    #[arg(long, global = true, env = "SIMPLITY_TODAY", value_name = "DATE")]
    pub today: Option<NaiveDate>,
}
