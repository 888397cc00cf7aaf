mod cli;
mod cmd;
mod error;
mod format;
mod io;

use clap::Parser;
use simplity_core::ValidationContext;
use tracing_subscriber::EnvFilter;

pub use cli::{Cli, Command, OutputFormat, PathOrStdin};

use crate::cmd::Output;
use crate::error::CliError;

/// Environment variable holding a `tracing` filter directive, e.g. `debug`.
const LOG_ENV: &str = "SIMPLITY_LOG";

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else if cli.quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!(version = simplity_core::version(), "simplity starting");

    if let Err(e) = run(&cli) {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let output = Output::new(cli.format, cli.quiet, cli.verbose, cli.no_color);
    let max = cli.max_file_size;

    match &cli.command {
        Command::ValidateValue {
            schema,
            schemas,
            messages,
            value,
        } => {
            let ctx = match cli.today {
                Some(today) => ValidationContext::with_today(today),
                None => ValidationContext::new(),
            };
            let args = cmd::validate_value::Args {
                schema,
                schemas: schemas.as_ref(),
                messages: messages.as_deref(),
                value,
            };
            cmd::validate_value::run(&args, &ctx, max, &output)
        }
        Command::Lint {
            file,
            messages,
            no_message_check,
        } => {
            let content = io::read_input(file, max)?;
            let catalog = cmd::load_messages(messages.as_deref(), max)?;
            cmd::lint::run(&content, &catalog, !no_message_check, &output)
        }
        Command::Messages => cmd::messages::run(&output),
        Command::Statuses => cmd::statuses::run(&output),
        Command::Respond {
            status,
            message_id,
            field,
            param,
            data,
            session_id,
            messages,
        } => {
            let catalog = cmd::load_messages(messages.as_deref(), max)?;
            let args = cmd::respond::Args {
                status: *status,
                message_id: message_id.as_deref(),
                field: field.as_deref(),
                params: param,
                data: data.as_deref(),
                session_id: session_id.as_deref(),
            };
            cmd::respond::run(&args, &catalog, &output)
        }
    }
}
