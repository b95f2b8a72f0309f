mod commands;
mod error;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{completions, direct, messages, starter, store, Context};
use crate::error::{exit_code_for, report_error};
use bulkmsg_config as config;

#[derive(Debug, Parser)]
#[command(
    name = "bulkmsg",
    version,
    about = "Generate and send personalized SMS/MMS from a spreadsheet"
)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render the first few messages without sending anything
    Preview(messages::PreviewArgs),
    /// Render every eligible row and hand the batch to the delivery provider
    Send(messages::SendArgs),
    /// Send one text to a list of numbers
    #[command(name = "send-text")]
    SendText(direct::SendTextArgs),
    /// Read names and phone numbers from a two-column CSV
    #[command(name = "parse-recipients")]
    ParseRecipients(direct::ParseRecipientsArgs),
    #[command(subcommand)]
    Store(store::StoreCommand),
    /// Write a starter file to fill in: a recipient CSV or an order workbook
    Template(starter::TemplateArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    match command {
        Command::Completions(args) => completions::emit(args),
        command => {
            let app_config =
                config::load(config_path.clone()).with_context(|| "load config")?;
            if verbose {
                match config::resolve_config_path(config_path) {
                    Ok(path) if path.exists() => debug!(path = %path.display(), "config resolved"),
                    Ok(path) => debug!(path = %path.display(), "config missing, using defaults"),
                    Err(err) => debug!(error = %err, "config unavailable"),
                }
            }

            let ctx = Context {
                json,
                config: &app_config,
            };

            match command {
                Command::Preview(args) => messages::preview(&ctx, args),
                Command::Send(args) => messages::send(&ctx, args),
                Command::SendText(args) => direct::send_text(&ctx, args),
                Command::ParseRecipients(args) => direct::parse_recipients(&ctx, args),
                Command::Template(args) => starter::write_starter(&ctx, args),
                Command::Store(cmd) => match cmd {
                    store::StoreCommand::Put(args) => store::put(&ctx, args),
                    store::StoreCommand::Get(args) => store::get(&ctx, args),
                },
                Command::Completions(_) => {
                    unreachable!("completions command handled before config load")
                }
            }
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
