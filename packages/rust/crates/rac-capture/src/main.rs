//! rac CLI: capture queued web articles and inspect the archive.
//!
//! Settings come from `rac.yaml` (override with `--config <path>`), then
//! `$XDG_CONFIG_HOME/rac/settings.yaml`, then environment variables, then flags.
//!
//! Logging: set `RUST_LOG=rac_capture=debug` (or `warn`, `info`) to override
//! the default filter. `run` and `capture` also append to the log file.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;

use rac_capture::{init_logging, load_runtime_settings};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let logs = init_logging(cli.verbose);
    let settings = load_runtime_settings(cli.config.as_deref());

    match cli.command {
        Command::Run { source, capture } => {
            let overlay = capture.into_settings(source);
            commands::run_queue(settings.merge(overlay), &logs).await
        }
        Command::Capture { urls, capture } => {
            let overlay = capture.into_settings(None);
            commands::capture_urls(settings.merge(overlay), &urls, &logs).await
        }
        Command::Lint { dir, json } => commands::lint(&settings, dir, json),
        Command::Tags {
            dir,
            technologies,
            limit,
        } => commands::tags(&settings, dir, technologies, limit),
        Command::List {
            dir,
            tags,
            technologies,
            difficulty,
            domain,
            json,
        } => {
            let request = commands::ListRequest {
                dir,
                tags,
                technologies,
                difficulty,
                domain,
                json,
            };
            commands::list(&settings, request)
        }
        Command::Status => commands::status(settings),
        Command::Schema => {
            println!("{}", rac_types::record_schema());
            Ok(ExitCode::SUCCESS)
        }
    }
}
