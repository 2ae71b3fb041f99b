//! docscan: scan folders of `.txt`, `.md` and `.pdf` documents, either as a
//! one-off command or behind an HTTP API that runs scans as background tasks.

mod batch;
mod cli;
mod error;
mod logging;
mod scan;
mod server;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use docscan_config::Config;
use docscan_tasks::Coordinator;
use exn::ResultExt;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            if err.is_retryable() {
                eprintln!("This may be temporary; trying again could succeed.");
            }
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    logging::init(cli.verbose, config.log.filter.as_deref())?;
    tracing::debug!(?config, "Loaded configuration");

    let coordinator = Coordinator::new(config.coordinator_config());
    match cli.command {
        Command::Serve(args) => server::serve(&config.server, args, coordinator).await,
        Command::Scan(args) => scan::run(&coordinator, args).await,
        Command::Batch(args) => batch::run(&coordinator, args).await,
    }
}
