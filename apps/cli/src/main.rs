//! `intake` entry point.
//!
//! Exit codes: 0 on success, 1 when the form reports errors or a submission
//! does not succeed, 2 when the command itself fails.

use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod config;
mod logging;

use cli::{Cli, Command};
use config::Overrides;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let token = match &cli.command {
        Command::Submit(args) => args.token.clone(),
        _ => None,
    };
    let overrides = Overrides {
        log_level: cli.log_level,
        log_format: cli.log_format,
        token,
    };
    let config = config::load(cli.config.as_deref(), overrides)?;
    logging::init(&config.log_level, config.log_format)?;
    tracing::debug!(authenticated = config.is_authenticated(), "starting");

    commands::run(cli.command, &config, cli.output).await
}
