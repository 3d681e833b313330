use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::logging::LogFormat;

/// Drive intake forms from the terminal.
#[derive(Debug, Parser)]
#[command(name = "intake", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./intake.toml when present)
    #[arg(short, long, global = true, env = "INTAKE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `intake_form=debug`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Output format for command results
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate values against a schema
    Check(FormArgs),
    /// Run a full submission
    Submit(SubmitArgs),
    /// List the fields of a schema
    Fields(SchemaArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Schema document (`.json` or `.toml`)
    #[arg(short, long)]
    pub schema: PathBuf,
}

#[derive(Debug, Args)]
pub struct FormArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Initial values (`.json` or `.toml`)
    #[arg(short, long)]
    pub values: Option<PathBuf>,

    /// Select a file for a file field, as `name=path`
    #[arg(short, long = "file", value_name = "NAME=PATH", value_parser = parse_file_arg)]
    pub files: Vec<(String, PathBuf)>,
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub form: FormArgs,

    /// Credential for the auth check; an empty token counts as logged out
    #[arg(long)]
    pub token: Option<String>,

    /// Make the submit handler fail with this status code
    #[arg(long)]
    pub reject_status: Option<u16>,

    /// Message carried by the simulated rejection
    #[arg(long, requires = "reject_status")]
    pub reject_message: Option<String>,
}

fn parse_file_arg(raw: &str) -> Result<(String, PathBuf), String> {
    match raw.split_once('=') {
        Some((name, path)) if !name.trim().is_empty() && !path.is_empty() => {
            Ok((name.trim().to_owned(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=PATH, got `{raw}`")),
    }
}
