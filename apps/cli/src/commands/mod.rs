//! Command dispatch and the input loading shared by every command.

pub mod check;
pub mod fields;
pub mod submit;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, bail};
use intake_form::prelude::*;

use crate::cli::{Command, FormArgs, OutputFormat};
use crate::config::CliConfig;

pub async fn run(
    command: Command,
    config: &CliConfig,
    output: OutputFormat,
) -> anyhow::Result<ExitCode> {
    match command {
        Command::Check(args) => check::execute(&args, config, output),
        Command::Submit(args) => submit::execute(&args, config, output).await,
        Command::Fields(args) => fields::execute(&args, output),
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub(crate) fn load_schema(path: &Path) -> anyhow::Result<FieldSet> {
    let text = read(path)?;
    let fields = if is_toml(path) {
        FieldSet::from_toml(&text)
    } else {
        FieldSet::from_json(&text)
    };
    fields.with_context(|| format!("invalid schema {}", path.display()))
}

pub(crate) fn load_values(path: &Path) -> anyhow::Result<FormValues> {
    let text = read(path)?;
    let json: serde_json::Value = if is_toml(path) {
        toml::from_str(&text).with_context(|| format!("invalid TOML in {}", path.display()))?
    } else {
        serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))?
    };
    FormValues::from_json(json).with_context(|| format!("invalid values in {}", path.display()))
}

/// Describe a file on disk the way a browser file picker would.
pub(crate) fn select_file(path: &Path) -> anyhow::Result<SelectedFile> {
    let meta = std::fs::metadata(path).with_context(|| format!("cannot stat {}", path.display()))?;
    if !meta.is_file() {
        bail!("{} is not a regular file", path.display());
    }
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_owned();
    let mime = mime_guess::from_path(path).first_or_octet_stream().to_string();
    Ok(SelectedFile::new(name, meta.len(), mime))
}

/// Mount the form described by `args` and apply its file selections.
pub(crate) fn mount(args: &FormArgs, config: &CliConfig) -> anyhow::Result<FormState> {
    let fields = load_schema(&args.schema.schema)?;
    let initial = match &args.values {
        Some(path) => load_values(path)?,
        None => FormValues::new(),
    };
    let mut state = FormState::with_config(fields, initial, &config.engine)
        .context("values do not fit the schema")?;

    for (name, path) in &args.files {
        let file = select_file(path)?;
        state
            .set_file(name, file)
            .with_context(|| format!("cannot select {} for `{name}`", path.display()))?;
    }
    Ok(state)
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn print_errors(errors: &FieldErrors) {
    for (name, message) in errors.iter() {
        println!("{name}: {message}");
    }
}
