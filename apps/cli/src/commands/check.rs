use std::process::ExitCode;

use intake_form::prelude::*;

use super::{mount, print_errors, print_json};
use crate::cli::{FormArgs, OutputFormat};
use crate::config::CliConfig;

pub fn execute(
    args: &FormArgs,
    config: &CliConfig,
    output: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let mut state = mount(args, config)?;

    // Selection-time errors take precedence over the validation pass.
    let mut errors = state.validate();
    for (name, message) in state.errors().iter() {
        errors.insert(name, message);
    }
    state.set_errors(errors);
    let errors: &FieldErrors = state.errors();
    tracing::info!(fields = state.fields().len(), errors = errors.len(), "check complete");

    match output {
        OutputFormat::Json => print_json(errors)?,
        OutputFormat::Text if errors.is_empty() => {
            println!("ok: {} fields valid", state.fields().len());
        }
        OutputFormat::Text => print_errors(errors),
    }

    Ok(if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
