use std::process::ExitCode;
use std::sync::Mutex;

use async_trait::async_trait;
use intake_form::prelude::*;
use serde::Serialize;

use super::{mount, print_errors, print_json};
use crate::cli::{OutputFormat, SubmitArgs};
use crate::config::CliConfig;

/// Captures the snapshot instead of sending it anywhere. Optionally fails
/// with a fixed error to exercise the failure paths.
#[derive(Debug, Default)]
struct CaptureHandler {
    reject: Option<SubmitError>,
    captured: Mutex<Option<serde_json::Value>>,
}

#[async_trait]
impl SubmitHandler for CaptureHandler {
    async fn submit(&self, values: FormValues) -> Result<(), SubmitError> {
        if let Some(err) = &self.reject {
            return Err(err.clone());
        }
        let json = serde_json::to_value(&values).map_err(|e| SubmitError::new(e.to_string()))?;
        if let Ok(mut slot) = self.captured.lock() {
            *slot = Some(json);
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct Outcome<'a> {
    report: &'a SubmitReport,
    submitted: Option<&'a serde_json::Value>,
}

pub async fn execute(
    args: &SubmitArgs,
    config: &CliConfig,
    output: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let mut state = mount(&args.form, config)?;
    if !state.errors().is_empty() {
        tracing::warn!(errors = state.errors().len(), "file selection rejected");
        print_errors(state.errors());
        return Ok(ExitCode::FAILURE);
    }

    let reject = args.reject_status.map(|status| {
        let err = SubmitError::with_status(status);
        match &args.reject_message {
            Some(message) => err.message(message.clone()),
            None => err,
        }
    });
    let handler = CaptureHandler {
        reject,
        ..CaptureHandler::default()
    };

    let mut submitter =
        Submitter::with_config(config.is_authenticated(), handler, config.engine.clone());
    let report = submitter.submit(&mut state).await?;
    let submitted = submitter
        .handler()
        .captured
        .lock()
        .ok()
        .and_then(|mut slot| slot.take());

    match output {
        OutputFormat::Json => print_json(&Outcome {
            report: &report,
            submitted: submitted.as_ref(),
        })?,
        OutputFormat::Text => print_report(&report, submitted.as_ref())?,
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn status_label(status: SubmitStatus) -> &'static str {
    match status {
        SubmitStatus::Idle => "idle",
        SubmitStatus::Validating => "validating",
        SubmitStatus::Submitting => "submitting",
        SubmitStatus::Succeeded => "succeeded",
        SubmitStatus::Blocked(BlockReason::AuthRequired) => "blocked: authentication required",
        SubmitStatus::Blocked(BlockReason::ValidationFailed) => "blocked: validation failed",
        SubmitStatus::Failed(FailureReason::SessionExpired) => "failed: session expired",
        SubmitStatus::Failed(FailureReason::Generic) => "failed",
    }
}

fn print_report(
    report: &SubmitReport,
    submitted: Option<&serde_json::Value>,
) -> anyhow::Result<()> {
    if let Some(values) = submitted {
        println!("submitted:");
        print_json(values)?;
    }
    println!("status: {}", status_label(report.status));
    if let Some(message) = &report.form_error {
        println!("error: {message}");
    }
    print_errors(&report.field_errors);
    if let Some(focus) = &report.focus {
        println!("focus: {focus}");
    }
    if let Some(redirect) = &report.redirect {
        println!(
            "redirect: {} after {}ms",
            redirect.to,
            redirect.after.as_millis()
        );
    }
    Ok(())
}
