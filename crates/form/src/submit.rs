//! Submission orchestration.
//!
//! A submit attempt moves through
//! `Idle → Validating → {Blocked, Submitting} → {Succeeded, Failed}`.
//! Authentication is checked before validation; the handler is only called
//! when both pass. Every handler rejection is caught and turned into state:
//! nothing escapes `submit` except engine misuse.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::FormError;
use crate::state::FormState;
use crate::validation::FieldErrors;
use crate::values::FormValues;

pub const AUTH_REQUIRED_MESSAGE: &str = "Please log in to submit this form.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Submission failed. Please try again.";

/// Yes/no check for a usable credential, consulted once per attempt.
pub trait AuthOracle {
    fn is_authenticated(&self) -> bool;
}

impl<F> AuthOracle for F
where
    F: Fn() -> bool,
{
    fn is_authenticated(&self) -> bool {
        self()
    }
}

impl AuthOracle for bool {
    fn is_authenticated(&self) -> bool {
        *self
    }
}

/// Error returned by a submit handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.message.as_deref().unwrap_or("submission rejected"))]
pub struct SubmitError {
    /// HTTP-style status code, when the failure carries one.
    pub status: Option<u16>,
    pub message: Option<String>,
}

impl SubmitError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn with_status(status: u16) -> Self {
        Self {
            status: Some(status),
            message: None,
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// 401 or 403.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status, Some(401 | 403))
    }
}

/// Receives the value snapshot once validation passes.
///
/// Files arrive as opaque [`SelectedFile`](crate::values::SelectedFile)
/// handles; encoding them is up to the implementation.
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    async fn submit(&self, values: FormValues) -> Result<(), SubmitError>;
}

/// Instruction for the host to navigate after a delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub to: String,
    pub after: Duration,
}

/// Why an attempt stopped before reaching the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    AuthRequired,
    ValidationFailed,
}

/// Why the handler's attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    SessionExpired,
    Generic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SubmitStatus {
    #[default]
    Idle,
    Validating,
    Blocked(BlockReason),
    Submitting,
    Succeeded,
    Failed(FailureReason),
}

impl SubmitStatus {
    /// Whether a new attempt may start.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Validating | Self::Submitting)
    }
}

/// Outcome of one submit attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitReport {
    pub status: SubmitStatus,
    pub field_errors: FieldErrors,
    /// Error not attributable to a single field.
    pub form_error: Option<String>,
    /// First erroring field in descriptor order.
    pub focus: Option<String>,
    pub redirect: Option<Redirect>,
}

impl SubmitReport {
    fn settled(status: SubmitStatus) -> Self {
        Self {
            status,
            field_errors: FieldErrors::new(),
            form_error: None,
            focus: None,
            redirect: None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == SubmitStatus::Succeeded
    }
}

/// Drives submit attempts for one form.
pub struct Submitter<A, H> {
    oracle: A,
    handler: H,
    config: EngineConfig,
    status: SubmitStatus,
    form_error: Option<String>,
}

impl<A, H> Submitter<A, H>
where
    A: AuthOracle,
    H: SubmitHandler,
{
    pub fn new(oracle: A, handler: H) -> Self {
        Self::with_config(oracle, handler, EngineConfig::default())
    }

    pub fn with_config(oracle: A, handler: H, config: EngineConfig) -> Self {
        Self {
            oracle,
            handler,
            config,
            status: SubmitStatus::Idle,
            form_error: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> SubmitStatus {
        self.status
    }

    #[must_use]
    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Return to `Idle` and drop the form-level error.
    pub fn reset(&mut self) {
        self.status = SubmitStatus::Idle;
        self.form_error = None;
    }

    /// Run one submit attempt against `state`.
    ///
    /// Fails only with [`FormError::SubmissionInFlight`] when an earlier
    /// attempt never settled.
    pub async fn submit(&mut self, state: &mut FormState) -> Result<SubmitReport, FormError> {
        if !self.status.is_settled() {
            return Err(FormError::SubmissionInFlight);
        }
        self.form_error = None;
        self.status = SubmitStatus::Validating;

        if !self.oracle.is_authenticated() {
            tracing::info!("submission blocked: not authenticated");
            let mut report =
                SubmitReport::settled(SubmitStatus::Blocked(BlockReason::AuthRequired));
            report.form_error = Some(AUTH_REQUIRED_MESSAGE.to_owned());
            report.redirect = Some(self.config.redirect());
            return Ok(self.settle(report));
        }

        let errors = state.validate();
        state.set_errors(errors);
        if !state.errors().is_empty() {
            tracing::info!(errors = state.errors().len(), "submission blocked: validation failed");
            let mut report =
                SubmitReport::settled(SubmitStatus::Blocked(BlockReason::ValidationFailed));
            report.field_errors = state.errors().clone();
            report.focus = state.errors().first().map(|(name, _)| name.to_owned());
            return Ok(self.settle(report));
        }

        self.status = SubmitStatus::Submitting;
        tracing::debug!(fields = state.values().len(), "invoking submit handler");
        let result = self.handler.submit(state.snapshot()).await;

        let report = match result {
            Ok(()) => {
                tracing::info!("submission succeeded");
                SubmitReport::settled(SubmitStatus::Succeeded)
            }
            Err(err) if err.is_auth_failure() => {
                tracing::info!(status = ?err.status, "submission failed: session expired");
                let mut report =
                    SubmitReport::settled(SubmitStatus::Failed(FailureReason::SessionExpired));
                report.form_error = Some(SESSION_EXPIRED_MESSAGE.to_owned());
                report.redirect = Some(self.config.redirect());
                report
            }
            Err(err) => {
                tracing::info!(status = ?err.status, error = %err, "submission failed");
                let message = err
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_owned());
                let mut report =
                    SubmitReport::settled(SubmitStatus::Failed(FailureReason::Generic));
                report.form_error = Some(message);
                report
            }
        };
        Ok(self.settle(report))
    }

    fn settle(&mut self, report: SubmitReport) -> SubmitReport {
        self.status = report.status;
        self.form_error.clone_from(&report.form_error);
        report
    }
}
