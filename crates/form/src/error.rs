/// Error type for form engine operations.
///
/// These report misuse of the engine (unknown fields, duplicate names,
/// mismatched inputs) or bad configuration. Field validation failures are
/// not errors in this sense: they are collected into
/// [`FieldErrors`](crate::validation::FieldErrors) and rendered next to the
/// field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// No descriptor with the given name exists in the form.
    #[error("unknown field: `{name}`")]
    UnknownField { name: String },

    /// Two descriptors share the same name.
    #[error("duplicate field name: `{name}`")]
    DuplicateField { name: String },

    /// The input variant does not fit the field's kind.
    #[error("field `{name}` is a {kind} field and cannot take {input} input")]
    KindMismatch {
        name: String,
        kind: &'static str,
        input: &'static str,
    },

    /// A submission is already outstanding for this form.
    #[error("a submission is already in flight")]
    SubmissionInFlight,

    /// Engine configuration is unusable.
    #[error("invalid configuration for `{key}`: {reason}")]
    InvalidConfig { key: String, reason: String },

    /// A form schema document could not be parsed.
    #[error("schema parse failed: {error}")]
    SchemaParse { error: String },
}

impl FormError {
    /// Broad error category for grouping in logs.
    #[must_use]
    pub fn category(&self) -> &str {
        match self {
            Self::UnknownField { .. } => "lookup",
            Self::DuplicateField { .. } => "schema",
            Self::KindMismatch { .. } => "type",
            Self::SubmissionInFlight => "state",
            Self::InvalidConfig { .. } => "config",
            Self::SchemaParse { .. } => "schema",
        }
    }

    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::UnknownField { .. } => "FORM_UNKNOWN_FIELD",
            Self::DuplicateField { .. } => "FORM_DUPLICATE_FIELD",
            Self::KindMismatch { .. } => "FORM_KIND_MISMATCH",
            Self::SubmissionInFlight => "FORM_IN_FLIGHT",
            Self::InvalidConfig { .. } => "FORM_INVALID_CONFIG",
            Self::SchemaParse { .. } => "FORM_SCHEMA_PARSE",
        }
    }
}
