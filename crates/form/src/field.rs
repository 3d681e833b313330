//! Field descriptors: the declarative unit that drives rendering and
//! validation.
//!
//! A descriptor list is the only input the engine inspects besides the
//! current values. `FieldKind` is a closed tagged union; every consumer
//! (validation, state, render) matches it exhaustively.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::option::SelectOption;
use crate::values::{FieldValue, FormValues};

/// Signature of a caller-supplied validation predicate.
///
/// Receives the field's value and all current values; returns an error
/// message or `None`.
pub type ValidatorFn = dyn Fn(&FieldValue, &FormValues) -> Option<String> + Send + Sync;

/// A custom validation rule attached in code.
///
/// Not serializable; schemas loaded from files never carry one.
#[derive(Clone)]
pub struct CustomRule(Arc<ValidatorFn>);

impl CustomRule {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&FieldValue, &FormValues) -> Option<String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn check(&self, value: &FieldValue, all: &FormValues) -> Option<String> {
        (self.0)(value, all)
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomRule(..)")
    }
}

/// HTML-style subtype of a single-line input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    #[default]
    Text,
    Email,
    Password,
    Number,
    Date,
    Tel,
    Url,
    Search,
    Time,
    DatetimeLocal,
}

impl InputType {
    /// The `type` attribute a host would put on an `<input>`.
    #[must_use]
    pub fn html_type(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Number => "number",
            Self::Date => "date",
            Self::Tel => "tel",
            Self::Url => "url",
            Self::Search => "search",
            Self::Time => "time",
            Self::DatetimeLocal => "datetime-local",
        }
    }
}

/// Constraints for text-like inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputConstraints {
    #[serde(default)]
    pub input: InputType,

    /// Minimum character count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    /// Numeric lower bound (number inputs).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Numeric upper bound (number inputs).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Regex the whole value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
}

/// A value pattern, anchored to the whole value and compiled once.
///
/// Serialized as its source text. A source that does not compile is kept so
/// validation can report and skip it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Pattern {
    source: String,
    compiled: Result<regex::Regex, regex::Error>,
}

impl Pattern {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = regex::Regex::new(&format!("^(?:{source})$"));
        Self { source, compiled }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The anchored regex, or the compile error.
    pub fn regex(&self) -> Result<&regex::Regex, &regex::Error> {
        self.compiled.as_ref()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl From<String> for Pattern {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

/// Options for multi-line text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextareaOptions {
    /// Visible row count hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// Acceptance rules for file inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRules {
    /// Accepted patterns: `.ext`, `type/subtype` or `type/*`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accept: Vec<String>,

    /// Human-readable size limit such as `"5MB"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<String>,
}

/// The kind of a field: the single axis of polymorphism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Input(InputConstraints),
    Textarea(TextareaOptions),
    Select {
        #[serde(default)]
        options: Vec<SelectOption>,
    },
    Checkbox,
    File(FileRules),
}

impl FieldKind {
    /// Short kind name for logs and error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Input(_) => "input",
            Self::Textarea(_) => "textarea",
            Self::Select { .. } => "select",
            Self::Checkbox => "checkbox",
            Self::File(_) => "file",
        }
    }

    /// The value a freshly mounted form holds when the caller gave none.
    ///
    /// File fields start undefined.
    #[must_use]
    pub fn empty_value(&self) -> Option<FieldValue> {
        match self {
            Self::Input(_) | Self::Textarea(_) | Self::Select { .. } => {
                Some(FieldValue::Text(String::new()))
            }
            Self::Checkbox => Some(FieldValue::Bool(false)),
            Self::File(_) => None,
        }
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

/// Declarative description of one form input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Unique key within the form; used for values and errors.
    pub name: String,

    #[serde(flatten)]
    pub kind: FieldKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,

    #[serde(default)]
    pub required: bool,

    /// Custom predicate, run only when the value is non-empty.
    #[serde(skip)]
    pub validate: Option<CustomRule>,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            label: None,
            placeholder: None,
            help_text: None,
            required: false,
            validate: None,
        }
    }

    #[must_use]
    pub fn input(name: impl Into<String>, input: InputType) -> Self {
        Self::new(
            name,
            FieldKind::Input(InputConstraints {
                input,
                ..InputConstraints::default()
            }),
        )
    }

    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self::input(name, InputType::Text)
    }

    #[must_use]
    pub fn email(name: impl Into<String>) -> Self {
        Self::input(name, InputType::Email)
    }

    #[must_use]
    pub fn password(name: impl Into<String>) -> Self {
        Self::input(name, InputType::Password)
    }

    #[must_use]
    pub fn number(name: impl Into<String>) -> Self {
        Self::input(name, InputType::Number)
    }

    #[must_use]
    pub fn date(name: impl Into<String>) -> Self {
        Self::input(name, InputType::Date)
    }

    #[must_use]
    pub fn textarea(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Textarea(TextareaOptions::default()))
    }

    #[must_use]
    pub fn select<I, O>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<SelectOption>,
    {
        Self::new(
            name,
            FieldKind::Select {
                options: options.into_iter().map(Into::into).collect(),
            },
        )
    }

    #[must_use]
    pub fn checkbox(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Checkbox)
    }

    #[must_use]
    pub fn file<I, S>(name: impl Into<String>, accept: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            FieldKind::File(FileRules {
                accept: accept.into_iter().map(Into::into).collect(),
                max_size: None,
            }),
        )
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    /// Minimum length for inputs and textareas; ignored for other kinds.
    #[must_use]
    pub fn with_min_length(mut self, length: usize) -> Self {
        match &mut self.kind {
            FieldKind::Input(c) => c.min_length = Some(length),
            FieldKind::Textarea(o) => o.min_length = Some(length),
            FieldKind::Select { .. } | FieldKind::Checkbox | FieldKind::File(_) => {}
        }
        self
    }

    /// Maximum length for textareas; ignored for other kinds.
    #[must_use]
    pub fn with_max_length(mut self, length: usize) -> Self {
        if let FieldKind::Textarea(o) = &mut self.kind {
            o.max_length = Some(length);
        }
        self
    }

    #[must_use]
    pub fn with_rows(mut self, rows: u32) -> Self {
        if let FieldKind::Textarea(o) = &mut self.kind {
            o.rows = Some(rows);
        }
        self
    }

    #[must_use]
    pub fn with_min(mut self, min: f64) -> Self {
        if let FieldKind::Input(c) = &mut self.kind {
            c.min = Some(min);
        }
        self
    }

    #[must_use]
    pub fn with_max(mut self, max: f64) -> Self {
        if let FieldKind::Input(c) = &mut self.kind {
            c.max = Some(max);
        }
        self
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        if let FieldKind::Input(c) = &mut self.kind {
            c.pattern = Some(Pattern::new(pattern));
        }
        self
    }

    #[must_use]
    pub fn with_accept<I, S>(mut self, accept: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let FieldKind::File(r) = &mut self.kind {
            r.accept = accept.into_iter().map(Into::into).collect();
        }
        self
    }

    #[must_use]
    pub fn with_max_size(mut self, max_size: impl Into<String>) -> Self {
        if let FieldKind::File(r) = &mut self.kind {
            r.max_size = Some(max_size.into());
        }
        self
    }

    /// Attach a custom predicate.
    #[must_use]
    pub fn with_validator<F>(mut self, f: F) -> Self
    where
        F: Fn(&FieldValue, &FormValues) -> Option<String> + Send + Sync + 'static,
    {
        self.validate = Some(CustomRule::new(f));
        self
    }

    /// Label if set, otherwise the field name.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// The subtype when this is a text-like input.
    #[must_use]
    pub fn input_type(&self) -> Option<InputType> {
        match &self.kind {
            FieldKind::Input(c) => Some(c.input),
            _ => None,
        }
    }
}
