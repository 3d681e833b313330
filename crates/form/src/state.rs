//! Per-form mutable state.
//!
//! `FormState` owns the current values, the per-field errors and the
//! display names of selected files. Every mutation goes through one of the
//! transition methods below; there is no other way to change it.

use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::error::FormError;
use crate::field::{FieldDescriptor, FieldKind};
use crate::schema::FieldSet;
use crate::validation::{self, FieldErrors};
use crate::values::{FieldValue, FormValues, SelectedFile};

/// A typed change event from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    /// Raw text from an input, textarea or select.
    Text(String),
    /// Checkbox state.
    Checked(bool),
    /// A file selection, or `None` when the selection was removed.
    File(Option<SelectedFile>),
}

impl FieldInput {
    fn name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Checked(_) => "checked",
            Self::File(_) => "file",
        }
    }
}

impl From<&str> for FieldInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for FieldInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FieldInput {
    fn from(b: bool) -> Self {
        Self::Checked(b)
    }
}

impl From<SelectedFile> for FieldInput {
    fn from(f: SelectedFile) -> Self {
        Self::File(Some(f))
    }
}

impl From<Option<SelectedFile>> for FieldInput {
    fn from(f: Option<SelectedFile>) -> Self {
        Self::File(f)
    }
}

/// Value shape a kind stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Text,
    Flag,
    File,
}

impl Slot {
    fn of(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Input(_) | FieldKind::Textarea(_) | FieldKind::Select { .. } => Self::Text,
            FieldKind::Checkbox => Self::Flag,
            FieldKind::File(_) => Self::File,
        }
    }

    fn fits(self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (Self::Text, FieldValue::Text(_))
                | (Self::Flag, FieldValue::Bool(_))
                | (Self::File, FieldValue::File(_))
        )
    }
}

fn value_name(value: &FieldValue) -> &'static str {
    match value {
        FieldValue::Text(_) => "text",
        FieldValue::Bool(_) => "boolean",
        FieldValue::File(_) => "file",
    }
}

fn cap_message(limit: &str) -> String {
    format!("File size should not exceed {limit}")
}

fn coerce_checked(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

/// The mutable state of one mounted form.
#[derive(Debug, Clone)]
pub struct FormState {
    fields: FieldSet,
    values: FormValues,
    initial: FormValues,
    errors: FieldErrors,
    file_displays: HashMap<String, String>,
    hard_cap: u64,
    hard_cap_label: String,
}

impl FormState {
    /// Mount a form with the default engine configuration.
    pub fn new(fields: FieldSet, initial: FormValues) -> Result<Self, FormError> {
        Self::with_config(fields, initial, &EngineConfig::default())
    }

    /// Mount a form from a plain descriptor list.
    pub fn from_descriptors(
        fields: Vec<FieldDescriptor>,
        initial: FormValues,
    ) -> Result<Self, FormError> {
        Self::new(FieldSet::new(fields)?, initial)
    }

    /// Mount a form, seeding values from `initial`.
    ///
    /// Fields missing from `initial` start at their kind's empty value.
    /// Duplicate names, keys that name no field and values of the wrong
    /// shape are rejected. An initial file over the hard cap is left out of
    /// both the values and the reset snapshot, and the cap error is recorded.
    pub fn with_config(
        fields: FieldSet,
        initial: FormValues,
        config: &EngineConfig,
    ) -> Result<Self, FormError> {
        fields.check_unique()?;
        if let Some(unknown) = initial.keys().find(|k| !fields.contains(k)) {
            return Err(FormError::UnknownField {
                name: unknown.to_owned(),
            });
        }

        let hard_cap = config.hard_cap_bytes();
        let mut errors = FieldErrors::new();
        let mut seeded = FormValues::new();
        for field in &fields {
            match initial.get(&field.name) {
                Some(value) => {
                    if !Slot::of(&field.kind).fits(value) {
                        return Err(FormError::KindMismatch {
                            name: field.name.clone(),
                            kind: field.kind.name(),
                            input: value_name(value),
                        });
                    }
                    if let Some(file) = value.as_file()
                        && file.size > hard_cap
                    {
                        tracing::warn!(
                            field = %field.name,
                            size = file.size,
                            cap = hard_cap,
                            "dropped initial file over the upload cap"
                        );
                        errors.insert(field.name.clone(), cap_message(&config.max_upload));
                        continue;
                    }
                    seeded.set(field.name.clone(), value.clone());
                }
                None => {
                    if let Some(empty) = field.kind.empty_value() {
                        seeded.set(field.name.clone(), empty);
                    }
                }
            }
        }

        let mut state = Self {
            fields,
            values: seeded.clone(),
            initial: seeded,
            errors,
            file_displays: HashMap::new(),
            hard_cap,
            hard_cap_label: config.max_upload.clone(),
        };
        state.rebuild_file_displays();
        tracing::debug!(fields = state.fields.len(), "form state mounted");
        Ok(state)
    }

    /// Apply a change event to one field.
    ///
    /// The field's existing error is cleared first. Checkboxes store a
    /// boolean (text is coerced: `"true"`, `"on"`, `"1"`, `"yes"`). File
    /// fields delegate to [`set_file`](Self::set_file) or
    /// [`clear_file`](Self::clear_file).
    pub fn set_value(&mut self, name: &str, input: impl Into<FieldInput>) -> Result<(), FormError> {
        let input = input.into();
        let field = self.descriptor(name)?;
        let slot = Slot::of(&field.kind);

        let mismatch = || FormError::KindMismatch {
            name: name.to_owned(),
            kind: field.kind.name(),
            input: input.name(),
        };
        match (slot, &input) {
            (Slot::Text, FieldInput::Text(_))
            | (Slot::Flag, FieldInput::Text(_) | FieldInput::Checked(_))
            | (Slot::File, FieldInput::File(_)) => {}
            _ => return Err(mismatch()),
        }

        self.errors.remove(name);
        tracing::debug!(field = name, input = input.name(), "field changed");

        match input {
            FieldInput::Text(text) if slot == Slot::Flag => {
                self.values.set(name, coerce_checked(&text));
            }
            FieldInput::Text(text) => self.values.set(name, text),
            FieldInput::Checked(checked) => self.values.set(name, checked),
            FieldInput::File(Some(file)) => self.set_file(name, file)?,
            FieldInput::File(None) => self.clear_file(name)?,
        }
        Ok(())
    }

    /// Select a file for a file field.
    ///
    /// A file over the hard cap is discarded: the field's value and display
    /// name are cleared and the cap error is recorded. The field's own
    /// `max_size` is not consulted here.
    pub fn set_file(&mut self, name: &str, file: SelectedFile) -> Result<(), FormError> {
        let field = self.descriptor(name)?;
        if !field.kind.is_file() {
            return Err(FormError::KindMismatch {
                name: name.to_owned(),
                kind: field.kind.name(),
                input: "file",
            });
        }

        self.errors.remove(name);
        if file.size > self.hard_cap {
            tracing::warn!(
                field = name,
                size = file.size,
                cap = self.hard_cap,
                "rejected file over the upload cap"
            );
            self.values.remove(name);
            self.file_displays.remove(name);
            self.errors.insert(name, cap_message(&self.hard_cap_label));
            return Ok(());
        }

        tracing::debug!(field = name, size = file.size, "file selected");
        self.file_displays.insert(name.to_owned(), file.name.clone());
        self.values.set(name, file);
        Ok(())
    }

    /// Remove the selected file for `name`. Other fields are untouched.
    pub fn clear_file(&mut self, name: &str) -> Result<(), FormError> {
        let field = self.descriptor(name)?;
        if !field.kind.is_file() {
            return Err(FormError::KindMismatch {
                name: name.to_owned(),
                kind: field.kind.name(),
                input: "file",
            });
        }
        self.values.remove(name);
        self.file_displays.remove(name);
        Ok(())
    }

    /// Replace the whole error map.
    ///
    /// Entries naming no field are dropped; the rest are kept in descriptor
    /// order.
    pub fn set_errors(&mut self, mut errors: FieldErrors) {
        let fields = &self.fields;
        errors.retain(|name| {
            let known = fields.contains(name);
            if !known {
                tracing::warn!(field = name, "dropping error for unknown field");
            }
            known
        });
        errors.order_by(self.fields.as_slice());
        self.errors = errors;
    }

    /// Restore the initial values and clear all errors and file displays.
    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.errors = FieldErrors::new();
        self.rebuild_file_displays();
        tracing::debug!("form state reset");
    }

    /// Run the validation pass over the current values.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        validation::validate(self.fields.as_slice(), &self.values)
    }

    #[must_use]
    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    #[must_use]
    pub fn descriptors(&self) -> &[FieldDescriptor] {
        self.fields.as_slice()
    }

    #[must_use]
    pub fn values(&self) -> &FormValues {
        &self.values
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// A copy of the current values for the submit handler.
    #[must_use]
    pub fn snapshot(&self) -> FormValues {
        self.values.clone()
    }

    #[must_use]
    pub fn initial_values(&self) -> &FormValues {
        &self.initial
    }

    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[must_use]
    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name)
    }

    #[must_use]
    pub fn file_display(&self, name: &str) -> Option<&str> {
        self.file_displays.get(name).map(String::as_str)
    }

    /// Whether any value differs from the initial snapshot.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.values != self.initial
    }

    #[must_use]
    pub fn hard_cap(&self) -> u64 {
        self.hard_cap
    }

    fn descriptor(&self, name: &str) -> Result<&FieldDescriptor, FormError> {
        self.fields.get(name).ok_or_else(|| FormError::UnknownField {
            name: name.to_owned(),
        })
    }

    fn rebuild_file_displays(&mut self) {
        self.file_displays = self
            .values
            .iter()
            .filter_map(|(name, value)| Some((name.to_owned(), value.as_file()?.name.clone())))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::HARD_FILE_CAP;
    use pretty_assertions::assert_eq;

    fn sample() -> FormState {
        FormState::from_descriptors(
            vec![
                FieldDescriptor::email("email").required(),
                FieldDescriptor::checkbox("agree"),
                FieldDescriptor::file("thesis", [".pdf"]).with_max_size("20MB"),
            ],
            FormValues::new().with("email", "ada@uni.example"),
        )
        .unwrap()
    }

    fn pdf(size: u64) -> SelectedFile {
        SelectedFile::new("thesis.pdf", size, "application/pdf")
    }

    #[test]
    fn renamed_duplicate_is_not_mounted() {
        let mut fields =
            FieldSet::new(vec![FieldDescriptor::text("a"), FieldDescriptor::text("b")]).unwrap();
        if let Some(field) = fields.get_mut("b") {
            field.name = "a".into();
        }

        let err = FormState::new(fields, FormValues::new()).unwrap_err();
        assert_eq!(err, FormError::DuplicateField { name: "a".into() });
    }

    #[test]
    fn clear_file_rejects_other_kinds() {
        let mut state = sample();
        let err = state.clear_file("email").unwrap_err();
        assert_eq!(err.code(), "FORM_KIND_MISMATCH");
        assert_eq!(state.values().get_text("email"), Some("ada@uni.example"));
    }

    #[test]
    fn initial_file_over_cap_is_dropped() {
        let mut state = FormState::from_descriptors(
            vec![FieldDescriptor::file("thesis", [".pdf"]).with_max_size("100MB")],
            FormValues::new().with("thesis", pdf(50 * 1024 * 1024)),
        )
        .unwrap();

        assert!(state.value("thesis").is_none());
        assert!(state.initial_values().get("thesis").is_none());
        assert!(state.file_display("thesis").is_none());
        assert_eq!(state.error("thesis"), Some("File size should not exceed 10MB"));

        state.reset();
        assert!(state.value("thesis").is_none());
        assert!(state.file_display("thesis").is_none());
    }

    #[test]
    fn initial_file_under_cap_keeps_display() {
        let state = FormState::from_descriptors(
            vec![FieldDescriptor::file("thesis", [".pdf"])],
            FormValues::new().with("thesis", pdf(1024)),
        )
        .unwrap();
        assert_eq!(state.file_display("thesis"), Some("thesis.pdf"));
        assert!(state.errors().is_empty());
    }

    #[test]
    fn seeds_missing_fields_with_empty_values() {
        let state = sample();
        assert_eq!(state.values().get_text("email"), Some("ada@uni.example"));
        assert_eq!(state.values().get_bool("agree"), Some(false));
        assert!(state.value("thesis").is_none());
        assert!(!state.is_dirty());
    }

    #[test]
    fn rejects_unknown_initial_keys() {
        let err = FormState::from_descriptors(
            vec![FieldDescriptor::text("a")],
            FormValues::new().with("b", "x"),
        )
        .unwrap_err();
        assert_eq!(err, FormError::UnknownField { name: "b".into() });
    }

    #[test]
    fn rejects_mistyped_initial_values() {
        let err = FormState::from_descriptors(
            vec![FieldDescriptor::checkbox("agree")],
            FormValues::new().with("agree", "yes"),
        )
        .unwrap_err();
        assert_eq!(err.code(), "FORM_KIND_MISMATCH");
    }

    #[test]
    fn set_value_clears_only_that_error() {
        let mut state = sample();
        state.set_errors(FieldErrors::from_iter([
            ("email", "Please enter a valid email address"),
            ("agree", "agree is required"),
        ]));

        state.set_value("email", "new@uni.example").unwrap();
        assert_eq!(state.error("email"), None);
        assert_eq!(state.error("agree"), Some("agree is required"));
    }

    #[test]
    fn checkbox_stores_booleans() {
        let mut state = sample();
        state.set_value("agree", true).unwrap();
        assert_eq!(state.values().get_bool("agree"), Some(true));

        state.set_value("agree", "off").unwrap();
        assert_eq!(state.values().get_bool("agree"), Some(false));

        state.set_value("agree", "on").unwrap();
        assert_eq!(state.values().get_bool("agree"), Some(true));
    }

    #[test]
    fn mismatched_input_is_rejected_without_side_effects() {
        let mut state = sample();
        state.set_errors(FieldErrors::from_iter([("email", "bad")]));

        let err = state.set_value("email", pdf(1)).unwrap_err();
        assert_eq!(err.code(), "FORM_KIND_MISMATCH");
        assert_eq!(state.error("email"), Some("bad"));

        assert!(state.set_value("thesis", "text").is_err());
        assert!(state.set_file("email", pdf(1)).is_err());
    }

    #[test]
    fn unknown_fields_are_errors() {
        let mut state = sample();
        assert_eq!(
            state.set_value("nope", "x").unwrap_err(),
            FormError::UnknownField {
                name: "nope".into()
            }
        );
        assert!(state.clear_file("nope").is_err());
    }

    #[test]
    fn file_selection_records_display_name() {
        let mut state = sample();
        state.set_value("thesis", pdf(1024)).unwrap();
        assert_eq!(state.values().get_file("thesis").map(|f| f.size), Some(1024));
        assert_eq!(state.file_display("thesis"), Some("thesis.pdf"));

        state.set_value("thesis", None::<SelectedFile>).unwrap();
        assert!(state.value("thesis").is_none());
        assert!(state.file_display("thesis").is_none());
    }

    #[test]
    fn oversized_file_is_discarded_despite_larger_max_size() {
        let mut state = sample();
        state.set_file("thesis", pdf(HARD_FILE_CAP + 1)).unwrap();

        assert!(state.value("thesis").is_none());
        assert!(state.file_display("thesis").is_none());
        assert_eq!(
            state.error("thesis"),
            Some("File size should not exceed 10MB")
        );
    }

    #[test]
    fn oversized_file_replaces_previous_selection() {
        let mut state = sample();
        state.set_file("thesis", pdf(10)).unwrap();
        state.set_file("thesis", pdf(HARD_FILE_CAP * 2)).unwrap();
        assert!(state.value("thesis").is_none());
        assert!(state.file_display("thesis").is_none());
    }

    #[test]
    fn file_at_exact_cap_is_accepted() {
        let mut state = sample();
        state.set_file("thesis", pdf(HARD_FILE_CAP)).unwrap();
        assert!(state.value("thesis").is_some());
        assert!(state.error("thesis").is_none());
    }

    #[test]
    fn configured_cap_applies() {
        let config = EngineConfig {
            max_upload: "1KB".into(),
            ..EngineConfig::default()
        };
        let mut state = FormState::with_config(
            FieldSet::new(vec![FieldDescriptor::file("doc", [".pdf"])]).unwrap(),
            FormValues::new(),
            &config,
        )
        .unwrap();
        state.set_file("doc", pdf(2048)).unwrap();
        assert_eq!(state.error("doc"), Some("File size should not exceed 1KB"));
    }

    #[test]
    fn clear_file_leaves_other_fields() {
        let mut state = sample();
        state.set_value("agree", true).unwrap();
        state.set_file("thesis", pdf(5)).unwrap();
        state.clear_file("thesis").unwrap();
        assert_eq!(state.values().get_bool("agree"), Some(true));
        assert!(state.value("thesis").is_none());
    }

    #[test]
    fn set_errors_drops_unknown_and_orders_by_descriptor() {
        let mut state = sample();
        state.set_errors(FieldErrors::from_iter([
            ("thesis", "t"),
            ("ghost", "g"),
            ("email", "e"),
        ]));
        assert_eq!(
            state.errors().names().collect::<Vec<_>>(),
            vec!["email", "thesis"]
        );
    }

    #[test]
    fn reset_restores_initial_snapshot() {
        let mut state = sample();
        state.set_value("email", "x").unwrap();
        state.set_value("agree", true).unwrap();
        state.set_file("thesis", pdf(5)).unwrap();
        state.set_errors(FieldErrors::from_iter([("email", "bad")]));
        assert!(state.is_dirty());

        state.reset();
        assert_eq!(state.values(), state.initial_values());
        assert!(state.errors().is_empty());
        assert!(state.file_display("thesis").is_none());
        assert!(!state.is_dirty());
    }

    #[test]
    fn initial_file_keeps_display_after_reset() {
        let mut state = FormState::from_descriptors(
            vec![FieldDescriptor::file("cv", [".pdf"])],
            FormValues::new().with("cv", SelectedFile::new("cv.pdf", 3, "application/pdf")),
        )
        .unwrap();
        assert_eq!(state.file_display("cv"), Some("cv.pdf"));
        state.clear_file("cv").unwrap();
        state.reset();
        assert_eq!(state.file_display("cv"), Some("cv.pdf"));
    }
}
