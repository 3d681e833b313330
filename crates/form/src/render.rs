//! Render binding: which control a field maps to and how it is styled.
//!
//! The engine does not draw anything. Hosts turn a [`FieldView`] into
//! their own widgets.

use serde::Serialize;

use crate::field::{FieldDescriptor, FieldKind, InputType};
use crate::option::SelectOption;
use crate::state::FormState;
use crate::values::FieldValue;

/// The concrete UI control for a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum Control {
    Input { input: InputType },
    TextArea { rows: Option<u32> },
    Select { options: Vec<SelectOption> },
    Checkbox,
    FileInput { accept: String },
}

/// Map a field kind to its control.
#[must_use]
pub fn control_for(kind: &FieldKind) -> Control {
    match kind {
        FieldKind::Input(c) => Control::Input { input: c.input },
        FieldKind::Textarea(o) => Control::TextArea { rows: o.rows },
        FieldKind::Select { options } => Control::Select {
            options: options.clone(),
        },
        FieldKind::Checkbox => Control::Checkbox,
        FieldKind::File(r) => Control::FileInput {
            accept: r.accept.join(","),
        },
    }
}

/// Border treatment for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderTone {
    Neutral,
    Focus,
    Error,
}

/// Visual state of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FieldStyle {
    pub border: BorderTone,
    /// Draw a focus ring.
    pub ring: bool,
}

/// Style for a field given its error and focus state. An error tone wins
/// over focus; the ring follows focus alone.
#[must_use]
pub fn field_style(has_error: bool, is_focused: bool) -> FieldStyle {
    let border = match (has_error, is_focused) {
        (true, _) => BorderTone::Error,
        (false, true) => BorderTone::Focus,
        (false, false) => BorderTone::Neutral,
    };
    FieldStyle {
        border,
        ring: is_focused,
    }
}

/// Everything a host needs to draw one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub placeholder: Option<&'a str>,
    pub help_text: Option<&'a str>,
    pub required: bool,
    pub control: Control,
    pub value: Option<&'a FieldValue>,
    pub error: Option<&'a str>,
    pub file_display: Option<&'a str>,
    pub style: FieldStyle,
}

impl<'a> FieldView<'a> {
    /// Views for every field of `state`, in descriptor order.
    #[must_use]
    pub fn collect(state: &'a FormState, focused: Option<&str>) -> Vec<Self> {
        state
            .descriptors()
            .iter()
            .map(|field| Self::of(state, field, focused == Some(field.name.as_str())))
            .collect()
    }

    fn of(state: &'a FormState, field: &'a FieldDescriptor, is_focused: bool) -> Self {
        let error = state.error(&field.name);
        Self {
            name: &field.name,
            label: field.display_label(),
            placeholder: field.placeholder.as_deref(),
            help_text: field.help_text.as_deref(),
            required: field.required,
            control: control_for(&field.kind),
            value: state.value(&field.name),
            error,
            file_display: state.file_display(&field.name),
            style: field_style(error.is_some(), is_focused),
        }
    }
}
