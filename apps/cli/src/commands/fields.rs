use std::process::ExitCode;

use intake_form::file::{format_size, parse_human_size};
use intake_form::prelude::*;

use super::{load_schema, print_json};
use crate::cli::{OutputFormat, SchemaArgs};

pub fn execute(args: &SchemaArgs, output: OutputFormat) -> anyhow::Result<ExitCode> {
    let fields = load_schema(&args.schema)?;
    match output {
        OutputFormat::Json => print_json(&fields)?,
        OutputFormat::Text => {
            for field in &fields {
                println!("{}", describe(field));
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// One line per field: name, control, then flags and constraints.
fn describe(field: &FieldDescriptor) -> String {
    let mut parts = vec![field.name.clone(), control_name(&field.kind)];
    if field.required {
        parts.push("required".into());
    }
    if field.label.is_some() {
        parts.push(format!("label={:?}", field.display_label()));
    }
    match &field.kind {
        FieldKind::Input(c) => {
            if let Some(n) = c.min_length {
                parts.push(format!("min_length={n}"));
            }
            if let Some(min) = c.min {
                parts.push(format!("min={min}"));
            }
            if let Some(max) = c.max {
                parts.push(format!("max={max}"));
            }
            if let Some(pattern) = &c.pattern {
                parts.push(format!("pattern={:?}", pattern.as_str()));
            }
        }
        FieldKind::Textarea(o) => {
            if let Some(n) = o.min_length {
                parts.push(format!("min_length={n}"));
            }
            if let Some(n) = o.max_length {
                parts.push(format!("max_length={n}"));
            }
        }
        FieldKind::Select { options } => {
            let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
            parts.push(format!("options={}", values.join("|")));
        }
        FieldKind::Checkbox => {}
        FieldKind::File(rules) => {
            if !rules.accept.is_empty() {
                parts.push(format!("accept={}", rules.accept.join(",")));
            }
            if let Some(max_size) = &rules.max_size {
                match parse_human_size(max_size) {
                    Some(bytes) => parts.push(format!("max_size={}", format_size(bytes))),
                    None => parts.push(format!("max_size={max_size:?} (ignored)")),
                }
            }
        }
    }
    parts.join("  ")
}

fn control_name(kind: &FieldKind) -> String {
    match intake_form::render::control_for(kind) {
        Control::Input { input } => format!("input[{}]", input.html_type()),
        Control::TextArea { .. } => "textarea".into(),
        Control::Select { .. } => "select".into(),
        Control::Checkbox => "checkbox".into(),
        Control::FileInput { .. } => "file".into(),
    }
}
