use std::collections::HashMap;
use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::FormError;

/// An opaque handle to a file the user selected.
///
/// The engine only inspects `name`, `size` and `mime_type`. `data` is carried
/// through to the submit handler untouched; encoding it (multipart or
/// otherwise) is the handler's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    /// Original filename, including extension.
    pub name: String,

    /// Size in bytes.
    pub size: u64,

    /// Declared MIME type. Empty when the host could not determine one.
    #[serde(default)]
    pub mime_type: String,

    #[serde(skip)]
    pub data: Option<Bytes>,
}

impl SelectedFile {
    #[must_use]
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
            data: None,
        }
    }

    /// Attach the file payload.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Lowercased extension including the leading dot, e.g. `".pdf"`.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
    }
}

/// The current value of a single field.
///
/// An absent entry in [`FormValues`] means "undefined".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    File(SelectedFile),
}

impl FieldValue {
    /// Whether this value counts as "not provided" for required checks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Bool(b) => !b,
            Self::File(_) => false,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_file(&self) -> Option<&SelectedFile> {
        match self {
            Self::File(f) => Some(f),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<SelectedFile> for FieldValue {
    fn from(f: SelectedFile) -> Self {
        Self::File(f)
    }
}

/// Whether an optional value counts as empty. Absence is empty.
#[must_use]
pub fn is_empty_value(value: Option<&FieldValue>) -> bool {
    value.is_none_or(FieldValue::is_empty)
}

/// A set of field values, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValues {
    #[serde(flatten)]
    values: HashMap<String, FieldValue>,
}

impl FormValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.values.remove(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.values.get(name)?.as_text()
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.values.get(name)?.as_bool()
    }

    #[must_use]
    pub fn get_file(&self, name: &str) -> Option<&SelectedFile> {
        self.values.get(name)?.as_file()
    }

    /// Build values from a loosely typed JSON object.
    ///
    /// Strings and booleans map directly. Numbers become their text form,
    /// objects are read as [`SelectedFile`] and `null` entries are skipped.
    pub fn from_json(json: serde_json::Value) -> Result<Self, FormError> {
        let serde_json::Value::Object(map) = json else {
            return Err(FormError::SchemaParse {
                error: "values must be a JSON object".into(),
            });
        };

        let mut values = Self::new();
        for (name, raw) in map {
            let value = match raw {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => FieldValue::Text(s),
                serde_json::Value::Bool(b) => FieldValue::Bool(b),
                serde_json::Value::Number(n) => FieldValue::Text(n.to_string()),
                obj @ serde_json::Value::Object(_) => {
                    let file: SelectedFile =
                        serde_json::from_value(obj).map_err(|e| FormError::SchemaParse {
                            error: format!("value for `{name}`: {e}"),
                        })?;
                    FieldValue::File(file)
                }
                serde_json::Value::Array(_) => {
                    return Err(FormError::SchemaParse {
                        error: format!("value for `{name}` cannot be an array"),
                    });
                }
            };
            values.values.insert(name, value);
        }
        Ok(values)
    }
}

impl FromIterator<(String, FieldValue)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
