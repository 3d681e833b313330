use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::field::FieldDescriptor;

/// An ordered list of field descriptors with unique names.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FieldSet {
    fields: Vec<FieldDescriptor>,
}

#[derive(Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    fields: Vec<FieldDescriptor>,
}

impl FieldSet {
    /// Build a set, rejecting duplicate names.
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self, FormError> {
        ensure_unique(&fields)?;
        Ok(Self { fields })
    }

    /// Load a `{ "fields": [...] }` JSON document.
    pub fn from_json(text: &str) -> Result<Self, FormError> {
        let doc: SchemaDocument =
            serde_json::from_str(text).map_err(|e| FormError::SchemaParse {
                error: e.to_string(),
            })?;
        Self::new(doc.fields)
    }

    /// Load a TOML document with `[[fields]]` tables.
    pub fn from_toml(text: &str) -> Result<Self, FormError> {
        let doc: SchemaDocument = toml::from_str(text).map_err(|e| FormError::SchemaParse {
            error: e.to_string(),
        })?;
        Self::new(doc.fields)
    }

    /// Append a field, rejecting a duplicate name.
    pub fn push(&mut self, field: FieldDescriptor) -> Result<&mut Self, FormError> {
        if self.contains(&field.name) {
            return Err(FormError::DuplicateField { name: field.name });
        }
        self.fields.push(field);
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Mutable access, e.g. to attach a custom validator after loading.
    ///
    /// Renaming through this reference is caught when the set is mounted.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldDescriptor> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Fail on the first name that appears twice.
    pub fn check_unique(&self) -> Result<(), FormError> {
        ensure_unique(&self.fields)
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Vec<FieldDescriptor>> for FieldSet {
    type Error = FormError;

    fn try_from(fields: Vec<FieldDescriptor>) -> Result<Self, Self::Error> {
        Self::new(fields)
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

fn ensure_unique(fields: &[FieldDescriptor]) -> Result<(), FormError> {
    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields {
        if !seen.insert(field.name.as_str()) {
            return Err(FormError::DuplicateField {
                name: field.name.clone(),
            });
        }
    }
    Ok(())
}
