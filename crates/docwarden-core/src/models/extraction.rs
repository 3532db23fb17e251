//! Extraction result data model.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single named value pulled out of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedField {
    /// Entity type assigned by the extraction service (e.g. `name`, `dob`).
    pub name: String,
    /// Normalized text when available, otherwise the raw mention text.
    pub value: String,
}

impl ExtractedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Flat mapping of field name to value for one document.
///
/// Names are unique; inserting an existing name replaces its value but keeps
/// the position it was first seen at. Serializes as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    fields: IndexMap<String, String>,
}

impl ExtractionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// The record used when no live extraction parameters were supplied.
    pub fn fallback() -> Self {
        [
            ExtractedField::new("name", "John Doe"),
            ExtractedField::new("dob", "01/01/1990"),
            ExtractedField::new("address", "123 Main St, Anytown, USA"),
        ]
        .into_iter()
        .collect()
    }

    /// Insert a field, returning the value it replaced.
    pub fn insert(&mut self, field: ExtractedField) -> Option<String> {
        self.fields.insert(field.name, field.value)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate `(name, value)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<ExtractedField> for ExtractionResult {
    fn from_iter<I: IntoIterator<Item = ExtractedField>>(iter: I) -> Self {
        let mut result = Self::new();
        for field in iter {
            result.insert(field);
        }
        result
    }
}
