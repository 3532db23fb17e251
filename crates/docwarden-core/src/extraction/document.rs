//! Document AI v1 REST wire types.

use std::fmt;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::models::extraction::{ExtractedField, ExtractionResult};

/// Fully qualified processor address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorPath {
    pub project_id: String,
    pub location: String,
    pub processor_id: String,
}

impl ProcessorPath {
    pub fn new(
        project_id: impl Into<String>,
        location: impl Into<String>,
        processor_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            location: location.into(),
            processor_id: processor_id.into(),
        }
    }

    /// Regional API endpoint serving this processor.
    pub fn endpoint(&self) -> String {
        format!("https://{}-documentai.googleapis.com", self.location)
    }
}

/// Formats as `projects/{project}/locations/{location}/processors/{id}`.
impl fmt::Display for ProcessorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/locations/{}/processors/{}",
            self.project_id, self.location, self.processor_id
        )
    }
}

/// Body of a `:process` call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest<'a> {
    raw_document: RawDocument<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument<'a> {
    content: String,
    mime_type: &'a str,
}

impl<'a> ProcessRequest<'a> {
    pub fn new(content: &[u8], mime_type: &'a str) -> Self {
        Self {
            raw_document: RawDocument {
                content: base64::engine::general_purpose::STANDARD.encode(content),
                mime_type,
            },
        }
    }
}

/// Response of a `:process` call. Only the parts we read are modelled.
#[derive(Debug, Default, Deserialize)]
pub struct ProcessResponse {
    #[serde(default)]
    pub document: Document,
}

#[derive(Debug, Default, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub entities: Vec<Entity>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(rename = "type", default)]
    pub entity_type: String,
    #[serde(default)]
    pub mention_text: String,
    pub normalized_value: Option<NormalizedValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NormalizedValue {
    #[serde(default)]
    pub text: String,
}

impl Entity {
    /// Normalized text if the service produced a normalized value, else the mention.
    pub fn value(&self) -> &str {
        match &self.normalized_value {
            Some(normalized) => &normalized.text,
            None => &self.mention_text,
        }
    }
}

impl Document {
    /// Flatten entities in response order; later entities of the same type win.
    pub fn to_extraction_result(&self) -> ExtractionResult {
        self.entities
            .iter()
            .map(|e| ExtractedField::new(e.entity_type.as_str(), e.value()))
            .collect()
    }
}

/// Google API error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}
