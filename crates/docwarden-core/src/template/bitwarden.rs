//! Bitwarden identity item mapping.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::TemplateMapper;
use crate::error::{Result, TemplateError};
use crate::models::extraction::ExtractionResult;

/// Name of the custom field that receives the date of birth.
const DOB_FIELD: &str = "DOB";

/// Maps `name`, `dob` and `address` onto a Bitwarden identity template.
///
/// - `name` fills `identity.firstName` / `identity.lastName` and the item name
/// - `dob` fills the value of the first custom field named `DOB`, if any
/// - `address` fills `identity.address1` verbatim
///
/// Every other extracted field is ignored and every other template value is
/// left as loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitwardenIdentityMapper;

impl BitwardenIdentityMapper {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateMapper for BitwardenIdentityMapper {
    fn apply(&self, result: &ExtractionResult, template: &mut Value) -> Result<()> {
        let root = template.as_object_mut().ok_or(TemplateError::WrongType {
            path: "$".to_string(),
            expected: "an object",
        })?;

        if let Some(name) = result.get("name") {
            let (first, last) = split_name(name);
            let identity = identity_mut(root)?;
            identity.insert("firstName".to_string(), Value::from(first));
            identity.insert("lastName".to_string(), Value::from(last));
            root.insert("name".to_string(), Value::from(format!("{name} ID")));
            debug!("Mapped name to {:?} / {:?}", first, last);
        }

        if let Some(dob) = result.get("dob") {
            let fields = root
                .get_mut("fields")
                .ok_or_else(|| TemplateError::MissingKey("fields".to_string()))?
                .as_array_mut()
                .ok_or(TemplateError::WrongType {
                    path: "fields".to_string(),
                    expected: "an array",
                })?;

            match dob_index(fields)? {
                Some(i) => {
                    fields[i]["value"] = Value::from(dob);
                }
                None => warn!("Template has no {} field, date of birth not mapped", DOB_FIELD),
            }
        }

        if let Some(address) = result.get("address") {
            identity_mut(root)?.insert("address1".to_string(), Value::from(address));
        }

        Ok(())
    }
}

/// First and last whitespace-separated token; a single token fills both.
fn split_name(name: &str) -> (&str, &str) {
    let mut tokens = name.split_whitespace();
    let first = tokens.next().unwrap_or("");
    let last = tokens.next_back().unwrap_or(first);
    (first, last)
}

/// Index of the first `DOB` entry. Entries before it must be objects with a `name`.
fn dob_index(fields: &[Value]) -> Result<Option<usize>> {
    for (i, entry) in fields.iter().enumerate() {
        let entry = entry.as_object().ok_or_else(|| TemplateError::WrongType {
            path: format!("fields[{i}]"),
            expected: "an object",
        })?;
        let name = entry
            .get("name")
            .ok_or_else(|| TemplateError::MissingKey(format!("fields[{i}].name")))?;
        if *name == DOB_FIELD {
            return Ok(Some(i));
        }
    }
    Ok(None)
}

fn identity_mut(root: &mut Map<String, Value>) -> Result<&mut Map<String, Value>> {
    let identity = root
        .get_mut("identity")
        .ok_or_else(|| TemplateError::MissingKey("identity".to_string()))?
        .as_object_mut()
        .ok_or(TemplateError::WrongType {
            path: "identity".to_string(),
            expected: "an object",
        })?;
    Ok(identity)
}
