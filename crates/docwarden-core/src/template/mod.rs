//! Import template loading and field mapping.

mod bitwarden;

pub use bitwarden::BitwardenIdentityMapper;

use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::error::Result;
use crate::json::write_pretty_json;
use crate::models::extraction::ExtractionResult;

/// Trait for rules that overlay extracted fields onto an import template.
pub trait TemplateMapper: Send + Sync {
    /// Apply the rules to `template` in place.
    fn apply(&self, result: &ExtractionResult, template: &mut Value) -> Result<()>;
}

/// Read and parse a JSON template.
pub fn load_template(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load `template_path`, apply `mapper`, and write the result to `output_path`.
pub fn map_template_file(
    mapper: &dyn TemplateMapper,
    result: &ExtractionResult,
    template_path: &Path,
    output_path: &Path,
) -> Result<Value> {
    let mut template = load_template(template_path)?;
    mapper.apply(result, &mut template)?;
    write_pretty_json(output_path, &template)?;

    info!("Wrote mapped template to {}", output_path.display());
    Ok(template)
}
