//! End-to-end run: extract (or fall back), snapshot, map.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::extraction::{CredentialsConfig, DocumentAiClient, ProcessorPath};
use crate::json::write_pretty_json;
use crate::models::config::DocwardenConfig;
use crate::models::extraction::ExtractionResult;
use crate::template::{map_template_file, BitwardenIdentityMapper, TemplateMapper};

/// Everything needed for a live Document AI call.
#[derive(Debug, Clone)]
pub struct LiveRequest {
    pub processor: ProcessorPath,
    pub file_path: PathBuf,
    pub mime_type: String,
}

impl LiveRequest {
    /// Build a request only when every required parameter is present and non-empty.
    pub fn from_parts(
        file_path: Option<PathBuf>,
        project_id: Option<String>,
        location: Option<String>,
        processor_id: Option<String>,
        mime_type: String,
    ) -> Option<Self> {
        let supplied = |value: Option<String>| value.filter(|v| !v.is_empty());
        Some(Self {
            processor: ProcessorPath::new(
                supplied(project_id)?,
                supplied(location)?,
                supplied(processor_id)?,
            ),
            file_path: file_path.filter(|p| !p.as_os_str().is_empty())?,
            mime_type,
        })
    }
}

/// Where the extracted fields came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Returned by the extraction service.
    Live(ExtractionResult),
    /// The built-in sample record.
    Fallback(ExtractionResult),
}

impl Extraction {
    pub fn result(&self) -> &ExtractionResult {
        match self {
            Extraction::Live(r) | Extraction::Fallback(r) => r,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Extraction::Live(_))
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub extraction: Extraction,
    pub snapshot_path: PathBuf,
    pub output_path: PathBuf,
}

/// Sequences extraction, snapshot and template mapping.
pub struct Pipeline {
    config: DocwardenConfig,
    credentials: CredentialsConfig,
    mapper: Box<dyn TemplateMapper>,
}

impl Pipeline {
    /// Create a pipeline mapping onto the Bitwarden identity template.
    pub fn new(config: DocwardenConfig, credentials: CredentialsConfig) -> Self {
        Self {
            config,
            credentials,
            mapper: Box::new(BitwardenIdentityMapper::new()),
        }
    }

    /// Replace the template mapping rules.
    pub fn with_mapper(mut self, mapper: Box<dyn TemplateMapper>) -> Self {
        self.mapper = mapper;
        self
    }

    /// Obtain the fields: live when a request is given, otherwise the fallback record.
    pub async fn extract(&self, request: Option<&LiveRequest>) -> Result<Extraction> {
        match request {
            Some(req) => {
                info!("Processing {} with Document AI", req.file_path.display());
                let client = DocumentAiClient::from_config(
                    &self.config.service,
                    self.credentials.clone(),
                )?;
                let result = client
                    .process_document(&req.processor, &req.file_path, &req.mime_type)
                    .await?;
                Ok(Extraction::Live(result))
            }
            None => {
                info!("Using fallback record, live extraction parameters incomplete");
                Ok(Extraction::Fallback(ExtractionResult::fallback()))
            }
        }
    }

    /// Overwrite the snapshot file with the extracted fields.
    pub fn write_snapshot(&self, extraction: &Extraction) -> Result<&Path> {
        let path = &self.config.paths.snapshot;
        write_pretty_json(path, extraction.result())?;
        info!("Wrote extraction snapshot to {}", path.display());
        Ok(path)
    }

    /// Map the extracted fields onto the template and write the import file.
    pub fn write_import(&self, extraction: &Extraction) -> Result<&Path> {
        let paths = &self.config.paths;
        map_template_file(
            self.mapper.as_ref(),
            extraction.result(),
            &paths.template,
            &paths.output,
        )?;
        Ok(&paths.output)
    }

    /// Write the snapshot, then map the template.
    ///
    /// A mapping failure leaves the snapshot in place and no output file.
    pub fn persist(&self, extraction: Extraction) -> Result<PipelineReport> {
        let snapshot_path = self.write_snapshot(&extraction)?.to_path_buf();
        let output_path = self.write_import(&extraction)?.to_path_buf();

        Ok(PipelineReport {
            extraction,
            snapshot_path,
            output_path,
        })
    }

    /// Full run.
    pub async fn run(&self, request: Option<&LiveRequest>) -> Result<PipelineReport> {
        let extraction = self.extract(request).await?;
        self.persist(extraction)
    }
}
