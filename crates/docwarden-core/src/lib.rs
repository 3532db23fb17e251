//! Core library for turning identity documents into Bitwarden import files.
//!
//! This crate provides:
//! - A Google Document AI client that flattens detected entities into fields
//! - Credential discovery for service-account and user credentials
//! - Bitwarden identity template mapping
//! - The pipeline tying extraction, snapshot and mapping together

pub mod error;
pub mod extraction;
pub mod json;
pub mod models;
pub mod pipeline;
pub mod template;

pub use error::{DocwardenError, Result, ServiceError, TemplateError};
pub use extraction::{Credentials, CredentialsConfig, DocumentAiClient, ProcessorPath};
pub use models::config::DocwardenConfig;
pub use models::extraction::{ExtractedField, ExtractionResult};
pub use pipeline::{Extraction, LiveRequest, Pipeline, PipelineReport};
pub use template::{BitwardenIdentityMapper, TemplateMapper};
