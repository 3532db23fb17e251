//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for docwarden.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocwardenConfig {
    /// Input and output file locations.
    pub paths: PathsConfig,

    /// Document AI service configuration.
    pub service: ServiceConfig,
}

/// Files read and written by a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Bitwarden import template (read-only).
    pub template: PathBuf,

    /// Snapshot of the raw extraction result.
    pub snapshot: PathBuf,

    /// Mapped template ready for import.
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from("bitwarden_id_template.json"),
            snapshot: PathBuf::from("export.json"),
            output: PathBuf::from("import_bitwarden.json"),
        }
    }
}

/// Document AI service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Mime type sent when none is given on the command line.
    pub default_mime_type: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Override for the location-derived endpoint.
    pub endpoint: Option<String>,

    /// Credentials file used when none is given on the command line.
    pub credentials: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_mime_type: "application/pdf".to_string(),
            timeout_secs: 60,
            endpoint: None,
            credentials: None,
        }
    }
}

impl DocwardenConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Default location of the user configuration file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docwarden")
            .join("config.json")
    }
}
