//! Process - extract fields from a document and write the Bitwarden import file.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use docwarden_core::{CredentialsConfig, DocwardenConfig, LiveRequest, Pipeline};

/// Arguments for processing a document.
#[derive(Args)]
pub struct ProcessArgs {
    /// The path to the input document file
    #[arg(long)]
    file_path: Option<PathBuf>,

    /// Your Google Cloud project ID
    #[arg(long)]
    project_id: Option<String>,

    /// The Google Cloud location of the Document AI processor (e.g. 'us')
    #[arg(long)]
    location: Option<String>,

    /// Your Document AI processor ID
    #[arg(long)]
    processor_id: Option<String>,

    /// The mime type of the input file [default: application/pdf]
    #[arg(long)]
    mime_type: Option<String>,

    /// Service account or user credentials JSON file. Falls back to
    /// GOOGLE_APPLICATION_CREDENTIALS, then the gcloud default credentials
    #[arg(long)]
    credentials: Option<PathBuf>,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    let mime_type = args
        .mime_type
        .unwrap_or_else(|| config.service.default_mime_type.clone());
    let credentials = CredentialsConfig::new(
        args.credentials.or_else(|| config.service.credentials.clone()),
    );
    let request = LiveRequest::from_parts(
        args.file_path,
        args.project_id,
        args.location,
        args.processor_id,
        mime_type,
    );

    let pipeline = Pipeline::new(config, credentials);

    let extraction = match &request {
        Some(req) => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
            pb.set_message(format!(
                "Processing {} with Google Document AI...",
                req.file_path.display()
            ));
            pb.enable_steady_tick(Duration::from_millis(100));

            let extraction = pipeline.extract(Some(req)).await;
            pb.finish_and_clear();
            extraction?
        }
        None => {
            println!(
                "{} Using sample data because not all Document AI arguments were provided.",
                style("ℹ").blue()
            );
            pipeline.extract(None).await?
        }
    };

    debug!("Extracted {} fields", extraction.result().len());

    let snapshot_path = pipeline.write_snapshot(&extraction)?;
    println!(
        "{} Successfully created {}",
        style("✓").green(),
        snapshot_path.display()
    );

    let output_path = pipeline.write_import(&extraction)?;
    println!(
        "{} Successfully mapped data and saved to {}",
        style("✓").green(),
        output_path.display()
    );

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Explicit config file, else the default one if it exists, else defaults.
fn load_config(config_path: Option<&str>) -> anyhow::Result<DocwardenConfig> {
    if let Some(path) = config_path {
        return Ok(DocwardenConfig::from_file(Path::new(path))?);
    }

    let default_path = DocwardenConfig::default_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(DocwardenConfig::from_file(&default_path)?)
    } else {
        Ok(DocwardenConfig::default())
    }
}
