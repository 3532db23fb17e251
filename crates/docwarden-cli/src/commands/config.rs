//! Config command - inspect, seed and check the configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use docwarden_core::template::load_template;
use docwarden_core::{CredentialsConfig, DocwardenConfig};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the configuration file location and its effective values
    Show,

    /// Write a configuration file, optionally seeded with paths and service settings
    Init(InitArgs),

    /// Print one value (e.g. "paths.template" or "service.timeout_secs")
    Get {
        key: String,
    },

    /// Check that the template can be mapped and that credentials can be found
    Check,
}

#[derive(Args)]
struct InitArgs {
    /// Where to write the file [default: user config directory]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Bitwarden template to read
    #[arg(long)]
    template: Option<PathBuf>,

    /// Credentials file to use for Document AI
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Document AI endpoint override
    #[arg(long)]
    endpoint: Option<String>,

    /// Replace an existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(),
        ConfigCommand::Init(init_args) => init_config(init_args),
        ConfigCommand::Get { key } => get_config(&key),
        ConfigCommand::Check => check_config(),
    }
}

/// The saved config, or defaults when no file exists yet.
fn effective_config() -> anyhow::Result<(DocwardenConfig, bool)> {
    let path = DocwardenConfig::default_path();
    if path.exists() {
        Ok((DocwardenConfig::from_file(&path)?, true))
    } else {
        Ok((DocwardenConfig::default(), false))
    }
}

fn show_config() -> anyhow::Result<()> {
    let (config, saved) = effective_config()?;

    let status = if saved {
        style("exists").green()
    } else {
        style("not created, showing defaults").yellow()
    };
    println!(
        "Configuration file: {} ({})",
        DocwardenConfig::default_path().display(),
        status
    );
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(DocwardenConfig::default_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    let mut config = DocwardenConfig::default();
    if let Some(template) = args.template {
        if !template.exists() {
            println!(
                "{} Template {} does not exist yet",
                style("!").yellow(),
                template.display()
            );
        }
        config.paths.template = template;
    }
    config.service.credentials = args.credentials;
    config.service.endpoint = args.endpoint;

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn get_config(key: &str) -> anyhow::Result<()> {
    let (config, _) = effective_config()?;
    let json = serde_json::to_value(&config)?;

    let mut current = &json;
    let mut walked = Vec::new();
    for part in key.split('.') {
        current = match current.get(part) {
            Some(next) => next,
            None => {
                let scope = if walked.is_empty() {
                    "top level".to_string()
                } else {
                    format!("'{}'", walked.join("."))
                };
                anyhow::bail!(
                    "Unknown configuration key '{}'. Available at {}: {}",
                    key,
                    scope,
                    child_keys(current)
                );
            }
        };
        walked.push(part);
    }

    match current {
        Value::String(s) => println!("{s}"),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }

    Ok(())
}

fn child_keys(value: &Value) -> String {
    match value.as_object() {
        Some(map) => map.keys().cloned().collect::<Vec<_>>().join(", "),
        None => "(none, not a section)".to_string(),
    }
}

fn check_config() -> anyhow::Result<()> {
    let (config, _) = effective_config()?;
    let mut problems = 0;

    match check_template(&config.paths.template) {
        Ok(()) => println!(
            "{} Template {} has identity and DOB slots",
            style("✓").green(),
            config.paths.template.display()
        ),
        Err(reason) => {
            problems += 1;
            println!(
                "{} Template {}: {}",
                style("✗").red(),
                config.paths.template.display(),
                reason
            );
        }
    }

    match CredentialsConfig::new(config.service.credentials.clone()).resolve_path() {
        Ok(path) if path.exists() => println!(
            "{} Credentials {}",
            style("✓").green(),
            path.display()
        ),
        Ok(path) => {
            problems += 1;
            println!(
                "{} Credentials {} not found",
                style("✗").red(),
                path.display()
            );
        }
        Err(e) => println!(
            "{} {} (only sample data can be used)",
            style("ℹ").blue(),
            e
        ),
    }

    if problems > 0 {
        anyhow::bail!("{} problem(s) found", problems);
    }
    Ok(())
}

/// The slots the Bitwarden mapping writes through must exist.
fn check_template(path: &Path) -> Result<(), String> {
    let template = load_template(path).map_err(|e| e.to_string())?;

    if !template.get("identity").is_some_and(Value::is_object) {
        return Err("missing 'identity' object".to_string());
    }
    let fields = template
        .get("fields")
        .and_then(Value::as_array)
        .ok_or_else(|| "missing 'fields' array".to_string())?;
    if !fields.iter().any(|f| f.get("name").is_some_and(|n| n == "DOB")) {
        return Err("no 'DOB' custom field, date of birth will not be mapped".to_string());
    }
    Ok(())
}
