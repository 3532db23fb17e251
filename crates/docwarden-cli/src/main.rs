//! CLI that turns identity documents into Bitwarden import files.

mod commands;

use clap::{Parser, Subcommand};
use console::style;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use commands::{config, process};

/// Extract identity fields with Google Document AI and map them onto a Bitwarden template
#[derive(Parser)]
#[command(name = "docwarden")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(flatten)]
    process: process::ProcessArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let outcome = match cli.command {
        Some(Commands::Config(args)) => config::run(args).await,
        None => process::run(cli.process, cli.config.as_deref()).await,
    };

    // Errors end the run here; the exit status stays successful.
    if let Err(e) = outcome {
        debug!("{e:?}");
        eprintln!("{} An error occurred: {e:#}", style("✗").red());
    }

    Ok(())
}
