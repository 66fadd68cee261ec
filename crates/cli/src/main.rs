//! promptweave CLI — the main entry point.
//!
//! Commands:
//! - `format`   — Turn a transcript (and memory note) into a prompt
//! - `split`    — Re-label generated text at embedded end markers
//! - `catalog`  — Inspect the template catalog
//! - `config`   — Show, locate or validate the configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "promptweave",
    about = "promptweave — chat transcript to prompt template formatter",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

/// Template selection shared by `format` and `split`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TemplateArgs {
    /// Model family (overrides config)
    #[arg(short, long)]
    pub family: Option<String>,

    /// Version within the family
    #[arg(long = "template-version")]
    pub version: Option<String>,

    /// Catalog file (.toml or .json) replacing the built-in templates
    #[arg(long, env = "PROMPTWEAVE_CATALOG")]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Format a transcript into a prompt
    Format {
        /// Transcript file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        transcript: PathBuf,

        /// Memory note file (`System:<text>|||<memory>`)
        #[arg(short, long)]
        memory: Option<PathBuf>,

        /// Print a JSON object with the prompt and its flags
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        template: TemplateArgs,
    },

    /// Split generated text into labelled turns
    Split {
        /// Generated text file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        #[command(flatten)]
        template: TemplateArgs,
    },

    /// Inspect the template catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List every template entry
    List {
        /// Catalog file replacing the built-in templates
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Show the resolved markers of one entry
    Show {
        family: String,
        #[arg(long = "template-version")]
        version: Option<String>,
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
    /// Validate the configuration file
    Validate,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the prompt
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Format {
            transcript,
            memory,
            json,
            template,
        } => commands::format::run(&transcript, memory.as_deref(), json, &template)?,
        Commands::Split { input, template } => commands::split::run(&input, &template)?,
        Commands::Catalog { action } => match action {
            CatalogAction::List { catalog } => commands::catalog::list(catalog.as_deref())?,
            CatalogAction::Show {
                family,
                version,
                catalog,
            } => commands::catalog::show(&family, version.as_deref(), catalog.as_deref())?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show()?,
            ConfigAction::Path => commands::config_cmd::path()?,
            ConfigAction::Validate => commands::config_cmd::validate()?,
        },
    }

    Ok(())
}
