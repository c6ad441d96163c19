//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for padkit using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// padkit - sample export and kit packaging for hardware samplers
#[derive(Parser, Debug)]
#[command(name = "padkit")]
#[command(version, about, long_about = None)]
#[command(author = "padkit contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "padkit.toml", env = "PADKIT_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PADKIT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export one sample, or a batch of samples
    Export(commands::export::ExportArgs),

    /// Export a kit folder with its pad configuration
    Kit(commands::kit::KitArgs),

    /// Zip a recorded export
    Archive(commands::archive::ArchiveArgs),

    /// List recorded exports
    History(commands::history::HistoryArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

impl Cli {
    /// Run the selected command, returning the process exit code
    pub async fn execute(&self) -> anyhow::Result<i32> {
        match &self.command {
            Commands::Export(args) => args.execute(&self.config).await,
            Commands::Kit(args) => args.execute(&self.config).await,
            Commands::Archive(args) => args.execute(&self.config).await,
            Commands::History(args) => args.execute(&self.config).await,
            Commands::ValidateConfig(args) => args.execute(&self.config).await,
        }
    }
}
