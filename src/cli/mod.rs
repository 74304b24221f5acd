//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for onceholder using clap's derive macros.

pub mod commands;

use clap::{Parser, Subcommand};

use crate::errors::Result;

/// onceholder - lazy singleton holder toolkit
#[derive(Parser, Debug)]
#[command(name = "onceholder")]
#[command(version)]
#[command(about = "Race threads on a lazily constructed singleton", long_about = None)]
pub struct Cli {
    /// Configuration file path (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Spawn threads that race to construct one shared instance
    Race {
        /// Number of threads (default: race.threads from config)
        #[arg(long, short = 't')]
        threads: Option<usize>,

        /// Payload prefix, each thread appends its index (default: race.prefix)
        #[arg(long, short = 'p')]
        prefix: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

/// Dispatch a parsed command
pub fn run_cli(command: Commands) -> Result<()> {
    match command {
        Commands::Race {
            threads,
            prefix,
            json,
        } => commands::race(threads, prefix, json),
        Commands::Config { action } => match action {
            ConfigCommands::Generate { output_path, force } => {
                commands::config_management::config_generate(output_path, force)
            }
            ConfigCommands::Show => commands::config_management::config_show(),
        },
    }
}
