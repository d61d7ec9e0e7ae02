//! # bagmind CLI Module
//!
//! This module implements the CLI interface for bagmind.
//!
//! ## Available Commands
//!
//! - `run` - Feed a task file to a fresh memory and run cycles
//! - `check` - Parse a task file and report syntax errors
//! - `config` - Print the effective configuration as TOML

mod commands;

use crate::settings;
use bagmind_core::MindError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// bagmind - a bounded-resource reasoning memory
///
/// Concepts compete for a fixed budget of attention; the weakest are
/// forgotten when the memory is full.
#[derive(Parser, Debug)]
#[command(name = "bagmind")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Override the random seed of the configuration
    #[arg(short, long, global = true)]
    pub seed: Option<u64>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run cycles over the tasks in a file
    Run {
        /// Task file, one task per line
        #[arg(short, long)]
        input: PathBuf,

        /// Number of cycles to run
        #[arg(short = 'n', long, default_value = "100")]
        cycles: u64,

        /// Start from the small preset instead of the defaults
        #[arg(short, long)]
        micro: bool,
    },

    /// Parse a task file without running it
    Check {
        /// Task file, one task per line
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Start from the small preset instead of the defaults
        #[arg(short, long)]
        micro: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), MindError> {
    let json_mode = cli.json_mode;
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run {
            input,
            cycles,
            micro,
        } => {
            let config = settings::effective_config(config_path, micro, cli.seed)?;
            cmd_run(config, &input, cycles, json_mode)
        }
        Commands::Check { input } => cmd_check(&input, json_mode),
        Commands::Config { micro } => {
            let config = settings::effective_config(config_path, micro, cli.seed)?;
            cmd_config(&config, json_mode)
        }
    }
}
