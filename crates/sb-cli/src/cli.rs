//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Shows how much time you've spent waiting for your infrastructure stacks.
///
/// Reconstructs discrete actions (create, update, delete, rollback) from the
/// raw lifecycle-event history of every stack and aggregates how long each
/// transition pattern took.
#[derive(Debug, Parser)]
#[command(name = "stackblame", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconstruct actions across all stacks and print the blame report.
    Report {
        /// Output as JSON instead of human-readable text.
        #[arg(long)]
        json: bool,

        /// Only include actions that started within the last N days.
        /// Overrides the configured retention window.
        #[arg(long)]
        retention_days: Option<u32>,
    },

    /// List the stacks known to the event source.
    Stacks {
        /// Output as JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },
}
