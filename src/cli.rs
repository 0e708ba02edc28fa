//! CLI definitions for Heurix.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Heurix CLI.
#[derive(Parser)]
#[command(name = "heurix")]
#[command(about = "Heuristic UX inspector for web pages")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "heurix.toml", global = true, env = "HEURIX_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Analyze a page from its scraped metrics
    Analyze {
        /// JSON file holding `{"url": ..., "metrics": {...}}`
        #[arg(long)]
        context: PathBuf,

        /// Ignore cached insights and prompt the model
        #[arg(long)]
        force: bool,

        /// Run a second analysis that keeps the first score
        #[arg(long)]
        again: bool,

        /// Write a Markdown report of the runs to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Cache management commands
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum CacheAction {
    /// List cached scores and insights
    Show {
        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Remove every cached score and insight
    Clear,
}
