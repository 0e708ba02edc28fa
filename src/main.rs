//! Heurix - heuristic UX inspector
//!
//! Main entry point for the Heurix CLI.

mod adapters;
mod cli;
mod cmd_analyze;
mod cmd_cache;

use std::path::Path;

use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use heurix_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};

use crate::cli::{Cli, Commands};
use crate::cmd_analyze::{handle_analyze, AnalyzeArgs};
use crate::cmd_cache::handle_cache_command;

/// Initialize tracing with console and optional file output.
///
/// Log files are written to `{data_dir}/logs/` with daily rotation.
fn init_tracing(logging: &LoggingConfig, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    // Console output goes to stderr so rendered results stay clean on stdout
    let console = fmt::layer()
        .with_target(true)
        .with_ansi(true)
        .with_writer(std::io::stderr);

    let file = if logging.file {
        let log_dir = data_dir.join("logs");
        std::fs::create_dir_all(&log_dir)?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("heurix")
            .filename_suffix("log")
            .max_log_files(14)
            .build(&log_dir)?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // Keep the worker alive for the program duration
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .init();

    Ok(())
}

/// Load and validate the configuration. Warnings are returned for logging once
/// tracing is up.
fn load_config(path: &Path) -> Result<(Config, Vec<String>), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_or_default(path)?;
    let validation = ConfigValidator::validate(&config);
    if !validation.is_valid() {
        let errors: Vec<String> = validation
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        return Err(format!("invalid configuration: {}", errors.join("; ")).into());
    }
    let warnings = validation
        .warnings
        .iter()
        .map(|w| format!("{}: {}", w.path, w.message))
        .collect();
    Ok((config, warnings))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (config, warnings) = load_config(&cli.config)?;
    init_tracing(&config.logging, &config.cache.data_dir)?;
    info!("Loaded configuration from {}", cli.config.display());
    for warning in warnings {
        warn!("Config: {}", warning);
    }

    match cli.command {
        Commands::Analyze {
            context,
            force,
            again,
            report,
        } => {
            let args = AnalyzeArgs {
                context,
                force,
                again,
                report,
            };
            handle_analyze(&config, args).await
        }
        Commands::Cache { action } => handle_cache_command(&config, action).await,
    }
}
