//! Analyze subcommand handler for Heurix.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use heurix_cache::{CacheStore, FileStore};
use heurix_config::Config;
use heurix_core::prompt::session_params;
use heurix_core::{markdown_report, AnalysisOrchestrator, RunOptions};
use heurix_provider_openai::OpenAIProvider;

use crate::adapters::{ConsoleSink, FilePageContextProvider};

/// Options of one `heurix analyze` invocation.
pub(crate) struct AnalyzeArgs {
    pub context: PathBuf,
    pub force: bool,
    pub again: bool,
    pub report: Option<PathBuf>,
}

/// Run one analysis, optionally followed by a score-locked second run.
pub(crate) async fn handle_analyze(
    config: &Config,
    args: AnalyzeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::new(&config.cache.data_dir).await?;
    let caches = Arc::new(CacheStore::new(Arc::new(store), &config.cache));
    let provider = OpenAIProvider::from_config(&config.model);
    info!("Using model '{}' at {}", provider.model(), config.model.base_url);

    let mut orchestrator = AnalysisOrchestrator::new(
        Arc::new(provider),
        session_params(&config.model),
        caches,
        Arc::new(FilePageContextProvider::new(&args.context)),
        Arc::new(ConsoleSink),
        config.analysis.clone(),
    );

    let first = if args.force {
        RunOptions::forced()
    } else {
        RunOptions::default()
    };
    let mut outcome = orchestrator.analyze(first).await;
    if args.again {
        if let Ok(previous) = &outcome {
            info!("Re-analyzing '{}' with the score locked", previous.cache_key);
            println!("\nAnalyzing again...");
            outcome = orchestrator.analyze(RunOptions::again()).await;
        }
    }

    if let Some(path) = &args.report {
        let url = match &outcome {
            Ok(outcome) => outcome.cache_key.clone(),
            Err(_) => args.context.display().to_string(),
        };
        write_report(path, &markdown_report(&url, orchestrator.history().iter())).await?;
    }

    orchestrator.shutdown().await;
    outcome?;
    Ok(())
}

async fn write_report(path: &Path, report: &str) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, report).await?;
    println!("\nReport written to {}", path.display());
    Ok(())
}
