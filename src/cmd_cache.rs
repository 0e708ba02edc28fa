//! Cache subcommand handlers for Heurix.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use heurix_cache::{CacheStore, FileStore, InsightsCacheEntry, ScoreCacheEntry};
use heurix_config::Config;

use crate::cli::CacheAction;

/// Handle cache subcommands.
pub(crate) async fn handle_cache_command(
    config: &Config,
    action: CacheAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::new(&config.cache.data_dir).await?;
    let path = store.path().to_path_buf();
    let caches = CacheStore::new(Arc::new(store), &config.cache);
    caches.ensure_loaded().await;

    match action {
        CacheAction::Show { format } => cache_show(&caches, &format),
        CacheAction::Clear => {
            caches.clear().await;
            println!("Cleared caches in {}", path.display());
            Ok(())
        }
    }
}

/// List cached scores and insights.
fn cache_show(caches: &CacheStore, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let scores = caches.scores().snapshot();
    let insights = caches.insights().snapshot();

    if format == "json" {
        let json = serde_json::json!({ "scores": scores, "insights": insights });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!("Scores");
    println!("{:<50} {:>6}  {}", "KEY", "SCORE", "SIGNATURE");
    println!("{}", "-".repeat(80));
    let scores = entries(&scores, ScoreCacheEntry::from_value);
    if scores.is_empty() {
        println!("(none)");
    }
    for (key, entry) in scores {
        println!("{:<50} {:>6.1}  {}", key, entry.score, entry.signature);
    }

    println!("\nInsights");
    println!("{:<50} {:>6}  {}", "KEY", "ISSUES", "STORED");
    println!("{}", "-".repeat(80));
    let insights = entries(&insights, InsightsCacheEntry::from_value);
    if insights.is_empty() {
        println!("(none)");
    }
    for (key, entry) in insights {
        let stored = DateTime::<Utc>::from_timestamp_millis(entry.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| entry.timestamp.to_string());
        println!("{:<50} {:>6}  {}", key, entry.issues.len(), stored);
    }

    Ok(())
}

fn entries<T>(snapshot: &Value, parse: fn(&Value) -> Option<T>) -> Vec<(String, T)> {
    let mut entries: Vec<(String, T)> = snapshot
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(key, value)| parse(value).map(|entry| (key.clone(), entry)))
                .collect()
        })
        .unwrap_or_default();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}
