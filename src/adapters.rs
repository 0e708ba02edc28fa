//! Console-side collaborators of the orchestrator.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use heurix_protocols::{
    display_score, AnalysisError, AnalysisResult, IssueDraft, PageContext, PageContextProvider,
    RenderSink,
};

/// Reads the page context from a JSON file on every run, so edits between
/// runs are picked up.
pub(crate) struct FilePageContextProvider {
    path: PathBuf,
}

impl FilePageContextProvider {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PageContextProvider for FilePageContextProvider {
    async fn page_context(&self) -> Result<PageContext, AnalysisError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| AnalysisError::PageContext(format!("{}: {}", self.path.display(), e)))?;
        let context: PageContext = serde_json::from_str(&content)
            .map_err(|e| AnalysisError::PageContext(format!("{}: {}", self.path.display(), e)))?;
        debug!("Read page context for '{}'", context.url);
        Ok(context)
    }
}

/// Prints streamed fields and final results to stdout.
pub(crate) struct ConsoleSink;

impl RenderSink for ConsoleSink {
    fn render_pending(&self) {
        println!("Analyzing...");
    }

    fn render_score(&self, score: f64) {
        if let Some(score) = display_score(score) {
            println!("  score: {}/100", score);
        }
    }

    fn render_strengths(&self, strengths: &[String]) {
        println!("  strengths: {}", strengths.join("; "));
    }

    fn render_issues(&self, issues: &[IssueDraft]) {
        let titles: Vec<&str> = issues.iter().map(|issue| issue.title.as_str()).collect();
        println!("  issues: {}", titles.join("; "));
    }

    fn render_summary(&self, summary: &str) {
        println!("  summary: {}", summary);
    }

    fn render_final(&self, result: &AnalysisResult, from_cache: bool) {
        println!();
        let source = if from_cache { " (cached)" } else { "" };
        match result.display_score() {
            Some(score) => println!("Usability score: {}/100{}", score, source),
            None => println!("Usability score: n/a{}", source),
        }
        println!("{}", result.summary);

        if !result.strengths.is_empty() {
            println!("\nStrengths:");
            for strength in &result.strengths {
                println!("  + {}", strength);
            }
        }

        println!("\nIssues:");
        if result.issues.is_empty() {
            println!("  none");
        }
        for (rank, issue) in result.issues.iter().enumerate() {
            println!(
                "  {}. [{}] {} (heuristic {})",
                rank + 1,
                issue.severity,
                issue.title,
                issue.heuristic_number
            );
            println!("     {} -> {}", issue.location, issue.recommendation);
        }
    }

    fn render_failure(&self, error: &AnalysisError) {
        eprintln!("Analysis failed: {}", error);
    }
}
