//! Render sink protocol.
//!
//! The sink is the UI layer. Streaming callbacks receive one field at a time;
//! `render_final` replaces everything at once.

use crate::error::AnalysisError;
use crate::types::{AnalysisResult, IssueDraft};

pub trait RenderSink: Send + Sync {
    /// Show a placeholder until the first field arrives.
    fn render_pending(&self) {}

    fn render_score(&self, score: f64);

    fn render_strengths(&self, strengths: &[String]);

    fn render_issues(&self, issues: &[IssueDraft]);

    fn render_summary(&self, summary: &str);

    /// Show a completed result. `from_cache` is set for cache hits.
    fn render_final(&self, result: &AnalysisResult, from_cache: bool);

    fn render_failure(&self, error: &AnalysisError);

    /// Return the UI to its pre-analysis state.
    fn render_reset(&self) {}
}
