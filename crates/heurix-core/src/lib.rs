//! # Heurix Core
//!
//! Drives analysis runs: canonicalizes and signs the page context, consults
//! the caches, streams the model response through the extractor and
//! reconciler, and finalizes the result into the caches and history.

pub mod context;
pub mod finalize;
pub mod history;
pub mod orchestrator;
pub mod prompt;
pub mod report;
pub mod session;

pub use context::CanonicalContext;
pub use finalize::{heuristic_weight, parse_final, rank_issues, ParsedAnalysis};
pub use history::AnalysisHistory;
pub use orchestrator::{AnalysisOrchestrator, RunOptions, RunOutcome, RunState};
pub use report::markdown_report;
pub use session::AnalysisSession;
