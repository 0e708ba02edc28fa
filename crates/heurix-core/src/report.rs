//! Markdown export of analysis history.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use heurix_protocols::AnalysisResult;

use crate::finalize::heuristic_weight;

/// Render `results` (oldest first) as a Markdown report for `url`.
pub fn markdown_report<'a>(url: &str, results: impl IntoIterator<Item = &'a AnalysisResult>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Usability report");
    let _ = writeln!(out);
    let _ = writeln!(out, "Page: <{url}>");

    let mut count = 0;
    for (index, result) in results.into_iter().enumerate() {
        count += 1;
        let _ = writeln!(out);
        let _ = writeln!(out, "## Run {} ({})", index + 1, format_timestamp(result.timestamp));
        let _ = writeln!(out);
        match result.display_score() {
            Some(score) => {
                let _ = writeln!(out, "**Usability score:** {score}/100");
            }
            None => {
                let _ = writeln!(out, "**Usability score:** n/a");
            }
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", result.summary);

        if !result.strengths.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "### Strengths");
            let _ = writeln!(out);
            for strength in &result.strengths {
                let _ = writeln!(out, "- {strength}");
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "### Issues");
        let _ = writeln!(out);
        if result.issues.is_empty() {
            let _ = writeln!(out, "No issues found.");
        }
        for (rank, issue) in result.issues.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. **{}** ({} severity, heuristic {}, weight {})",
                rank + 1,
                issue.title,
                issue.severity,
                issue.heuristic_number,
                heuristic_weight(issue.heuristic_number)
            );
            let _ = writeln!(out, "   - Category: {}", issue.category);
            let _ = writeln!(out, "   - Location: `{}`", issue.location);
            let _ = writeln!(out, "   - Problem: {}", issue.description);
            let _ = writeln!(out, "   - Impact: {}", issue.impact);
            let _ = writeln!(out, "   - Recommendation: {}", issue.recommendation);
        }
    }

    if count == 0 {
        let _ = writeln!(out);
        let _ = writeln!(out, "No completed analyses.");
    }
    out
}

fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}
