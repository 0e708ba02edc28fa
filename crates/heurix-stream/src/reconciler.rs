//! Incremental rendering of stream snapshots.

use heurix_protocols::{RenderSink, StreamSnapshot};
use tracing::debug;

/// Fields rendered by one [`StreamReconciler::reconcile`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
    pub score: bool,
    pub strengths: bool,
    pub issues: bool,
    pub summary: bool,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        !(self.score || self.strengths || self.issues || self.summary)
    }
}

/// Tracks what has been rendered during one run and renders only what changed.
///
/// Under a score lock the locked value is shown at [`begin`](Self::begin) and
/// streamed scores are ignored for the rest of the run.
#[derive(Debug, Default)]
pub struct StreamReconciler {
    applied: StreamSnapshot,
    locked_score: Option<f64>,
}

impl StreamReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score_lock(score: f64) -> Self {
        Self {
            applied: StreamSnapshot::default(),
            locked_score: Some(score),
        }
    }

    pub fn locked_score(&self) -> Option<f64> {
        self.locked_score
    }

    /// Show the placeholder, and the locked score if there is one.
    pub fn begin(&mut self, sink: &dyn RenderSink) {
        sink.render_pending();
        if let Some(score) = self.locked_score {
            self.applied.usability_score = Some(score);
            sink.render_score(score);
        }
    }

    /// Render the fields of `next` that differ from what is already shown.
    pub fn reconcile(&mut self, next: &StreamSnapshot, sink: &dyn RenderSink) -> Changes {
        let mut changes = Changes::default();

        let unlocked = self.locked_score.is_none();
        if let Some(score) = next
            .usability_score
            .filter(|score| unlocked && self.applied.usability_score != Some(*score))
        {
            sink.render_score(score);
            self.applied.usability_score = Some(score);
            changes.score = true;
        }

        if let Some(strengths) = next
            .strengths
            .as_ref()
            .filter(|strengths| self.applied.strengths.as_ref() != Some(*strengths))
        {
            sink.render_strengths(strengths);
            self.applied.strengths = Some(strengths.clone());
            changes.strengths = true;
        }

        if let Some(issues) = next
            .issues
            .as_ref()
            .filter(|issues| self.applied.issues.as_ref() != Some(*issues))
        {
            sink.render_issues(issues);
            self.applied.issues = Some(issues.clone());
            changes.issues = true;
        }

        if let Some(summary) = next
            .summary
            .as_ref()
            .filter(|summary| !summary.is_empty() && self.applied.summary.as_ref() != Some(*summary))
        {
            sink.render_summary(summary);
            self.applied.summary = Some(summary.clone());
            changes.summary = true;
        }

        if !changes.is_empty() {
            debug!(?changes, "Rendered stream update");
        }
        changes
    }

    pub fn applied(&self) -> &StreamSnapshot {
        &self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heurix_protocols::{AnalysisError, AnalysisResult, IssueDraft};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl RenderSink for RecordingSink {
        fn render_pending(&self) {
            self.record("pending".to_string());
        }
        fn render_score(&self, score: f64) {
            self.record(format!("score {score}"));
        }
        fn render_strengths(&self, strengths: &[String]) {
            self.record(format!("strengths {}", strengths.len()));
        }
        fn render_issues(&self, issues: &[IssueDraft]) {
            self.record(format!("issues {}", issues.len()));
        }
        fn render_summary(&self, summary: &str) {
            self.record(format!("summary {summary}"));
        }
        fn render_final(&self, _: &AnalysisResult, _: bool) {
            self.record("final".to_string());
        }
        fn render_failure(&self, _: &AnalysisError) {
            self.record("failure".to_string());
        }
    }

    fn snapshot() -> StreamSnapshot {
        StreamSnapshot {
            usability_score: Some(78.0),
            strengths: Some(vec!["Clear CTA".to_string()]),
            issues: Some(vec![IssueDraft::titled("Low contrast")]),
            summary: Some("Decent page.".to_string()),
        }
    }

    #[test]
    fn test_renders_every_new_field() {
        let sink = RecordingSink::default();
        let mut reconciler = StreamReconciler::new();

        let changes = reconciler.reconcile(&snapshot(), &sink);

        assert_eq!(
            changes,
            Changes {
                score: true,
                strengths: true,
                issues: true,
                summary: true
            }
        );
        assert_eq!(sink.calls().len(), 4);
        assert_eq!(reconciler.applied(), &snapshot());
    }

    #[test]
    fn test_identical_snapshot_is_idempotent() {
        let sink = RecordingSink::default();
        let mut reconciler = StreamReconciler::new();

        reconciler.reconcile(&snapshot(), &sink);
        let before = sink.calls().len();
        let changes = reconciler.reconcile(&snapshot(), &sink);

        assert!(changes.is_empty());
        assert_eq!(sink.calls().len(), before);
    }

    #[test]
    fn test_only_changed_field_rendered() {
        let sink = RecordingSink::default();
        let mut reconciler = StreamReconciler::new();
        reconciler.reconcile(&snapshot(), &sink);

        let mut next = snapshot();
        next.issues = Some(vec![
            IssueDraft::titled("Low contrast"),
            IssueDraft::titled("Tiny targets"),
        ]);
        let changes = reconciler.reconcile(&next, &sink);

        assert!(changes.issues);
        assert!(!changes.score && !changes.strengths && !changes.summary);
        assert_eq!(sink.calls().last().unwrap(), "issues 2");
    }

    #[test]
    fn test_absent_fields_keep_applied_state() {
        let sink = RecordingSink::default();
        let mut reconciler = StreamReconciler::new();
        reconciler.reconcile(&snapshot(), &sink);

        let changes = reconciler.reconcile(&StreamSnapshot::default(), &sink);
        assert!(changes.is_empty());
        assert_eq!(reconciler.applied(), &snapshot());
    }

    #[test]
    fn test_empty_summary_ignored() {
        let sink = RecordingSink::default();
        let mut reconciler = StreamReconciler::new();
        let next = StreamSnapshot {
            summary: Some(String::new()),
            ..Default::default()
        };
        assert!(reconciler.reconcile(&next, &sink).is_empty());
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn test_score_lock_renders_locked_value_and_ignores_stream() {
        let sink = RecordingSink::default();
        let mut reconciler = StreamReconciler::with_score_lock(72.0);

        reconciler.begin(&sink);
        assert_eq!(sink.calls(), vec!["pending", "score 72"]);

        let changes = reconciler.reconcile(&snapshot(), &sink);
        assert!(!changes.score);
        assert!(!sink.calls().contains(&"score 78".to_string()));
        assert_eq!(reconciler.applied().usability_score, Some(72.0));
        assert_eq!(reconciler.locked_score(), Some(72.0));
    }

    #[test]
    fn test_begin_without_lock_only_shows_placeholder() {
        let sink = RecordingSink::default();
        let mut reconciler = StreamReconciler::new();
        reconciler.begin(&sink);
        assert_eq!(sink.calls(), vec!["pending"]);
        assert!(reconciler.applied().is_empty());
    }
}
