//! Analysis result types.

use serde::{Deserialize, Serialize};

/// Severity of a usability issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[serde(alias = "Low", alias = "LOW")]
    Low,
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "High", alias = "HIGH")]
    High,
}

impl Severity {
    /// Ranking used when ordering issues (high > medium > low).
    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully specified usability issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub title: String,
    pub category: String,
    pub severity: Severity,
    pub description: String,
    /// CSS-selector-like pointer to the offending element.
    pub location: String,
    pub impact: String,
    pub recommendation: String,
    /// Nielsen heuristic number (1..=10).
    pub heuristic_number: u8,
}

/// An issue as seen mid-stream: only the title is guaranteed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDraft {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heuristic_number: Option<u8>,
}

impl IssueDraft {
    /// Create a title-only draft.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Whether only the title is known so far.
    pub fn is_title_only(&self) -> bool {
        self.category.is_none()
            && self.severity.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.impact.is_none()
            && self.recommendation.is_none()
            && self.heuristic_number.is_none()
    }
}

impl From<&Issue> for IssueDraft {
    fn from(issue: &Issue) -> Self {
        Self {
            title: issue.title.clone(),
            category: Some(issue.category.clone()),
            severity: Some(issue.severity),
            description: Some(issue.description.clone()),
            location: Some(issue.location.clone()),
            impact: Some(issue.impact.clone()),
            recommendation: Some(issue.recommendation.clone()),
            heuristic_number: Some(issue.heuristic_number),
        }
    }
}

/// Outcome of one completed analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Usability score in [0, 100], kept at full precision.
    pub usability_score: Option<f64>,
    pub strengths: Vec<String>,
    pub issues: Vec<Issue>,
    pub summary: String,
    /// Completion time in epoch milliseconds.
    pub timestamp: i64,
}

impl AnalysisResult {
    /// Score as shown on the gauge: rounded and clamped to [0, 100].
    pub fn display_score(&self) -> Option<u8> {
        self.usability_score.and_then(display_score)
    }

    /// Issues in draft form, for sinks that render streaming and final lists alike.
    pub fn issue_drafts(&self) -> Vec<IssueDraft> {
        self.issues.iter().map(IssueDraft::from).collect()
    }
}

/// Round and clamp a raw score for display. Non-finite scores have no display value.
pub fn display_score(score: f64) -> Option<u8> {
    if !score.is_finite() {
        return None;
    }
    Some(score.round().clamp(0.0, 100.0) as u8)
}

/// Read a heuristic number from JSON. Accepts `8` and `8.0`, rejects anything outside 1..=10.
pub fn heuristic_number(value: &serde_json::Value) -> Option<u8> {
    let n = value.as_f64()?;
    if n.fract() != 0.0 || !(1.0..=10.0).contains(&n) {
        return None;
    }
    Some(n as u8)
}

/// Best-effort partial view of an in-flight model response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamSnapshot {
    pub usability_score: Option<f64>,
    pub strengths: Option<Vec<String>>,
    pub issues: Option<Vec<IssueDraft>>,
    pub summary: Option<String>,
}

impl StreamSnapshot {
    /// True when no field could be extracted yet.
    pub fn is_empty(&self) -> bool {
        self.usability_score.is_none()
            && self.strengths.is_none()
            && self.issues.is_none()
            && self.summary.is_none()
    }
}

#[cfg(test)]
#[path = "analysis_tests.rs"]
mod tests;
