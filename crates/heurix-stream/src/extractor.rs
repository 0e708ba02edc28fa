//! Field extraction from a growing model response.

use std::sync::LazyLock;

use heurix_protocols::{heuristic_number, IssueDraft, Severity, StreamSnapshot};
use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::partial::{parse_partial, PartialValue};

static TITLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""title"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("valid title pattern"));

/// Extract whatever fields of the analysis object are already decidable.
///
/// Never fails: content that cannot be read yet is simply absent from the
/// snapshot. Calling this repeatedly on the same buffer gives the same result.
pub fn extract_snapshot(buffer: &str) -> StreamSnapshot {
    let mut snapshot = StreamSnapshot::default();

    // A `{` in leading prose can start a malformed root; later `{` positions
    // are tried until one yields a field.
    for (start, _) in buffer.match_indices('{') {
        let candidate = &buffer[start..];
        match parse_partial(candidate) {
            Ok(root) => {
                snapshot = snapshot_of(&root);
                break;
            }
            Err(malformed) => {
                trace!(start, offset = malformed.offset, "Malformed stream content, using prefix");
                let prefix = candidate
                    .get(..malformed.offset)
                    .and_then(|prefix| parse_partial(prefix).ok())
                    .unwrap_or(PartialValue::Pending);
                snapshot = snapshot_of(&prefix);
                if !snapshot.is_empty() {
                    break;
                }
            }
        }
    }

    if snapshot.issues.is_none() {
        snapshot.issues = title_fallback(buffer);
    }
    snapshot
}

fn snapshot_of(root: &PartialValue) -> StreamSnapshot {
    StreamSnapshot {
        usability_score: root.field("usability_score").and_then(complete_number),
        strengths: root.field("strengths").and_then(complete_strings),
        issues: root.field("issues").and_then(issue_drafts),
        summary: root.field("summary").and_then(complete_string),
    }
}

fn complete_number(value: &PartialValue) -> Option<f64> {
    match value.to_json()? {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn complete_string(value: &PartialValue) -> Option<String> {
    match value.as_str()? {
        (text, true) => Some(text.to_string()),
        _ => None,
    }
}

fn complete_strings(value: &PartialValue) -> Option<Vec<String>> {
    match value.to_json()? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

/// Drafts from the `issues` array. A closed array yields every titled
/// element; an open one yields its finished elements plus the title of the
/// element still being written.
fn issue_drafts(value: &PartialValue) -> Option<Vec<IssueDraft>> {
    let PartialValue::Array { items, complete } = value else {
        return None;
    };

    let mut drafts = Vec::with_capacity(items.len());
    for item in items {
        if let Some(draft) = item.to_json().as_ref().and_then(draft_from_json) {
            drafts.push(draft);
        } else if let Some(title) = item.field("title").and_then(complete_string) {
            drafts.push(IssueDraft::titled(title));
        }
    }

    if *complete || !drafts.is_empty() {
        Some(drafts)
    } else {
        None
    }
}

fn draft_from_json(value: &Value) -> Option<IssueDraft> {
    let object = value.as_object()?;
    let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

    Some(IssueDraft {
        title: text("title")?,
        category: text("category"),
        severity: object
            .get("severity")
            .and_then(|s| serde_json::from_value::<Severity>(s.clone()).ok()),
        description: text("description"),
        location: text("location"),
        impact: text("impact"),
        recommendation: text("recommendation"),
        heuristic_number: object.get("heuristic_number").and_then(heuristic_number),
    })
}

/// Title-only drafts from `"title": "..."` pairs after the `issues` key.
fn title_fallback(buffer: &str) -> Option<Vec<IssueDraft>> {
    let start = buffer.find("\"issues\"")?;
    let drafts: Vec<IssueDraft> = TITLE_PATTERN
        .captures_iter(&buffer[start..])
        .filter_map(|caps| {
            let raw = caps.get(1)?.as_str();
            serde_json::from_str::<String>(&format!("\"{raw}\"")).ok()
        })
        .map(IssueDraft::titled)
        .collect();

    (!drafts.is_empty()).then_some(drafts)
}

/// Accumulates streamed deltas and re-extracts after each one.
#[derive(Debug, Default)]
pub struct StreamingJsonExtractor {
    buffer: String,
}

impl StreamingJsonExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta and return the snapshot of the whole buffer so far.
    pub fn push(&mut self, delta: &str) -> StreamSnapshot {
        self.buffer.push_str(delta);
        self.snapshot()
    }

    pub fn snapshot(&self) -> StreamSnapshot {
        extract_snapshot(&self.buffer)
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
#[path = "extractor_tests.rs"]
mod tests;
