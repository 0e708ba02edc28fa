//! Final parsing, validation and ranking of a complete model response.

use heurix_protocols::{heuristic_number, AnalysisError, AnalysisResult, Issue, Severity};
use serde_json::{Map, Value};

/// Validated content of a finished response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAnalysis {
    pub usability_score: Option<f64>,
    pub strengths: Vec<String>,
    pub issues: Vec<Issue>,
    pub summary: String,
}

impl ParsedAnalysis {
    /// Normalize a result an adapter already structured.
    pub fn from_result(result: AnalysisResult, max_field_chars: usize) -> Self {
        Self {
            usability_score: result.usability_score.filter(|s| s.is_finite()),
            strengths: result.strengths,
            issues: result.issues,
            summary: result.summary,
        }
        .normalized(max_field_chars)
    }

    /// Clamp the score, cut text fields to `max_field_chars` and rank issues.
    fn normalized(mut self, max_field_chars: usize) -> Self {
        self.usability_score = self.usability_score.map(|s| s.clamp(0.0, 100.0));
        for strength in &mut self.strengths {
            truncate_chars(strength, max_field_chars);
        }
        truncate_chars(&mut self.summary, max_field_chars);
        for issue in &mut self.issues {
            for field in [
                &mut issue.title,
                &mut issue.category,
                &mut issue.description,
                &mut issue.location,
                &mut issue.impact,
                &mut issue.recommendation,
            ] {
                truncate_chars(field, max_field_chars);
            }
        }
        rank_issues(&mut self.issues);
        self
    }

    pub fn into_result(self, usability_score: Option<f64>, timestamp: i64) -> AnalysisResult {
        AnalysisResult {
            usability_score,
            strengths: self.strengths,
            issues: self.issues,
            summary: self.summary,
            timestamp,
        }
    }
}

/// Parse the complete response text.
///
/// Accepts a bare object, an object wrapped in a fenced code block, or the
/// first balanced object inside surrounding prose or an array wrapper. `usability_score` (number
/// or null), `issues` and `summary` are required; `strengths` defaults to empty.
pub fn parse_final(text: &str, max_field_chars: usize) -> Result<ParsedAnalysis, AnalysisError> {
    let fields = locate_object(text)
        .ok_or_else(|| AnalysisError::FinalParse("response contains no JSON object".to_string()))?;

    let usability_score = match fields.get("usability_score") {
        None => return Err(missing("usability_score")),
        Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(_) => return Err(mistyped("usability_score", "a number")),
    };

    let strengths = match fields.get("strengths") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| mistyped("strengths", "an array of strings"))?,
        Some(_) => return Err(mistyped("strengths", "an array of strings")),
    };

    let issues = match fields.get("issues") {
        None => return Err(missing("issues")),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_issue(index, item))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(mistyped("issues", "an array")),
    };

    let summary = match fields.get("summary") {
        None => return Err(missing("summary")),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(mistyped("summary", "a string")),
    };

    Ok(ParsedAnalysis {
        usability_score,
        strengths,
        issues,
        summary,
    }
    .normalized(max_field_chars))
}

fn missing(field: &str) -> AnalysisError {
    AnalysisError::FinalParse(format!("missing field '{field}'"))
}

fn mistyped(field: &str, expected: &str) -> AnalysisError {
    AnalysisError::FinalParse(format!("field '{field}' must be {expected}"))
}

fn parse_issue(index: usize, value: &Value) -> Result<Issue, AnalysisError> {
    let invalid = |what: &str| AnalysisError::FinalParse(format!("issue {index}: {what}"));
    let object: &Map<String, Value> = value.as_object().ok_or_else(|| invalid("not an object"))?;
    let text = |key: &str| -> Result<String, AnalysisError> {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| invalid(&format!("'{key}' must be a string")))
    };

    let severity = object
        .get("severity")
        .and_then(|s| serde_json::from_value::<Severity>(s.clone()).ok())
        .ok_or_else(|| invalid("'severity' must be low, medium or high"))?;
    let heuristic = object
        .get("heuristic_number")
        .and_then(heuristic_number)
        .ok_or_else(|| invalid("'heuristic_number' must be an integer from 1 to 10"))?;

    Ok(Issue {
        title: text("title")?,
        category: text("category")?,
        severity,
        description: text("description")?,
        location: text("location")?,
        impact: text("impact")?,
        recommendation: text("recommendation")?,
        heuristic_number: heuristic,
    })
}

fn locate_object(text: &str) -> Option<Map<String, Value>> {
    let stripped = strip_fences(text);
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(stripped) {
        return Some(fields);
    }
    first_object(stripped)
}

/// Remove a surrounding ```/```json fence.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// First `{` candidate in `text` whose balanced slice parses as an object.
/// Prose braces such as `{3}` are skipped over.
fn first_object(text: &str) -> Option<Map<String, Value>> {
    text.match_indices('{').find_map(|(start, _)| {
        let slice = balanced_object(&text[start..])?;
        match serde_json::from_str::<Value>(slice) {
            Ok(Value::Object(fields)) => Some(fields),
            _ => None,
        }
    })
}

/// Prefix of `text` (which starts at a `{`) up to its matching `}`, skipping
/// braces inside strings.
fn balanced_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in text.as_bytes().iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn truncate_chars(text: &mut String, max_chars: usize) {
    if let Some((byte_index, _)) = text.char_indices().nth(max_chars) {
        text.truncate(byte_index);
    }
}

/// Ranking weight of a Nielsen heuristic. Heuristics whose violations block
/// task completion weigh more than cosmetic ones.
pub fn heuristic_weight(heuristic: u8) -> u8 {
    match heuristic {
        5 | 9 => 10, // error prevention, error recovery
        1 => 9,      // visibility of system status
        3 => 8,      // user control and freedom
        4 => 7,      // consistency and standards
        6 => 6,      // recognition rather than recall
        2 => 5,      // match with the real world
        8 => 4,      // aesthetic and minimalist design
        7 => 3,      // flexibility and efficiency of use
        10 => 2,     // help and documentation
        _ => 0,
    }
}

/// Stable sort: heuristic weight, then severity, both descending.
pub fn rank_issues(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        heuristic_weight(b.heuristic_number)
            .cmp(&heuristic_weight(a.heuristic_number))
            .then_with(|| b.severity.rank().cmp(&a.severity.rank()))
    });
}

#[cfg(test)]
#[path = "finalize_tests.rs"]
mod tests;
