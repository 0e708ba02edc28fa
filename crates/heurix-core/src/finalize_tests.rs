use super::*;
use serde_json::json;

const MAX: usize = 240;

fn issue_json(title: &str, severity: &str, heuristic: u8) -> Value {
    json!({
        "title": title,
        "category": "Visual",
        "severity": severity,
        "description": "d",
        "location": "button.cta",
        "impact": "i",
        "recommendation": "r",
        "heuristic_number": heuristic
    })
}

fn issue(title: &str, severity: Severity, heuristic: u8) -> Issue {
    serde_json::from_value(issue_json(title, severity.as_str(), heuristic)).unwrap()
}

fn response(issues: Vec<Value>) -> String {
    json!({
        "usability_score": 78,
        "strengths": ["Clear CTA"],
        "issues": issues,
        "summary": "Decent page."
    })
    .to_string()
}

#[test]
fn test_parses_plain_response() {
    let parsed = parse_final(&response(vec![issue_json("Low contrast", "high", 8)]), MAX).unwrap();
    assert_eq!(parsed.usability_score, Some(78.0));
    assert_eq!(parsed.strengths, vec!["Clear CTA".to_string()]);
    assert_eq!(parsed.issues, vec![issue("Low contrast", Severity::High, 8)]);
    assert_eq!(parsed.summary, "Decent page.");
}

#[test]
fn test_parses_fenced_response() {
    let text = format!("```json\n{}\n```", response(vec![]));
    assert_eq!(parse_final(&text, MAX).unwrap().summary, "Decent page.");

    let text = format!("```\n{}```", response(vec![]));
    assert_eq!(parse_final(&text, MAX).unwrap().summary, "Decent page.");
}

#[test]
fn test_extracts_first_object_from_prose() {
    let text = format!(
        "Here is the analysis: {} Let me know if {{you}} need more.",
        response(vec![])
    );
    assert_eq!(parse_final(&text, MAX).unwrap().usability_score, Some(78.0));
}

#[test]
fn test_braces_inside_strings_do_not_confuse_scan() {
    let text = r#"Result: {"usability_score": 50, "issues": [], "summary": "Use {curly} \"quotes\" }"} trailing"#;
    assert_eq!(parse_final(text, MAX).unwrap().summary, r#"Use {curly} "quotes" }"#);
}

#[test]
fn test_prose_braces_before_object_are_skipped() {
    let text = format!("Checked {{3}} heuristics.\n{}", response(vec![]));
    let parsed = parse_final(&text, MAX).unwrap();
    assert_eq!(parsed.usability_score, Some(78.0));
    assert_eq!(parsed.summary, "Decent page.");

    let unbalanced = format!("Note: {{ is not closed here. {}", response(vec![]));
    assert_eq!(parse_final(&unbalanced, MAX).unwrap().usability_score, Some(78.0));
}

#[test]
fn test_object_inside_array_wrapper() {
    let text = format!("[{}]", response(vec![issue_json("Low contrast", "high", 8)]));
    let parsed = parse_final(&text, MAX).unwrap();
    assert_eq!(parsed.usability_score, Some(78.0));
    assert_eq!(parsed.issues.len(), 1);
}

#[test]
fn test_null_score_allowed() {
    let text = r#"{"usability_score": null, "issues": [], "summary": "s"}"#;
    let parsed = parse_final(text, MAX).unwrap();
    assert_eq!(parsed.usability_score, None);
    assert!(parsed.strengths.is_empty());
}

#[test]
fn test_score_clamped() {
    let text = r#"{"usability_score": 130.5, "issues": [], "summary": "s"}"#;
    assert_eq!(parse_final(text, MAX).unwrap().usability_score, Some(100.0));
}

#[test]
fn test_missing_or_mistyped_fields_fail() {
    let cases = [
        r#"{"issues": [], "summary": "s"}"#,
        r#"{"usability_score": "high", "issues": [], "summary": "s"}"#,
        r#"{"usability_score": 1, "summary": "s"}"#,
        r#"{"usability_score": 1, "issues": {}, "summary": "s"}"#,
        r#"{"usability_score": 1, "issues": []}"#,
        r#"{"usability_score": 1, "issues": [], "summary": 3}"#,
        r#"{"usability_score": 1, "strengths": [1], "issues": [], "summary": "s"}"#,
        r#"[1, 2]"#,
        "no json here",
        r#"{"usability_score": 1, "issues": ["#,
    ];
    for case in cases {
        let err = parse_final(case, MAX).unwrap_err();
        assert!(matches!(err, AnalysisError::FinalParse(_)), "accepted: {case}");
    }
}

#[test]
fn test_incomplete_issue_fails() {
    let text = response(vec![json!({"title": "Only a title"})]);
    let err = parse_final(&text, MAX).unwrap_err();
    assert!(err.to_string().contains("issue 0"));
}

#[test]
fn test_invalid_heuristic_or_severity_fails() {
    assert!(parse_final(&response(vec![issue_json("T", "high", 11)]), MAX).is_err());
    assert!(parse_final(&response(vec![issue_json("T", "critical", 3)]), MAX).is_err());
}

#[test]
fn test_fields_truncated_by_characters() {
    let long = "é".repeat(300);
    let text = json!({
        "usability_score": 10,
        "strengths": [long],
        "issues": [issue_json(&long, "low", 2)],
        "summary": long
    })
    .to_string();
    let parsed = parse_final(&text, MAX).unwrap();
    assert_eq!(parsed.summary.chars().count(), 240);
    assert_eq!(parsed.strengths[0].chars().count(), 240);
    assert_eq!(parsed.issues[0].title.chars().count(), 240);
}

#[test]
fn test_issues_ranked_by_weight_then_severity() {
    let text = response(vec![
        issue_json("aesthetic-high", "high", 8),
        issue_json("status-low", "low", 1),
        issue_json("errors-medium", "medium", 5),
        issue_json("status-high", "high", 1),
        issue_json("recovery-medium", "medium", 9),
    ]);
    let titles: Vec<String> = parse_final(&text, MAX)
        .unwrap()
        .issues
        .into_iter()
        .map(|i| i.title)
        .collect();
    assert_eq!(
        titles,
        vec!["errors-medium", "recovery-medium", "status-high", "status-low", "aesthetic-high"]
    );
}

#[test]
fn test_rank_is_stable_for_ties() {
    let mut issues = vec![
        issue("first", Severity::Medium, 4),
        issue("second", Severity::Medium, 4),
        issue("third", Severity::Medium, 4),
    ];
    rank_issues(&mut issues);
    let titles: Vec<&str> = issues.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["first", "second", "third"]);
}

#[test]
fn test_every_heuristic_has_weight() {
    for heuristic in 1..=10 {
        assert!(heuristic_weight(heuristic) > 0);
    }
    assert_eq!(heuristic_weight(0), 0);
}

#[test]
fn test_from_result_normalizes() {
    let result = AnalysisResult {
        usability_score: Some(-4.0),
        strengths: vec![],
        issues: vec![issue("low-weight", Severity::High, 10), issue("high-weight", Severity::Low, 5)],
        summary: "x".repeat(500),
        timestamp: 1,
    };
    let parsed = ParsedAnalysis::from_result(result, MAX);
    assert_eq!(parsed.usability_score, Some(0.0));
    assert_eq!(parsed.issues[0].title, "high-weight");
    assert_eq!(parsed.summary.len(), 240);
}

#[test]
fn test_into_result_uses_given_score() {
    let parsed = parse_final(&response(vec![]), MAX).unwrap();
    let result = parsed.into_result(Some(72.0), 99);
    assert_eq!(result.usability_score, Some(72.0));
    assert_eq!(result.timestamp, 99);
}
