use super::*;

fn sample_issue() -> Issue {
    Issue {
        title: "Low contrast".to_string(),
        category: "Visual".to_string(),
        severity: Severity::High,
        description: "d".to_string(),
        location: "button.cta".to_string(),
        impact: "i".to_string(),
        recommendation: "r".to_string(),
        heuristic_number: 8,
    }
}

#[test]
fn test_severity_ordering() {
    assert!(Severity::Low < Severity::Medium);
    assert!(Severity::Medium < Severity::High);
    assert!(Severity::High.rank() > Severity::Low.rank());
}

#[test]
fn test_severity_serialization() {
    let json = serde_json::to_string(&Severity::Medium).unwrap();
    assert_eq!(json, "\"medium\"");

    let parsed: Severity = serde_json::from_str("\"High\"").unwrap();
    assert_eq!(parsed, Severity::High);
}

#[test]
fn test_severity_rejects_unknown() {
    let parsed = serde_json::from_str::<Severity>("\"critical\"");
    assert!(parsed.is_err());
}

#[test]
fn test_issue_deserialization() {
    let json = r#"{"title":"Low contrast","category":"Visual","severity":"high","description":"d","location":"button.cta","impact":"i","recommendation":"r","heuristic_number":8}"#;
    let issue: Issue = serde_json::from_str(json).unwrap();
    assert_eq!(issue, sample_issue());
}

#[test]
fn test_issue_requires_all_fields() {
    let json = r#"{"title":"Low contrast","severity":"high"}"#;
    assert!(serde_json::from_str::<Issue>(json).is_err());
}

#[test]
fn test_draft_title_only() {
    let draft: IssueDraft = serde_json::from_str(r#"{"title":"Foo"}"#).unwrap();
    assert_eq!(draft, IssueDraft::titled("Foo"));
    assert!(draft.is_title_only());
}

#[test]
fn test_draft_from_issue() {
    let draft = IssueDraft::from(&sample_issue());
    assert_eq!(draft.title, "Low contrast");
    assert_eq!(draft.severity, Some(Severity::High));
    assert_eq!(draft.heuristic_number, Some(8));
    assert!(!draft.is_title_only());
}

#[test]
fn test_display_score_rounds_and_clamps() {
    assert_eq!(display_score(77.5), Some(78));
    assert_eq!(display_score(-3.0), Some(0));
    assert_eq!(display_score(140.2), Some(100));
    assert_eq!(display_score(f64::NAN), None);
}

#[test]
fn test_result_display_score() {
    let result = AnalysisResult {
        usability_score: Some(71.6),
        strengths: vec![],
        issues: vec![sample_issue()],
        summary: String::new(),
        timestamp: 0,
    };
    assert_eq!(result.display_score(), Some(72));
    assert_eq!(result.issue_drafts().len(), 1);
}

#[test]
fn test_snapshot_is_empty() {
    let mut snapshot = StreamSnapshot::default();
    assert!(snapshot.is_empty());
    snapshot.summary = Some("ok".to_string());
    assert!(!snapshot.is_empty());
}

#[test]
fn test_heuristic_number_accepts_integral_values() {
    assert_eq!(heuristic_number(&serde_json::json!(8)), Some(8));
    assert_eq!(heuristic_number(&serde_json::json!(8.0)), Some(8));
    assert_eq!(heuristic_number(&serde_json::json!(8.5)), None);
    assert_eq!(heuristic_number(&serde_json::json!(0)), None);
    assert_eq!(heuristic_number(&serde_json::json!(11)), None);
    assert_eq!(heuristic_number(&serde_json::json!("8")), None);
}
