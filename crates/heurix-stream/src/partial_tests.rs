use super::*;
use serde_json::json;

fn complete_string(s: &str) -> PartialValue {
    PartialValue::String {
        value: s.to_string(),
        complete: true,
    }
}

#[test]
fn test_no_object_is_pending() {
    assert_eq!(parse_partial("").unwrap(), PartialValue::Pending);
    assert_eq!(parse_partial("Sure, here is").unwrap(), PartialValue::Pending);
}

#[test]
fn test_complete_document_matches_serde() {
    let doc = r#"{"a": 1, "b": [true, false, null], "c": {"d": "e\né"}, "f": -2.5e3}"#;
    let parsed = parse_partial(doc).unwrap();
    assert!(parsed.is_complete());
    assert_eq!(parsed.to_json().unwrap(), serde_json::from_str::<Value>(doc).unwrap());
}

#[test]
fn test_skips_leading_prose_and_fence() {
    let doc = "```json\n{\"summary\": \"ok\"}\n```";
    let parsed = parse_partial(doc).unwrap();
    assert_eq!(parsed.to_json().unwrap(), json!({"summary": "ok"}));
}

#[test]
fn test_truncated_object() {
    let parsed = parse_partial(r#"{"summary": "Dec"#).unwrap();
    assert!(!parsed.is_complete());
    assert_eq!(parsed.field("summary").unwrap().as_str(), Some(("Dec", false)));
    assert!(parsed.to_json().is_none());
}

#[test]
fn test_truncated_key_drops_entry() {
    let parsed = parse_partial(r#"{"a": "x", "usab"#).unwrap();
    match parsed {
        PartialValue::Object { entries, complete } => {
            assert!(!complete);
            assert_eq!(entries, vec![("a".to_string(), complete_string("x"))]);
        }
        other => panic!("expected object, got {other:?}"),
    }
}

#[test]
fn test_number_needs_terminator() {
    let parsed = parse_partial(r#"{"usability_score": 78"#).unwrap();
    assert_eq!(
        parsed.field("usability_score"),
        Some(&PartialValue::Number {
            raw: "78".to_string(),
            complete: false
        })
    );

    let parsed = parse_partial(r#"{"usability_score": 78,"#).unwrap();
    assert!(parsed.field("usability_score").unwrap().is_complete());
}

#[test]
fn test_value_not_started_is_pending() {
    let parsed = parse_partial(r#"{"usability_score":"#).unwrap();
    assert_eq!(parsed.field("usability_score"), Some(&PartialValue::Pending));
}

#[test]
fn test_partial_literal_is_pending() {
    let parsed = parse_partial(r#"{"ok": tr"#).unwrap();
    assert_eq!(parsed.field("ok"), Some(&PartialValue::Pending));
}

#[test]
fn test_escaped_quote_inside_string() {
    let parsed = parse_partial(r#"{"summary": "Say \"hi\" to users", "x": 1}"#).unwrap();
    assert_eq!(
        parsed.field("summary").unwrap().as_str(),
        Some((r#"Say "hi" to users"#, true))
    );
}

#[test]
fn test_truncated_escape_is_incomplete() {
    let parsed = parse_partial(r#"{"summary": "line\"#).unwrap();
    assert_eq!(parsed.field("summary").unwrap().as_str(), Some(("line", false)));

    let parsed = parse_partial(r#"{"summary": "caf\u00"#).unwrap();
    assert_eq!(parsed.field("summary").unwrap().as_str(), Some(("caf", false)));
}

#[test]
fn test_surrogate_pair() {
    let parsed = parse_partial(r#"{"s": "\ud83d\ude00"}"#).unwrap();
    assert_eq!(parsed.field("s").unwrap().as_str(), Some(("😀", true)));
}

#[test]
fn test_lone_high_surrogate_replaced() {
    let parsed = parse_partial(r#"{"s": "\ud83dx"}"#).unwrap();
    assert_eq!(parsed.field("s").unwrap().as_str(), Some(("\u{FFFD}x", true)));
}

#[test]
fn test_multibyte_text_preserved() {
    let parsed = parse_partial("{\"s\": \"Überblick – gut\"}").unwrap();
    assert_eq!(parsed.field("s").unwrap().as_str(), Some(("Überblick – gut", true)));
}

#[test]
fn test_open_array_keeps_complete_items() {
    let parsed = parse_partial(r#"{"strengths": ["Clear CTA", "Fast lo"#).unwrap();
    match parsed.field("strengths").unwrap() {
        PartialValue::Array { items, complete } => {
            assert!(!complete);
            assert_eq!(items.len(), 2);
            assert!(items[0].is_complete());
            assert!(!items[1].is_complete());
        }
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn test_trailing_comma_tolerated() {
    let parsed = parse_partial(r#"{"a": [1, 2,], "b": 3,}"#).unwrap();
    assert_eq!(parsed.to_json().unwrap(), json!({"a": [1, 2], "b": 3}));
}

#[test]
fn test_first_duplicate_key_wins() {
    let parsed = parse_partial(r#"{"a": 1, "a": 2}"#).unwrap();
    assert_eq!(parsed.field("a").unwrap().to_json(), Some(json!(1)));
}

#[test]
fn test_malformed_inputs() {
    assert!(parse_partial(r#"{"a" 1}"#).is_err());
    assert!(parse_partial(r#"{"a": 1 "b": 2}"#).is_err());
    assert!(parse_partial(r#"{"a": undefined}"#).is_err());
    assert!(parse_partial(r#"{"a": 1.2.3,}"#).is_err());
    assert!(parse_partial(r#"{"a": "\q"}"#).is_err());
    assert!(parse_partial(r#"{"a": "\u12zz"}"#).is_err());
    assert!(parse_partial(r#"{a: 1}"#).is_err());
}

#[test]
fn test_malformed_offset_points_at_problem() {
    let input = r#"{"a": 1, "b": ?}"#;
    let err = parse_partial(input).unwrap_err();
    assert_eq!(&input[err.offset..err.offset + 1], "?");
}

#[test]
fn test_depth_limit() {
    let deep = format!("{{\"a\":{}", "[".repeat(100));
    assert!(parse_partial(&deep).is_err());
}

#[test]
fn test_every_prefix_parses_or_is_pending() {
    let doc = r#"{"usability_score": 78, "strengths": ["A \"quoted\" one"], "issues": [{"title": "T", "heuristic_number": 8}], "summary": "Done."}"#;
    for end in 0..=doc.len() {
        if !doc.is_char_boundary(end) {
            continue;
        }
        assert!(parse_partial(&doc[..end]).is_ok(), "prefix {end} failed");
    }
}
