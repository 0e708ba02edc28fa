//! Prompt and response schema.

use heurix_config::ModelConfig;
use heurix_protocols::SessionParams;
use serde_json::{json, Value};

use crate::context::CanonicalContext;

pub const SYSTEM_PROMPT: &str = "\
You are an expert UX auditor. Evaluate web pages against Nielsen's ten usability heuristics.
You receive a JSON summary of a page: heading structure, buttons, forms, images, links,
accessibility attributes (ARIA labels, alt text), text metrics, colors, touch targets,
readability and contrast.

Respond ONLY with a JSON object of this shape, fields in this order:
{
  \"usability_score\": number (0-100),
  \"strengths\": [short strings],
  \"issues\": [{\"title\", \"category\", \"severity\" (low|medium|high), \"description\",
              \"location\" (CSS selector), \"impact\", \"recommendation\",
              \"heuristic_number\" (1-10)}],
  \"summary\": \"concise summary of UX quality (<= 50 words)\"
}
Keep every text field under 240 characters.";

/// Session parameters for the configured model.
pub fn session_params(config: &ModelConfig) -> SessionParams {
    let params = SessionParams::new(SYSTEM_PROMPT)
        .with_temperature(config.temperature)
        .with_top_k(config.top_k);
    match config.max_tokens {
        Some(max_tokens) => params.with_max_tokens(max_tokens),
        None => params,
    }
}

pub fn build_prompt(context: &CanonicalContext) -> String {
    format!(
        "Analyze the current page: {}\n\nPage metrics:\n{}",
        context.url, context.text
    )
}

/// JSON schema constraining the model output.
pub fn response_schema() -> Value {
    let text = json!({ "type": "string", "maxLength": 240 });
    json!({
        "type": "object",
        "properties": {
            "usability_score": { "type": "number", "minimum": 0, "maximum": 100 },
            "strengths": { "type": "array", "items": text },
            "issues": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": text,
                        "category": text,
                        "severity": { "type": "string", "enum": ["low", "medium", "high"] },
                        "description": text,
                        "location": text,
                        "impact": text,
                        "recommendation": text,
                        "heuristic_number": { "type": "integer", "minimum": 1, "maximum": 10 }
                    },
                    "required": [
                        "title", "category", "severity", "description",
                        "location", "impact", "recommendation", "heuristic_number"
                    ]
                }
            },
            "summary": text
        },
        "required": ["usability_score", "strengths", "issues", "summary"]
    })
}
