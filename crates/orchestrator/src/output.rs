//! Model output parsing.
//!
//! Final model text goes through three stages, each tagged in the result:
//! strict schema parse, extraction of an embedded JSON object, and a
//! synthesized default.

use std::sync::LazyLock;

use brain_core::{AgentOutput, ITERATION_LIMIT_MARKER};
use regex::Regex;
use serde_json::{Map, Value};

/// Reply sent when the model produced nothing usable.
pub const RECOVERY_LINE: &str = "Opa, me perdi aqui. Qual concurso você mira?";

/// Maximum characters of raw text reused by the default stage.
const EXCERPT_CHARS: usize = 100;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json|JSON)?\s*([\s\S]*?)```").expect("hardcoded regex")
});

/// Parsed agent output, tagged with the stage that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedOutput {
    /// The whole text matched the output schema.
    Strict(AgentOutput),
    /// A JSON object embedded in the text was salvaged.
    Extracted(AgentOutput),
    /// Nothing parsed; synthesized from the raw text.
    Default(AgentOutput),
}

impl ParsedOutput {
    /// Run the three stages over `raw`, stopping at the first success.
    pub fn parse(raw: &str) -> Self {
        if let Some(output) = parse_strict(raw) {
            return ParsedOutput::Strict(output);
        }
        if let Some(output) = extract_embedded(raw) {
            return ParsedOutput::Extracted(output);
        }
        ParsedOutput::Default(default_output(raw))
    }

    /// The default output carrying the recovery line.
    pub fn recovery() -> Self {
        ParsedOutput::Default(AgentOutput::fallback(RECOVERY_LINE))
    }

    /// Name of the stage that produced the output.
    pub fn stage(&self) -> &'static str {
        match self {
            ParsedOutput::Strict(_) => "strict",
            ParsedOutput::Extracted(_) => "extracted",
            ParsedOutput::Default(_) => "default",
        }
    }

    pub fn output(&self) -> &AgentOutput {
        match self {
            ParsedOutput::Strict(o) | ParsedOutput::Extracted(o) | ParsedOutput::Default(o) => o,
        }
    }

    pub fn into_output(self) -> AgentOutput {
        match self {
            ParsedOutput::Strict(o) | ParsedOutput::Extracted(o) | ParsedOutput::Default(o) => o,
        }
    }
}

/// Stage 1: the trimmed text is exactly a schema-valid object.
pub fn parse_strict(raw: &str) -> Option<AgentOutput> {
    serde_json::from_str::<AgentOutput>(raw.trim())
        .ok()
        .filter(|output| !output.response_message.trim().is_empty())
}

/// Stage 2: a JSON object somewhere in the text.
///
/// Fenced code blocks are tried first, then the span from the first `{` to
/// the last `}`. Final-answer envelopes (`{"action": ..., "action_input":
/// ...}`) are unwrapped and enum labels are matched leniently.
pub fn extract_embedded(raw: &str) -> Option<AgentOutput> {
    let fenced = FENCED_BLOCK
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str());

    let braced = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => Some(&raw[start..=end]),
        _ => None,
    };

    fenced
        .chain(braced)
        .filter_map(|candidate| serde_json::from_str::<Value>(candidate.trim()).ok())
        .find_map(|value| from_value(&value))
}

fn from_value(value: &Value) -> Option<AgentOutput> {
    let object = value.as_object()?;

    if let Some(inner) = object.get("action_input") {
        return match inner {
            Value::Object(_) => from_value(inner),
            Value::String(text) => serde_json::from_str::<Value>(text)
                .ok()
                .and_then(|nested| from_value(&nested)),
            _ => None,
        };
    }

    let response_message = string_field(object, "response_message")?;
    if response_message.trim().is_empty() {
        return None;
    }

    Some(AgentOutput {
        funnel_stage: string_field(object, "current_funnel_stage")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default(),
        identified_vertical: string_field(object, "identified_vertical")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default(),
        search_required: match object.get("search_required") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        },
        search_query: string_field(object, "search_query"),
        response_message,
        suggested_next_action: string_field(object, "suggested_next_action"),
    })
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Stage 3: initial stage, unknown vertical and an excerpt of the raw text.
///
/// An exhausted iteration budget or blank text yields [`RECOVERY_LINE`].
pub fn default_output(raw: &str) -> AgentOutput {
    if raw.contains(ITERATION_LIMIT_MARKER) {
        return AgentOutput::fallback(RECOVERY_LINE);
    }

    let cleaned = raw
        .replace("```json", " ")
        .replace("```", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.is_empty() {
        return AgentOutput::fallback(RECOVERY_LINE);
    }

    AgentOutput::fallback(truncate_chars(&cleaned, EXCERPT_CHARS))
}

/// First `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
