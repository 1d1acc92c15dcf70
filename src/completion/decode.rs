//! Decoding of raw completion responses into match payloads.
//!
//! Models asked for a JSON object frequently wrap it anyway: straight or
//! curly quotes, markdown code fences, a stray `json` language tag. The
//! decoder strips those wrappers in repeated passes before parsing, so
//! any nesting order unwraps the same way.

use serde::Deserialize;
use tracing::warn;

use super::CompletionResponse;

/// Structured payload the matcher asks the model to produce
#[derive(Debug, Clone, Deserialize)]
pub struct MatchPayload {
    /// Best matches drawn verbatim from the candidate list; empty when
    /// the model found no reasonable candidate
    #[serde(default)]
    pub best_match: Vec<String>,
    /// Model's self-estimated confidence in [0, 1]
    #[serde(default)]
    pub confidence: f64,
}

/// Wrapping tokens stripped from both ends of the response text
const WRAPPERS: &[&str] = &["\"", "'", "\u{201c}", "\u{201d}", "```", "json", "`"];

/// Strip quote and code-fence wrappers from both ends of `text`.
///
/// Runs the token list in passes until a pass changes nothing, so
/// ` ```json {..} ``` ` and `"{..}"` both unwrap fully.
pub fn strip_wrappers(text: &str) -> &str {
    let mut s = text.trim();
    loop {
        let before = s;
        for token in WRAPPERS {
            s = s.trim();
            s = s.strip_prefix(token).unwrap_or(s);
            s = s.strip_suffix(token).unwrap_or(s);
        }
        s = s.trim();
        if s == before {
            return s;
        }
    }
}

/// Decode a raw completion response into a match payload.
///
/// Returns `None` when there is nothing usable: no choices, null
/// content, unparseable text, or an empty object. Parse failures are
/// logged and absorbed; they are indistinguishable from "no match" to
/// the caller.
pub fn decode_match_payload(response: &CompletionResponse) -> Option<MatchPayload> {
    let content = response.choices.first()?.message.content.as_deref()?;

    let cleaned = strip_wrappers(content);

    let value: serde_json::Value = match serde_json::from_str(cleaned) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Failed to parse completion response as JSON");
            return None;
        }
    };

    // An empty object means the model answered with nothing usable
    match value.as_object() {
        Some(map) if !map.is_empty() => {}
        _ => return None,
    }

    match serde_json::from_value(value) {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!(error = %e, "Completion response JSON has unexpected shape");
            None
        }
    }
}
