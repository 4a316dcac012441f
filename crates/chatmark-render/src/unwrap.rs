//! Bounded recursive JSON unwrapping
//!
//! Tool results travel through several layers that each JSON-encode what
//! they were handed, so a dict can arrive as a string holding a string
//! holding the dict. [`unwrap_json`] peels string layers until the value is
//! structured, stops being JSON, or the depth cap is reached.

use serde::Serialize;
use serde_json::Value;

/// A fully unwrapped value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Payload {
    /// An object or array
    Json(Value),
    /// Anything else, as display text
    Text(String),
}

impl Payload {
    /// Text content, if this is not structured
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }

    /// Whether there is nothing to show
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Json(Value::Array(items)) => items.is_empty(),
            Self::Json(Value::Object(map)) => map.is_empty(),
            Self::Json(_) => false,
        }
    }

    /// Display form: pretty JSON or the text itself
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Json(value) => pretty_json(value),
            Self::Text(text) => text.clone(),
        }
    }

    /// The payload as a JSON value, text becoming a JSON string
    pub fn to_value(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::Text(text) => Value::String(text.clone()),
        }
    }
}

/// Why unwrapping stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnwrapStop {
    /// Reached a structured value or a non-string scalar
    Exhausted,
    /// The current string is not JSON. Raw input that never parsed has its
    /// literal escapes resolved; decoded text is kept as is
    ParseFailed,
    /// The depth cap was hit while the value was still a JSON string
    DepthLimit,
}

/// Result of [`unwrap_json`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnwrapOutcome {
    /// The unwrapped value
    pub payload: Payload,
    /// Number of successful decode steps
    pub depth: usize,
    /// Why the loop ended
    pub stop: UnwrapStop,
}

/// Decode `raw` until it is no longer a JSON string, at most `max_depth` times
pub fn unwrap_json(raw: &str, max_depth: usize) -> UnwrapOutcome {
    let mut current = raw.to_string();
    let mut depth = 0;

    loop {
        if depth >= max_depth {
            tracing::debug!(depth, "unwrap depth cap reached, keeping current string");
            return UnwrapOutcome {
                payload: Payload::Text(current),
                depth,
                stop: UnwrapStop::DepthLimit,
            };
        }

        match serde_json::from_str::<Value>(&current) {
            Ok(Value::String(inner)) => {
                depth += 1;
                current = inner;
            }
            Ok(value @ (Value::Object(_) | Value::Array(_))) => {
                return UnwrapOutcome {
                    payload: Payload::Json(value),
                    depth: depth + 1,
                    stop: UnwrapStop::Exhausted,
                };
            }
            // numbers, booleans and null read best as they were written
            Ok(_) => {
                return UnwrapOutcome {
                    payload: Payload::Text(current.trim().to_string()),
                    depth,
                    stop: UnwrapStop::Exhausted,
                };
            }
            // decoded text already had its escapes resolved by the parser
            Err(_) if depth > 0 => {
                return UnwrapOutcome {
                    payload: Payload::Text(current),
                    depth,
                    stop: UnwrapStop::ParseFailed,
                };
            }
            Err(_) => {
                return UnwrapOutcome {
                    payload: Payload::Text(unescape_literal(&current)),
                    depth,
                    stop: UnwrapStop::ParseFailed,
                };
            }
        }
    }
}

/// Replace literal `\n`, `\t`, `\r`, `\"` and `\'` escapes in one pass
pub fn unescape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let replacement = match chars.peek() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('"') => '"',
            Some('\'') => '\'',
            _ => {
                out.push(c);
                continue;
            }
        };
        out.push(replacement);
        chars.next();
    }
    out
}

/// Pretty-print a JSON value with two-space indentation
pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
