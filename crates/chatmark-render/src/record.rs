//! Tool invocation records
//!
//! A record is created when a tool call starts (`done = false`, empty
//! result), grows while output streams in and is stable once `done` is set.
//! Every raw field is kept exactly as received; decoding belongs to the
//! interpreter.

use crate::error::{RecordError, RecordResult};
use chatmark_parser::{Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Section type carried by tool call details blocks
pub const TOOL_CALLS_TYPE: &str = "tool_calls";

/// One tool invocation as assembled by the message layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolInvocationRecord {
    /// Call id, unique within the message
    pub id: String,
    /// Tool name
    pub name: String,
    /// Arguments as received, usually JSON
    pub arguments: String,
    /// Result as received; empty until output arrives
    pub result: String,
    /// Attached files, possibly JSON-encoded more than once
    pub files: String,
    /// Embed URLs, possibly JSON-encoded more than once
    pub embeds: String,
    /// Whether the call has finished
    pub done: bool,
}

impl ToolInvocationRecord {
    /// Start a call
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the raw arguments
    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = arguments.into();
        self
    }

    /// Set the raw result
    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = result.into();
        self
    }

    /// Set the raw files field
    pub fn with_files(mut self, files: impl Into<String>) -> Self {
        self.files = files.into();
        self
    }

    /// Set the raw embeds field
    pub fn with_embeds(mut self, embeds: impl Into<String>) -> Self {
        self.embeds = embeds.into();
        self
    }

    /// Mark the call finished
    pub fn done(mut self) -> Self {
        self.done = true;
        self
    }

    /// Append streamed output to an unfinished call
    ///
    /// Output arriving after completion is ignored.
    pub fn append_result(&mut self, chunk: &str) {
        if self.done {
            tracing::debug!(id = %self.id, "ignoring output for a finished tool call");
            return;
        }
        self.result.push_str(chunk);
    }

    /// Finish the call with its final result
    pub fn complete(&mut self, result: impl Into<String>) {
        self.result = result.into();
        self.done = true;
    }

    /// Build a record from the decoded attributes of a details block
    pub fn from_details(attributes: &BTreeMap<String, String>) -> RecordResult<Self> {
        let section_type = attributes.get("type");
        if section_type.map(String::as_str) != Some(TOOL_CALLS_TYPE) {
            return Err(RecordError::NotToolCall {
                found: section_type.cloned(),
            });
        }

        let field = |name: &str| attributes.get(name).cloned().unwrap_or_default();
        let name = field("name");
        if name.trim().is_empty() {
            return Err(RecordError::MissingField("name"));
        }

        Ok(Self {
            id: field("id"),
            name,
            arguments: field("arguments"),
            result: field("result"),
            files: field("files"),
            embeds: field("embeds"),
            done: attributes.get("done").is_some_and(|d| d == "true"),
        })
    }

    /// Build a record from a lexed details token
    pub fn from_token(token: &Token) -> RecordResult<Self> {
        match &token.kind {
            TokenKind::Details { attributes, .. } => Self::from_details(attributes),
            _ => Err(RecordError::NotToolCall { found: None }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_details() {
        let record = ToolInvocationRecord::from_details(&attrs(&[
            ("type", "tool_calls"),
            ("done", "true"),
            ("id", "call_7"),
            ("name", "get_weather"),
            ("arguments", r#"{"city":"Oslo"}"#),
            ("result", r#""sunny""#),
        ]))
        .unwrap();
        assert_eq!(record.id, "call_7");
        assert_eq!(record.name, "get_weather");
        assert!(record.done);
        assert_eq!(record.files, "");
    }

    #[test]
    fn test_in_progress_call() {
        let record = ToolInvocationRecord::from_details(&attrs(&[
            ("type", "tool_calls"),
            ("done", "false"),
            ("name", "search"),
        ]))
        .unwrap();
        assert!(!record.done);
        assert!(record.result.is_empty());
    }

    #[test]
    fn test_rejections() {
        let err = ToolInvocationRecord::from_details(&attrs(&[("type", "reasoning")])).unwrap_err();
        assert_eq!(
            err,
            RecordError::NotToolCall {
                found: Some("reasoning".to_string())
            }
        );
        let err = ToolInvocationRecord::from_details(&attrs(&[("type", "tool_calls")])).unwrap_err();
        assert!(err.is_empty_record());
    }

    #[test]
    fn test_from_token() {
        let lexer = chatmark_parser::default_lexer();
        let tokens = lexer.lex(concat!(
            "<details type=\"tool_calls\" done=\"true\" id=\"c1\" name=\"ls\" result=\"a &amp; b\">\n",
            "<summary>x</summary>\n</details>\nafter"
        ));
        let record = ToolInvocationRecord::from_token(&tokens[0]).unwrap();
        assert_eq!(record.id, "c1");
        assert_eq!(record.result, "a & b");
        assert_eq!(
            ToolInvocationRecord::from_token(&tokens[1]).unwrap_err(),
            RecordError::NotToolCall { found: None }
        );
    }

    #[test]
    fn test_streaming_mutation() {
        let mut record = ToolInvocationRecord::new("1", "bash");
        record.append_result("line 1\n");
        record.append_result("line 2");
        assert_eq!(record.result, "line 1\nline 2");
        record.complete("done");
        record.append_result("late");
        assert_eq!(record.result, "done");
        assert!(record.done);
    }
}
