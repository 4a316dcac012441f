//! Tool-result interpretation
//!
//! Turns a [`ToolInvocationRecord`] into a [`DecodedResult`]: the result and
//! arguments are unwrapped independently, the result is classified, and the
//! files and embeds fields are decoded. Interpretation is pure and total, so
//! it runs again on every streamed update of the record.

use crate::attachments::{decode_embeds, decode_files, FileAttachment};
use crate::record::ToolInvocationRecord;
use crate::signals::{GlyphSignals, RichContentSignal};
use crate::unwrap::{pretty_json, unwrap_json, Payload, UnwrapStop};
use chatmark_config::InterpreterConfig;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// What kind of content a result holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// An object or array
    StructuredJson,
    /// Text that should be rendered as formatted content
    EmbeddedRich,
    /// Text shown as-is
    PlainText,
}

/// How a tool section body is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Embedded frames; result text is not shown. Needs at least one
    /// http(s) embed.
    Embeds,
    /// One `json` code block holding arguments and result
    StructuredJson,
    /// Arguments block, then the result lexed as chat content
    RichText,
    /// Arguments block, then the literal result
    PlainText,
}

impl From<Classification> for RenderMode {
    fn from(classification: Classification) -> Self {
        match classification {
            Classification::StructuredJson => Self::StructuredJson,
            Classification::EmbeddedRich => Self::RichText,
            Classification::PlainText => Self::PlainText,
        }
    }
}

/// Everything a renderer needs to draw one tool section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedResult {
    /// Result classification
    pub classification: Classification,
    /// Fully unwrapped result
    pub payload: Payload,
    /// Fully unwrapped arguments
    pub arguments: Payload,
    /// Arguments ready for display
    pub arguments_formatted: String,
    /// Decoded file attachments
    pub files: Vec<FileAttachment>,
    /// Decoded embed URLs
    pub embeds: Vec<String>,
    /// Derived render mode
    pub render_mode: RenderMode,
    /// Decode steps applied to the result
    pub unwrap_depth: usize,
    /// Why result unwrapping stopped
    pub unwrap_stop: UnwrapStop,
}

impl DecodedResult {
    /// Result as display text
    pub fn result_text(&self) -> String {
        self.payload.to_display_string()
    }

    /// Arguments and result as one pretty-printed JSON document
    pub fn combined_json(&self) -> String {
        pretty_json(&json!({
            "arguments": self.arguments.to_value(),
            "result": self.payload.to_value(),
        }))
    }

    /// Whether there is no result to show
    pub fn has_empty_result(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Interprets tool records with a configurable depth cap and rich signal
#[derive(Clone)]
pub struct ToolResultInterpreter {
    max_unwrap_depth: usize,
    signal: Arc<dyn RichContentSignal>,
}

impl ToolResultInterpreter {
    /// Interpreter using [`GlyphSignals`] built from `config`
    pub fn new(config: &InterpreterConfig) -> Self {
        Self {
            max_unwrap_depth: config.max_unwrap_depth.max(1),
            signal: Arc::new(GlyphSignals::from_config(config)),
        }
    }

    /// Replace the rich-content signal
    pub fn with_signal(mut self, signal: Arc<dyn RichContentSignal>) -> Self {
        self.signal = signal;
        self
    }

    /// Depth cap applied to every field
    pub fn max_unwrap_depth(&self) -> usize {
        self.max_unwrap_depth
    }

    /// Decode and classify a record
    pub fn interpret(&self, record: &ToolInvocationRecord) -> DecodedResult {
        let result = unwrap_json(&record.result, self.max_unwrap_depth);
        let arguments = unwrap_json(&record.arguments, self.max_unwrap_depth).payload;
        let classification = self.classify(&result.payload);
        let files = decode_files(&record.files, self.max_unwrap_depth);
        let embeds = decode_embeds(&record.embeds, self.max_unwrap_depth);

        let render_mode = if embeds.is_empty() {
            RenderMode::from(classification)
        } else {
            RenderMode::Embeds
        };

        tracing::debug!(
            tool = %record.name,
            ?classification,
            ?render_mode,
            depth = result.depth,
            stop = ?result.stop,
            "interpreted tool result"
        );

        DecodedResult {
            classification,
            arguments_formatted: format_arguments(&arguments),
            payload: result.payload,
            arguments,
            files,
            embeds,
            render_mode,
            unwrap_depth: result.depth,
            unwrap_stop: result.stop,
        }
    }

    /// Classify an unwrapped payload
    pub fn classify(&self, payload: &Payload) -> Classification {
        match payload {
            Payload::Json(Value::Object(_) | Value::Array(_)) => Classification::StructuredJson,
            Payload::Json(_) => Classification::PlainText,
            Payload::Text(text) if self.signal.is_rich(text) => Classification::EmbeddedRich,
            Payload::Text(_) => Classification::PlainText,
        }
    }
}

impl Default for ToolResultInterpreter {
    fn default() -> Self {
        Self::new(&InterpreterConfig::default())
    }
}

impl std::fmt::Debug for ToolResultInterpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolResultInterpreter")
            .field("max_unwrap_depth", &self.max_unwrap_depth)
            .finish_non_exhaustive()
    }
}

/// JSON arguments pretty-printed, text arguments as they are
pub fn format_arguments(arguments: &Payload) -> String {
    match arguments {
        Payload::Json(value) => pretty_json(value),
        Payload::Text(text) => text.clone(),
    }
}
