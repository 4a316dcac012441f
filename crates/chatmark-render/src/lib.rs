//! Chatmark Render
//!
//! Turns lexed chat content into HTML, with special handling for tool calls:
//! - `ToolInvocationRecord` built from `<details type="tool_calls">` blocks
//! - Bounded recursive JSON unwrapping of results, arguments, files and embeds
//! - Classification into structured JSON, embedded rich content or plain text
//! - A collapsible-section controller with forced-collapse section types
//! - Section and message renderers with translatable header labels

pub mod attachments;
pub mod collapsible;
pub mod error;
pub mod interpreter;
pub mod message;
pub mod record;
pub mod section;
pub mod signals;
pub mod translate;
pub mod unwrap;

pub use attachments::{decode_embeds, decode_files, is_embeddable, AttachmentKind, FileAttachment};
pub use collapsible::{
    ChangeCause, CollapsibleController, CollapsibleState, ListenerId, SectionChange,
};
pub use error::{RecordError, RecordResult};
pub use interpreter::{
    format_arguments, Classification, DecodedResult, RenderMode, ToolResultInterpreter,
};
pub use message::MessageRenderer;
pub use record::{ToolInvocationRecord, TOOL_CALLS_TYPE};
pub use section::ToolSectionRenderer;
pub use signals::{GlyphSignals, RichContentSignal};
pub use translate::{interpolate, DefaultTranslator, Translator, EXECUTING, VIEW_RESULT};
pub use unwrap::{unescape_literal, unwrap_json, Payload, UnwrapOutcome, UnwrapStop};
