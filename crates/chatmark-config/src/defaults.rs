//! Documented default values
//!
//! These are part of the public contract: changing one changes how existing
//! content renders.

/// Mention trigger characters composed by default, in registration order
pub const DEFAULT_MENTION_TRIGGERS: &[char] = &['@', '#'];

/// Deepest `<details>` nesting lexed and rendered as sections
pub const DEFAULT_MAX_DETAILS_DEPTH: usize = 16;

/// Maximum number of JSON decode steps applied to a tool result
pub const DEFAULT_MAX_UNWRAP_DEPTH: usize = 8;

/// Minimum length (in chars) of a multi-line result to count as rich content
pub const DEFAULT_RICH_MIN_LENGTH: usize = 100;

/// Markers whose presence flags a tool result as rich content
pub const DEFAULT_RICH_MARKERS: &[&str] = &["##", "**", "═", "━", "📊", "📄", "💾", "✅", "❌"];

/// Section types whose initial state ignores the default-open preference
pub const DEFAULT_FORCED_COLLAPSE_TYPES: &[&str] = &["tool_calls"];
