//! Rich-content detection for unstructured tool output
//!
//! Deciding whether text should be re-lexed as formatted content is a
//! heuristic, so it sits behind [`RichContentSignal`]. The default
//! [`GlyphSignals`] looks for block markers and status glyphs, and treats
//! long multi-line text as rich as well.

use chatmark_config::InterpreterConfig;

/// Decides whether plain text deserves rich rendering
pub trait RichContentSignal: Send + Sync {
    /// True when `text` should be rendered through the lexer
    fn is_rich(&self, text: &str) -> bool;
}

impl<F> RichContentSignal for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_rich(&self, text: &str) -> bool {
        self(text)
    }
}

/// Marker and length based signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphSignals {
    /// Substrings that mark text as rich on sight
    pub markers: Vec<String>,
    /// Multi-line text at least this many chars long is rich
    pub min_multiline_length: usize,
}

impl GlyphSignals {
    /// Build from explicit markers and threshold
    pub fn new(markers: Vec<String>, min_multiline_length: usize) -> Self {
        Self {
            markers,
            min_multiline_length,
        }
    }

    /// Build from the interpreter section of the configuration
    pub fn from_config(config: &InterpreterConfig) -> Self {
        Self::new(config.rich_markers.clone(), config.rich_min_length)
    }

    fn has_marker(&self, text: &str) -> bool {
        self.markers
            .iter()
            .any(|marker| !marker.is_empty() && text.contains(marker.as_str()))
    }

    fn is_long_multiline(&self, text: &str) -> bool {
        text.contains('\n') && text.chars().count() >= self.min_multiline_length
    }
}

impl Default for GlyphSignals {
    fn default() -> Self {
        Self::from_config(&InterpreterConfig::default())
    }
}

impl RichContentSignal for GlyphSignals {
    fn is_rich(&self, text: &str) -> bool {
        self.has_marker(text) || self.is_long_multiline(text)
    }
}
