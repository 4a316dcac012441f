//! Syntax extension trait and registry
//!
//! Every construct the lexer recognizes, including the base prose grammar,
//! is a [`SyntaxExtension`]: a pure matcher, a tokenizer and a renderer.
//! Extensions are collected in an [`ExtensionRegistry`] whose order is the
//! order the lexer tries them in.

use crate::error::{ExtensionError, RegistryError, RegistryResult};
use crate::html::HtmlWriter;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Where an extension may match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Only tried at the start of a line, before inline extensions
    Block,
    /// Tried at every position
    Inline,
}

/// Closed set of extension families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionKind {
    /// Base prose grammar: headings, lists, code, emphasis, links
    Base,
    /// Math spans
    Math,
    /// Citation markers
    Citation,
    /// Footnote references and definitions
    Footnote,
    /// Trigger-character mentions
    Mention,
    /// Lone `~` kept literal
    DisableSingleTilde,
    /// `<details>` blocks
    Details,
}

/// Furthest an inline matcher looks past its start, in bytes
///
/// Inline spans close within this window or not at all, which keeps a full
/// lex linear on input with many unclosed openers.
pub const INLINE_LOOKAHEAD: usize = 4096;

/// Position handed to matchers
#[derive(Debug, Clone, Copy)]
pub struct ScanContext<'a> {
    source: &'a str,
    pos: usize,
    line_start: bool,
}

impl<'a> ScanContext<'a> {
    /// Create a context at byte `pos` of `source`
    pub fn new(source: &'a str, pos: usize, line_start: bool) -> Self {
        Self {
            source,
            pos,
            line_start,
        }
    }

    /// Full source being lexed
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Current byte offset
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Remaining input from the current position
    pub fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    /// Remaining input cut to at most `max` bytes, on a char boundary
    pub fn window(&self, max: usize) -> &'a str {
        let rest = self.rest();
        if rest.len() <= max {
            return rest;
        }
        let mut end = max;
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        &rest[..end]
    }

    /// Whether the lexer is at the start of a line (or after a container prefix)
    pub fn at_line_start(&self) -> bool {
        self.line_start
    }

    /// Character before the current position
    pub fn prev_char(&self) -> Option<char> {
        self.source[..self.pos].chars().next_back()
    }

    /// Claim the next `len` bytes; `None` if that is not a char boundary inside the input
    pub fn take(&self, len: usize) -> Option<Match<'a>> {
        let text = self.rest().get(..len)?;
        Some(Match {
            offset: self.pos,
            text,
            captures: Vec::new(),
        })
    }
}

/// A span claimed by a matcher, with optional captured pieces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'a> {
    offset: usize,
    text: &'a str,
    captures: Vec<&'a str>,
}

impl<'a> Match<'a> {
    /// Attach a captured piece for the tokenizer
    pub fn with_capture(mut self, capture: &'a str) -> Self {
        self.captures.push(capture);
        self
    }

    /// Byte offset of the match in the source
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Matched source text
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Length of the match in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether nothing was claimed
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Captured piece by index
    pub fn capture(&self, index: usize) -> Option<&'a str> {
        self.captures.get(index).copied()
    }
}

/// A micro-grammar layered onto the lexer
///
/// `matches` must be pure and report exactly what it consumes; `tokenize`
/// may reject a match, in which case the span is kept as literal text.
pub trait SyntaxExtension: Send + Sync {
    /// Unique name in a registry
    fn name(&self) -> &str;

    /// Family this extension belongs to
    fn kind(&self) -> ExtensionKind;

    /// Block or inline
    fn scope(&self) -> Scope;

    /// Human readable summary
    fn description(&self) -> &'static str {
        ""
    }

    /// Characters a match can start with; empty means any character
    fn triggers(&self) -> Vec<char> {
        Vec::new()
    }

    /// Disabled extensions are left out when a registry is built
    fn is_enabled(&self) -> bool {
        true
    }

    /// Try to match at the current position
    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>>;

    /// Turn a match into a token kind
    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError>;

    /// Render a token this extension produced
    fn render(&self, token: &Token, out: &mut HtmlWriter);
}

/// Ordered, name-indexed set of extensions
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    extensions: Vec<Arc<dyn SyntaxExtension>>,
    by_name: HashMap<String, usize>,
}

impl ExtensionRegistry {
    /// Start building a registry
    pub fn builder() -> ExtensionRegistryBuilder {
        ExtensionRegistryBuilder::new()
    }

    /// Look an extension up by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn SyntaxExtension>> {
        self.by_name.get(name).map(|&index| &self.extensions[index])
    }

    /// Extensions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn SyntaxExtension>> + Clone {
        self.extensions.iter()
    }

    /// Number of registered extensions
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.extensions.iter().map(|ext| ext.name()).collect()
    }

    /// Counts per scope and family
    pub fn stats(&self) -> ExtensionRegistryStats {
        let mut stats = ExtensionRegistryStats::default();
        for ext in &self.extensions {
            stats.total += 1;
            match ext.scope() {
                Scope::Block => stats.block += 1,
                Scope::Inline => stats.inline += 1,
            }
            *stats.by_kind.entry(ext.kind()).or_insert(0) += 1;
        }
        stats
    }

    /// Build a lexer over these extensions
    pub fn compose(&self) -> Lexer {
        Lexer::new(self.clone())
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("extensions", &self.names())
            .finish()
    }
}

/// Builder for [`ExtensionRegistry`]
#[derive(Default)]
pub struct ExtensionRegistryBuilder {
    extensions: Vec<Arc<dyn SyntaxExtension>>,
}

impl ExtensionRegistryBuilder {
    /// Empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an extension
    pub fn with_extension(mut self, extension: Arc<dyn SyntaxExtension>) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Append several extensions, keeping their order
    pub fn with_extensions(
        mut self,
        extensions: impl IntoIterator<Item = Arc<dyn SyntaxExtension>>,
    ) -> Self {
        self.extensions.extend(extensions);
        self
    }

    /// Validate names and drop disabled extensions
    pub fn build(self) -> RegistryResult<ExtensionRegistry> {
        let mut registry = ExtensionRegistry::default();
        for ext in self.extensions {
            if !ext.is_enabled() {
                tracing::trace!(extension = ext.name(), "skipping disabled extension");
                continue;
            }
            let name = ext.name().to_string();
            if registry.by_name.contains_key(&name) {
                return Err(RegistryError::DuplicateName(name));
            }
            registry.by_name.insert(name, registry.extensions.len());
            registry.extensions.push(ext);
        }
        Ok(registry)
    }
}

/// Registry composition summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtensionRegistryStats {
    /// All extensions
    pub total: usize,
    /// Block-scope extensions
    pub block: usize,
    /// Inline-scope extensions
    pub inline: usize,
    /// Extensions per family
    pub by_kind: BTreeMap<ExtensionKind, usize>,
}

/// Compose an ordered list of extensions into a lexer
pub fn compose(
    extensions: impl IntoIterator<Item = Arc<dyn SyntaxExtension>>,
) -> RegistryResult<Lexer> {
    Ok(ExtensionRegistry::builder()
        .with_extensions(extensions)
        .build()?
        .compose())
}
