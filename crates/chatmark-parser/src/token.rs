//! Token types produced by the lexer

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// Byte range of the source covered by a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers nothing
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The span as a `Range` for slicing
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Whether a footnote token is a reference or the start of its definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FootnoteKind {
    /// Inline `[^label]`
    Reference,
    /// Line-prefix `[^label]: `
    Definition,
}

/// The kinds of token the default registry can produce
///
/// Block-level kinds such as [`TokenKind::Heading`] are line-prefix markers:
/// the content of the line follows as ordinary inline tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TokenKind {
    /// Literal prose
    Text(String),
    /// `#`..`######` heading marker
    Heading {
        /// Heading level, 1 to 6
        level: u8,
    },
    /// A run of blank lines ending the current paragraph
    Paragraph,
    /// `-`, `*`, `+` or `1.` list item marker
    ListItem {
        /// Numbered list
        ordered: bool,
        /// Number written in the marker for ordered items
        number: Option<u64>,
        /// Nesting depth derived from indentation
        depth: usize,
    },
    /// `>` blockquote marker
    Blockquote,
    /// `---`, `***` or `___`
    HorizontalRule,
    /// Fenced code block
    CodeBlock {
        /// Info string, if any
        lang: Option<String>,
        /// Code without the fences
        body: String,
        /// False while the closing fence has not arrived yet
        closed: bool,
    },
    /// `` `code` ``
    CodeSpan(String),
    /// Math span handed to an external typesetter
    Math {
        /// TeX source without delimiters
        body: String,
        /// `$$`/`\[` display math as opposed to inline math
        display: bool,
    },
    /// `[1]`, `[1,2]` or adjacent `[1][2]` citation markers
    Citation {
        /// Referenced source ids, in written order
        source_ids: Vec<u32>,
    },
    /// Footnote reference or definition marker
    Footnote {
        /// Reference or definition
        kind: FootnoteKind,
        /// Footnote label
        label: String,
    },
    /// `@query`, `#query` or the bracketed `<@query|label>` form
    Mention {
        /// Trigger character
        trigger: char,
        /// Mentioned entity
        query: String,
        /// Display label from the bracketed form
        label: Option<String>,
    },
    /// `~~text~~`
    ///
    /// The body is literal text. It is not lexed again, so math, mentions
    /// and nested emphasis inside it render as written. The same holds for
    /// [`Strong`](Self::Strong), [`Emphasis`](Self::Emphasis) and link text.
    Strikethrough(String),
    /// `**text**`, body kept literal
    Strong(String),
    /// `*text*`, body kept literal
    Emphasis(String),
    /// `[text](url)`
    Link {
        /// Link text
        text: String,
        /// Target
        url: String,
    },
    /// `![alt](url)`
    Image {
        /// Alt text
        alt: String,
        /// Source
        url: String,
    },
    /// Backslash-escaped punctuation
    Escape(char),
    /// HTML tag found in model output, shown escaped rather than interpreted
    RawHtmlEscape(String),
    /// `<details>` block
    Details {
        /// Attributes of the opening tag, entity-decoded
        attributes: BTreeMap<String, String>,
        /// Text of the `<summary>` element
        summary: Option<String>,
        /// Inner content without the summary, not lexed
        body: String,
    },
}

impl TokenKind {
    /// Short stable name, used in logs and stats
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Heading { .. } => "heading",
            Self::Paragraph => "paragraph",
            Self::ListItem { .. } => "list_item",
            Self::Blockquote => "blockquote",
            Self::HorizontalRule => "horizontal_rule",
            Self::CodeBlock { .. } => "code_block",
            Self::CodeSpan(_) => "code_span",
            Self::Math { .. } => "math",
            Self::Citation { .. } => "citation",
            Self::Footnote { .. } => "footnote",
            Self::Mention { .. } => "mention",
            Self::Strikethrough(_) => "strikethrough",
            Self::Strong(_) => "strong",
            Self::Emphasis(_) => "emphasis",
            Self::Link { .. } => "link",
            Self::Image { .. } => "image",
            Self::Escape(_) => "escape",
            Self::RawHtmlEscape(_) => "raw_html",
            Self::Details { .. } => "details",
        }
    }

    /// Line-prefix markers after which another block marker may follow
    pub fn is_container_prefix(&self) -> bool {
        matches!(self, Self::Blockquote | Self::ListItem { .. })
    }

    /// Whether this is plain text
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

/// A lexed token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// What was recognized
    pub kind: TokenKind,
    /// Source range covered
    pub span: Span,
    /// Name of the extension that produced the token, `None` for text
    pub extension: Option<String>,
}

impl Token {
    /// Create a plain text token
    pub fn text(content: impl Into<String>, span: Span) -> Self {
        Self {
            kind: TokenKind::Text(content.into()),
            span,
            extension: None,
        }
    }

    /// The slice of `source` this token was lexed from
    ///
    /// `source` must be the text the token came from.
    pub fn source<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.range()]
    }
}

/// Concatenate the source slices covered by `tokens`
///
/// For tokens returned by `Lexer::lex(source)` this returns `source` unchanged.
pub fn reconstruct(source: &str, tokens: &[Token]) -> String {
    let mut out = String::with_capacity(source.len());
    for token in tokens {
        out.push_str(token.source(source));
    }
    out
}
