//! Citation marker syntax extension
//!
//! Markers reference the search sources attached to a message by their
//! 1-based id: `[1]`, `[1, 2]`, and adjacent markers `[1][3]` which merge
//! into one token. `[1](url)` is a link and `[1]: url` at a line start is a
//! link definition, so neither is a citation.

use crate::error::ExtensionError;
use crate::extensions::{ExtensionKind, Match, ScanContext, Scope, SyntaxExtension, INLINE_LOOKAHEAD};
use crate::html::HtmlWriter;
use crate::token::{Token, TokenKind};
use regex::Regex;
use std::sync::{Arc, LazyLock};

static CITATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\[\d+(?:[ \t]*,[ \t]*\d+)*\])+").expect("citation regex")
});

static ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("citation id regex"));

/// Citation marker syntax extension
pub struct CitationExtension;

impl CitationExtension {
    /// Create a new citation extension
    pub fn new() -> Self {
        Self
    }
}

impl Default for CitationExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxExtension for CitationExtension {
    fn name(&self) -> &str {
        "citations"
    }

    fn kind(&self) -> ExtensionKind {
        ExtensionKind::Citation
    }

    fn scope(&self) -> Scope {
        Scope::Inline
    }

    fn description(&self) -> &'static str {
        "Supports numeric source citations [1], [1,2] and merged adjacent markers [1][2]"
    }

    fn triggers(&self) -> Vec<char> {
        vec!['[']
    }

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        let found = CITATION_REGEX.find(ctx.window(INLINE_LOOKAHEAD))?;
        match ctx.rest()[found.end()..].chars().next() {
            Some('(') => return None,
            Some(':') if ctx.at_line_start() => return None,
            _ => {}
        }
        ctx.take(found.end())
    }

    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        let source_ids = ID_REGEX
            .find_iter(m.text())
            .map(|id| id.as_str().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ExtensionError::malformed(self.name(), m.offset(), e.to_string()))?;
        if source_ids.contains(&0) {
            return Err(ExtensionError::malformed(
                self.name(),
                m.offset(),
                "citation ids start at 1",
            ));
        }
        Ok(TokenKind::Citation { source_ids })
    }

    fn render(&self, token: &Token, out: &mut HtmlWriter) {
        if let TokenKind::Citation { source_ids } = &token.kind {
            out.open("sup", &[("class", "citation".to_string())]);
            for id in source_ids {
                out.element(
                    "a",
                    &[
                        ("class", "citation-ref".to_string()),
                        ("data-source", id.to_string()),
                    ],
                    &id.to_string(),
                );
            }
            out.close("sup");
        }
    }
}

/// Factory function to create the citation extension
pub fn create_citation_extension() -> Arc<dyn SyntaxExtension> {
    Arc::new(CitationExtension::new())
}
