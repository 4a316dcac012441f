//! Extension-composing lexer
//!
//! Scans left to right. At a line start, block extensions are tried first,
//! then inline extensions; the first match wins. Unmatched input accrues
//! into a pending text token that is flushed lazily, so a full lex is linear
//! in the input for matchers that look ahead a bounded amount.
//!
//! Every call lexes the complete snapshot it is given. Streaming callers
//! simply call again with the longer text.

use crate::error::ExtensionError;
use crate::extensions::{ExtensionRegistry, Scope, ScanContext, SyntaxExtension};
use crate::html::HtmlWriter;
use crate::token::{Span, Token, TokenKind};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

type ExtensionList = Vec<Arc<dyn SyntaxExtension>>;

/// Per-character candidate lists, built once at composition
#[derive(Default)]
struct DispatchTable {
    by_char: HashMap<char, ExtensionList>,
    any: ExtensionList,
}

impl DispatchTable {
    fn build<'a>(extensions: impl Iterator<Item = &'a Arc<dyn SyntaxExtension>> + Clone) -> Self {
        let triggers: BTreeSet<char> = extensions
            .clone()
            .flat_map(|ext| ext.triggers())
            .collect();

        let mut table = Self::default();
        for ext in extensions.clone() {
            if ext.triggers().is_empty() {
                table.any.push(Arc::clone(ext));
            }
        }
        for trigger in triggers {
            let candidates = extensions
                .clone()
                .filter(|ext| {
                    let own = ext.triggers();
                    own.is_empty() || own.contains(&trigger)
                })
                .map(Arc::clone)
                .collect();
            table.by_char.insert(trigger, candidates);
        }
        table
    }

    fn candidates(&self, ch: char) -> &[Arc<dyn SyntaxExtension>] {
        self.by_char.get(&ch).unwrap_or(&self.any)
    }
}

enum Outcome {
    Token(Token),
    Literal(usize),
}

/// Tokens plus the recovered extension errors of one lex
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexOutput {
    /// Token sequence covering the whole input
    pub tokens: Vec<Token>,
    /// Spans that fell back to literal text, in document order
    pub diagnostics: Vec<ExtensionError>,
}

/// A composed lexer; cheap to share, immutable after composition
pub struct Lexer {
    registry: ExtensionRegistry,
    block: DispatchTable,
    inline: DispatchTable,
}

impl Lexer {
    /// Compose a lexer from a registry
    pub fn new(registry: ExtensionRegistry) -> Self {
        let block = DispatchTable::build(registry.iter().filter(|ext| ext.scope() == Scope::Block));
        let inline =
            DispatchTable::build(registry.iter().filter(|ext| ext.scope() == Scope::Inline));
        tracing::trace!(extensions = ?registry.names(), "composed lexer");
        Self {
            registry,
            block,
            inline,
        }
    }

    /// Extensions this lexer was composed from
    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Lex a complete snapshot of the input
    pub fn lex(&self, source: &str) -> Vec<Token> {
        self.lex_with_diagnostics(source).tokens
    }

    /// Lex and also report spans that fell back to literal text
    pub fn lex_with_diagnostics(&self, source: &str) -> LexOutput {
        let mut tokens = Vec::new();
        let mut diagnostics = Vec::new();
        let mut text_start: Option<usize> = None;
        let mut pos = 0;
        let mut line_start = true;

        while let Some(ch) = source[pos..].chars().next() {
            let ctx = ScanContext::new(source, pos, line_start);
            let mut outcome = None;
            if line_start {
                outcome = try_extensions(self.block.candidates(ch), &ctx, &mut diagnostics);
            }
            if outcome.is_none() {
                outcome = try_extensions(self.inline.candidates(ch), &ctx, &mut diagnostics);
            }

            match outcome {
                Some(Outcome::Token(token)) => {
                    flush_text(source, &mut text_start, pos, &mut tokens);
                    pos = token.span.end;
                    line_start =
                        token.kind.is_container_prefix() || source[..pos].ends_with('\n');
                    tokens.push(token);
                }
                Some(Outcome::Literal(len)) => {
                    text_start.get_or_insert(pos);
                    pos += len;
                    line_start = source[..pos].ends_with('\n');
                }
                None => {
                    text_start.get_or_insert(pos);
                    pos += ch.len_utf8();
                    line_start = ch == '\n';
                }
            }
        }
        flush_text(source, &mut text_start, pos, &mut tokens);

        LexOutput {
            tokens,
            diagnostics,
        }
    }

    /// Render tokens through the extensions that produced them
    pub fn render_html(&self, tokens: &[Token]) -> String {
        self.render_html_with(tokens, |_, _| false)
    }

    /// Render tokens, giving `intercept` the first chance at each one
    ///
    /// `intercept` returns true when it rendered the token itself.
    pub fn render_html_with<F>(&self, tokens: &[Token], mut intercept: F) -> String
    where
        F: FnMut(&Token, &mut HtmlWriter) -> bool,
    {
        let mut out = HtmlWriter::new();
        for token in tokens {
            if !intercept(token, &mut out) {
                self.render_token(token, &mut out);
            }
        }
        out.finish()
    }

    /// Render tokens as an inline fragment, without paragraph wrapping
    pub fn render_inline(&self, tokens: &[Token]) -> String {
        let mut out = HtmlWriter::inline();
        for token in tokens {
            self.render_token(token, &mut out);
        }
        out.finish()
    }

    /// Render a single token into `out`
    pub fn render_token(&self, token: &Token, out: &mut HtmlWriter) {
        let extension = token
            .extension
            .as_deref()
            .and_then(|name| self.registry.get(name));
        match extension {
            Some(ext) => ext.render(token, out),
            None => render_fallback(token, out),
        }
    }

    /// Lex and render in one step
    pub fn to_html(&self, source: &str) -> String {
        self.render_html(&self.lex(source))
    }
}

impl std::fmt::Debug for Lexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("registry", &self.registry)
            .finish()
    }
}

fn try_extensions(
    candidates: &[Arc<dyn SyntaxExtension>],
    ctx: &ScanContext<'_>,
    diagnostics: &mut Vec<ExtensionError>,
) -> Option<Outcome> {
    for ext in candidates {
        let Some(m) = ext.matches(ctx) else {
            continue;
        };
        if m.is_empty() || m.offset() != ctx.pos() {
            tracing::warn!(
                extension = ext.name(),
                offset = ctx.pos(),
                "extension reported a match it does not own, ignoring"
            );
            diagnostics.push(ExtensionError::InvalidMatch {
                extension: ext.name().to_string(),
                offset: ctx.pos(),
                len: m.len(),
            });
            continue;
        }

        let span = Span::new(m.offset(), m.offset() + m.len());
        return match ext.tokenize(&m) {
            Ok(TokenKind::Text(_)) => Some(Outcome::Literal(m.len())),
            Ok(kind) => Some(Outcome::Token(Token {
                kind,
                span,
                extension: Some(ext.name().to_string()),
            })),
            Err(err) => {
                tracing::debug!(error = %err, "keeping malformed span as literal text");
                diagnostics.push(err);
                Some(Outcome::Literal(m.len()))
            }
        };
    }
    None
}

fn flush_text(source: &str, text_start: &mut Option<usize>, end: usize, tokens: &mut Vec<Token>) {
    if let Some(start) = text_start.take() {
        if start < end {
            tokens.push(Token::text(&source[start..end], Span::new(start, end)));
        }
    }
}

fn render_fallback(token: &Token, out: &mut HtmlWriter) {
    match &token.kind {
        TokenKind::Text(text) | TokenKind::RawHtmlEscape(text) => out.text(text),
        TokenKind::Escape(ch) => out.text(ch.encode_utf8(&mut [0; 4])),
        TokenKind::CodeSpan(code) => out.element("code", &[], code),
        TokenKind::Paragraph => out.end_block(),
        other => {
            tracing::warn!(kind = other.name(), "no renderer registered for token");
        }
    }
}
