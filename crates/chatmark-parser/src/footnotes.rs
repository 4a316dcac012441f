//! Footnote syntax extension for chat markdown
//!
//! - Reference footnotes: `[^1]`, `[^note]`, `[^custom-reference]`
//! - Definition markers: `[^1]: Footnote content here` at the start of a
//!   line; the definition text follows as ordinary inline tokens

use crate::error::ExtensionError;
use crate::extensions::{ExtensionKind, Match, ScanContext, Scope, SyntaxExtension, INLINE_LOOKAHEAD};
use crate::html::HtmlWriter;
use crate::token::{FootnoteKind, Token, TokenKind};
use regex::Regex;
use std::sync::{Arc, LazyLock};

static REFERENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\^([\w\-]+(?: [\w\-]+)*)\]").expect("footnote reference regex"));

static DEFINITION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*\[\^([\w\-]+(?: [\w\-]+)*)\]:[ \t]*").expect("footnote definition regex")
});

fn anchor(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join("-")
}

fn footnote_match<'a>(regex: &Regex, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
    let caps = regex.captures(ctx.window(INLINE_LOOKAHEAD))?;
    let whole = caps.get(0)?;
    let label = caps.get(1)?.as_str();
    Some(ctx.take(whole.end())?.with_capture(label))
}

/// Inline `[^label]` references
pub struct FootnoteReferenceExtension;

impl SyntaxExtension for FootnoteReferenceExtension {
    fn name(&self) -> &str {
        "footnote-reference"
    }

    fn kind(&self) -> ExtensionKind {
        ExtensionKind::Footnote
    }

    fn scope(&self) -> Scope {
        Scope::Inline
    }

    fn description(&self) -> &'static str {
        "Supports markdown footnote references [^label]"
    }

    fn triggers(&self) -> Vec<char> {
        vec!['[']
    }

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        footnote_match(&REFERENCE_REGEX, ctx)
    }

    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        Ok(TokenKind::Footnote {
            kind: FootnoteKind::Reference,
            label: m.capture(0).unwrap_or_default().to_string(),
        })
    }

    fn render(&self, token: &Token, out: &mut HtmlWriter) {
        if let TokenKind::Footnote { label, .. } = &token.kind {
            let id = anchor(label);
            out.open("sup", &[("class", "footnote-ref".to_string())]);
            out.element(
                "a",
                &[
                    ("href", format!("#fn-{}", id)),
                    ("id", format!("fnref-{}", id)),
                ],
                label,
            );
            out.close("sup");
        }
    }
}

/// Line-prefix `[^label]: ` definitions
pub struct FootnoteDefinitionExtension;

impl SyntaxExtension for FootnoteDefinitionExtension {
    fn name(&self) -> &str {
        "footnote-definition"
    }

    fn kind(&self) -> ExtensionKind {
        ExtensionKind::Footnote
    }

    fn scope(&self) -> Scope {
        Scope::Block
    }

    fn description(&self) -> &'static str {
        "Supports markdown footnote definitions [^label]: text"
    }

    fn triggers(&self) -> Vec<char> {
        vec!['[', ' ', '\t']
    }

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        footnote_match(&DEFINITION_REGEX, ctx)
    }

    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        Ok(TokenKind::Footnote {
            kind: FootnoteKind::Definition,
            label: m.capture(0).unwrap_or_default().to_string(),
        })
    }

    fn render(&self, token: &Token, out: &mut HtmlWriter) {
        if let TokenKind::Footnote { label, .. } = &token.kind {
            out.open_line_block(
                "div",
                &[
                    ("class", "footnote".to_string()),
                    ("id", format!("fn-{}", anchor(label))),
                ],
            );
            out.element("span", &[("class", "footnote-label".to_string())], label);
            out.text(" ");
        }
    }
}

/// Factory function to create the footnote reference extension
pub fn create_footnote_reference_extension() -> Arc<dyn SyntaxExtension> {
    Arc::new(FootnoteReferenceExtension)
}

/// Factory function to create the footnote definition extension
pub fn create_footnote_definition_extension() -> Arc<dyn SyntaxExtension> {
    Arc::new(FootnoteDefinitionExtension)
}
