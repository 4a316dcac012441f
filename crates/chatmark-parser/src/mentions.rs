//! Mention syntax extension
//!
//! One extension instance per trigger character. Two forms are recognized:
//! - bare: `@alice`, `#channel`, preceded by the start of input, whitespace
//!   or an opening bracket or quote
//! - bracketed: `<@U123|Alice>` or `<@U123>`, as emitted by chat backends

use crate::error::ExtensionError;
use crate::extensions::{ExtensionKind, Match, ScanContext, Scope, SyntaxExtension};
use crate::html::HtmlWriter;
use crate::token::{Token, TokenKind};
use std::sync::Arc;

const OPENERS: &[char] = &['(', '[', '{', '"', '\''];

/// Mention syntax extension for a single trigger character
pub struct MentionExtension {
    trigger: char,
    name: String,
}

impl MentionExtension {
    /// Create a mention extension for `trigger`
    pub fn new(trigger: char) -> Self {
        Self {
            trigger,
            name: format!("mention-{}", trigger),
        }
    }

    /// The trigger character
    pub fn trigger(&self) -> char {
        self.trigger
    }

    fn is_query_char(c: char) -> bool {
        c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':')
    }

    fn bare<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        if let Some(prev) = ctx.prev_char() {
            if !(prev.is_whitespace() || OPENERS.contains(&prev)) {
                return None;
            }
        }
        let after = ctx.rest().strip_prefix(self.trigger)?;
        let end = after
            .char_indices()
            .find(|&(_, c)| !Self::is_query_char(c))
            .map_or(after.len(), |(i, _)| i);
        // sentence punctuation right after a mention is not part of it
        let query = after[..end].trim_end_matches(['.', '-', ':', '/']);
        if !query.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
            return None;
        }
        Some(
            ctx.take(self.trigger.len_utf8() + query.len())?
                .with_capture(query),
        )
    }

    fn bracketed<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        let inner = ctx.rest().strip_prefix('<')?.strip_prefix(self.trigger)?;
        let close = inner.find(['>', '\n', '<'])?;
        if !inner[close..].starts_with('>') {
            return None;
        }
        let body = &inner[..close];
        let (query, label) = match body.split_once('|') {
            Some((query, label)) => (query, Some(label)),
            None => (body, None),
        };
        if query.is_empty() || query.contains(char::is_whitespace) {
            return None;
        }
        let m = ctx
            .take(1 + self.trigger.len_utf8() + close + 1)?
            .with_capture(query);
        Some(match label {
            Some(label) => m.with_capture(label),
            None => m,
        })
    }
}

impl SyntaxExtension for MentionExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ExtensionKind {
        ExtensionKind::Mention
    }

    fn scope(&self) -> Scope {
        Scope::Inline
    }

    fn description(&self) -> &'static str {
        "Supports trigger-character mentions such as @user and <@id|label>"
    }

    fn triggers(&self) -> Vec<char> {
        vec![self.trigger, '<']
    }

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        if ctx.rest().starts_with('<') {
            self.bracketed(ctx)
        } else {
            self.bare(ctx)
        }
    }

    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        let label = m.capture(1).map(str::trim).filter(|l| !l.is_empty());
        Ok(TokenKind::Mention {
            trigger: self.trigger,
            query: m.capture(0).unwrap_or_default().to_string(),
            label: label.map(str::to_string),
        })
    }

    fn render(&self, token: &Token, out: &mut HtmlWriter) {
        if let TokenKind::Mention {
            trigger,
            query,
            label,
        } = &token.kind
        {
            let shown = format!("{}{}", trigger, label.as_deref().unwrap_or(query));
            out.element(
                "span",
                &[
                    ("class", "mention".to_string()),
                    ("data-trigger", trigger.to_string()),
                    ("data-query", query.clone()),
                ],
                &shown,
            );
        }
    }
}

/// Factory function to create a mention extension for `trigger`
pub fn create_mention_extension(trigger: char) -> Arc<dyn SyntaxExtension> {
    Arc::new(MentionExtension::new(trigger))
}
