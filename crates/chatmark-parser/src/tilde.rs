//! Keeps a lone `~` literal so that only `~~text~~` strikes through.
//!
//! Registered ahead of the strikethrough extension, which also accepts the
//! single-tilde form when this rule is disabled.

use crate::error::ExtensionError;
use crate::extensions::{ExtensionKind, Match, ScanContext, Scope, SyntaxExtension};
use crate::html::HtmlWriter;
use crate::token::{Token, TokenKind};
use std::sync::Arc;

/// Disable-single-tilde rule
pub struct DisableSingleTildeExtension;

impl SyntaxExtension for DisableSingleTildeExtension {
    fn name(&self) -> &str {
        "disable-single-tilde"
    }

    fn kind(&self) -> ExtensionKind {
        ExtensionKind::DisableSingleTilde
    }

    fn scope(&self) -> Scope {
        Scope::Inline
    }

    fn description(&self) -> &'static str {
        "Treats a single ~ as literal text; strikethrough requires ~~"
    }

    fn triggers(&self) -> Vec<char> {
        vec!['~']
    }

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        let rest = ctx.rest();
        let single = rest.starts_with('~') && !rest[1..].starts_with('~');
        if single && ctx.prev_char() != Some('~') {
            ctx.take(1)
        } else {
            None
        }
    }

    fn tokenize(&self, _m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        Ok(TokenKind::Text("~".to_string()))
    }

    fn render(&self, _token: &Token, out: &mut HtmlWriter) {
        out.text("~");
    }
}

/// Factory function to create the disable-single-tilde rule
pub fn create_disable_single_tilde_extension() -> Arc<dyn SyntaxExtension> {
    Arc::new(DisableSingleTildeExtension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(source: &str, pos: usize) -> bool {
        DisableSingleTildeExtension
            .matches(&ScanContext::new(source, pos, false))
            .is_some()
    }

    #[test]
    fn test_claims_lone_tilde_only() {
        assert!(claims("~x~", 0));
        assert!(claims("about ~5 minutes", 6));
        assert!(!claims("~~x~~", 0));
        assert!(!claims("~~x~~", 1));
        assert!(!claims("x", 0));
    }

    #[test]
    fn test_tokenizes_to_text() {
        let ctx = ScanContext::new("~", 0, false);
        let m = DisableSingleTildeExtension.matches(&ctx).unwrap();
        assert_eq!(
            DisableSingleTildeExtension.tokenize(&m).unwrap(),
            TokenKind::Text("~".to_string())
        );
    }
}
