//! LaTeX mathematical expression syntax extension
//!
//! Supported delimiters:
//! - Inline math: `$\frac{3}{2}$` and `\(x\)`
//! - Display math: `$$\int_0^1 f(x)dx$$` and `\[x\]`
//!
//! Display math may span lines. Inline `$` math stays on one line, must not
//! start or end with whitespace and must not be followed by a digit, so
//! prices like `$5 and $10` stay prose.

use crate::error::ExtensionError;
use crate::extensions::{ExtensionKind, Match, ScanContext, Scope, SyntaxExtension, INLINE_LOOKAHEAD};
use crate::html::HtmlWriter;
use crate::token::{Token, TokenKind};
use std::sync::Arc;

const DISPLAY: &str = "display";

/// Display math may run over several lines but closes within this many bytes
const DISPLAY_LOOKAHEAD: usize = 32 * 1024;

/// Commands rejected because a typesetter would execute them
const DANGEROUS_COMMANDS: &[&str] = &[
    "\\write",
    "\\input",
    "\\include",
    "\\openout",
    "\\closeout",
    "\\loop",
    "\\def",
    "\\edef",
    "\\xdef",
    "\\gdef",
    "\\let",
    "\\futurelet",
    "\\newcommand",
    "\\renewcommand",
    "\\catcode",
];

/// LaTeX mathematical expression syntax extension
pub struct LatexExtension;

impl LatexExtension {
    /// Create a new LaTeX extension
    pub fn new() -> Self {
        Self
    }

    fn delimited<'a>(
        ctx: &ScanContext<'a>,
        open: &str,
        close: &str,
        display: bool,
    ) -> Option<Match<'a>> {
        let lookahead = if display {
            DISPLAY_LOOKAHEAD
        } else {
            INLINE_LOOKAHEAD
        };
        let inner = ctx.window(lookahead).strip_prefix(open)?;
        let end = inner.find(close)?;
        let body = &inner[..end];
        if body.trim().is_empty() {
            return None;
        }
        let m = ctx.take(open.len() + end + close.len())?.with_capture(body);
        Some(if display { m.with_capture(DISPLAY) } else { m })
    }

    fn inline_dollar<'a>(ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        let inner = ctx.window(INLINE_LOOKAHEAD).strip_prefix('$')?;
        let mut prev = None;
        for (i, ch) in inner.char_indices() {
            match ch {
                '\n' => return None,
                '$' if prev != Some('\\') => {
                    let body = &inner[..i];
                    let starts_blank = body.starts_with(char::is_whitespace);
                    let ends_blank = body.ends_with(char::is_whitespace);
                    if body.is_empty() || starts_blank || ends_blank {
                        return None;
                    }
                    let after = ctx.rest()[i + 2..].chars().next();
                    if after.is_some_and(|c| c.is_ascii_digit()) {
                        return None;
                    }
                    return Some(ctx.take(i + 2)?.with_capture(body));
                }
                _ => {}
            }
            prev = Some(ch);
        }
        None
    }

    /// Basic LaTeX syntax validation
    pub fn validate_latex_syntax(&self, latex: &str) -> Result<(), String> {
        let latex = latex.trim();

        let mut depth: i32 = 0;
        let mut escaped = false;
        for c in latex.chars() {
            match c {
                '\\' if !escaped => {
                    escaped = true;
                    continue;
                }
                '{' if !escaped => depth += 1,
                '}' if !escaped => {
                    depth -= 1;
                    if depth < 0 {
                        break;
                    }
                }
                _ => {}
            }
            escaped = false;
        }
        if depth != 0 {
            return Err(format!(
                "Unbalanced braces in LaTeX expression: extra {}",
                if depth > 0 { "opening" } else { "closing" }
            ));
        }

        if latex.contains("\\begin{") && !latex.contains("\\end{") {
            return Err("LaTeX environment without \\end tag".to_string());
        }

        for cmd in DANGEROUS_COMMANDS {
            let unsafe_use = latex.match_indices(cmd).any(|(at, _)| {
                !latex[at + cmd.len()..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic())
            });
            if unsafe_use {
                return Err(format!("Potentially unsafe LaTeX command: {}", cmd));
            }
        }

        Ok(())
    }
}

impl Default for LatexExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxExtension for LatexExtension {
    fn name(&self) -> &str {
        "latex-math"
    }

    fn kind(&self) -> ExtensionKind {
        ExtensionKind::Math
    }

    fn scope(&self) -> Scope {
        Scope::Inline
    }

    fn description(&self) -> &'static str {
        "Supports LaTeX mathematical expressions using $...$ (inline) and $$...$$ (display) syntax"
    }

    fn triggers(&self) -> Vec<char> {
        vec!['$', '\\']
    }

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        let rest = ctx.rest();
        if rest.starts_with("$$") {
            Self::delimited(ctx, "$$", "$$", true)
        } else if rest.starts_with('$') {
            Self::inline_dollar(ctx)
        } else if rest.starts_with("\\[") {
            Self::delimited(ctx, "\\[", "\\]", true)
        } else if rest.starts_with("\\(") {
            Self::delimited(ctx, "\\(", "\\)", false)
        } else {
            None
        }
    }

    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        let body = m.capture(0).unwrap_or_default();
        self.validate_latex_syntax(body)
            .map_err(|reason| ExtensionError::malformed(self.name(), m.offset(), reason))?;
        Ok(TokenKind::Math {
            body: body.to_string(),
            display: m.capture(1) == Some(DISPLAY),
        })
    }

    fn render(&self, token: &Token, out: &mut HtmlWriter) {
        if let TokenKind::Math { body, display } = &token.kind {
            if *display {
                out.open_block("div", &[("class", "math math-display".to_string())]);
                out.escaped(body);
                out.close("div");
            } else {
                out.element("span", &[("class", "math math-inline".to_string())], body);
            }
        }
    }
}

/// Factory function to create the LaTeX extension
pub fn create_latex_extension() -> Arc<dyn SyntaxExtension> {
    Arc::new(LatexExtension::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn lex_one(source: &str) -> Option<TokenKind> {
        let ext = LatexExtension::new();
        let ctx = ScanContext::new(source, 0, false);
        let m = ext.matches(&ctx)?;
        assert_eq!(m.len(), source.len(), "match must cover {:?}", source);
        ext.tokenize(&m).ok()
    }

    #[test_case("$E=mc^2$", "E=mc^2", false ; "inline dollar")]
    #[test_case("$$\\int_0^1 f(x)dx$$", "\\int_0^1 f(x)dx", true ; "display dollar")]
    #[test_case("\\[a+b\\]", "a+b", true ; "display bracket")]
    #[test_case("\\(a+b\\)", "a+b", false ; "inline paren")]
    #[test_case("$$\nx\n$$", "\nx\n", true ; "display across lines")]
    fn test_math_delimiters(source: &str, body: &str, display: bool) {
        assert_eq!(
            lex_one(source),
            Some(TokenKind::Math {
                body: body.to_string(),
                display,
            })
        );
    }

    #[test_case("$5 and $10" ; "prices")]
    #[test_case("$ x$" ; "leading space")]
    #[test_case("$x $" ; "trailing space")]
    #[test_case("$x\ny$" ; "inline across lines")]
    #[test_case("$$" ; "empty display")]
    #[test_case("$$x" ; "unclosed display")]
    #[test_case("$x$5" ; "closing dollar before digit")]
    fn test_non_math(source: &str) {
        let ext = LatexExtension::new();
        assert!(ext.matches(&ScanContext::new(source, 0, false)).is_none());
    }

    #[test]
    fn test_escaped_dollar_inside_inline() {
        assert_eq!(
            lex_one("$a\\$b$"),
            Some(TokenKind::Math {
                body: "a\\$b".to_string(),
                display: false,
            })
        );
    }

    #[test]
    fn test_latex_validation() {
        let extension = LatexExtension::new();

        assert!(extension.validate_latex_syntax("\\frac{1}{2}").is_ok());
        assert!(extension.validate_latex_syntax("\\frac{1}{2").is_err());
        assert!(extension.validate_latex_syntax("a}{").is_err());
        assert!(extension.validate_latex_syntax("\\{x\\}").is_ok());

        let result = extension.validate_latex_syntax("\\input{malicious}");
        assert!(result.unwrap_err().contains("\\input"));
        assert!(extension.validate_latex_syntax("\\left( x \\right)").is_ok());
        assert!(extension.validate_latex_syntax("\\begin{matrix} 1").is_err());
    }

    #[test]
    fn test_rejected_body_is_malformed_syntax() {
        let ext = LatexExtension::new();
        let source = "$\\def\\x{1}$";
        let m = ext.matches(&ScanContext::new(source, 0, false)).unwrap();
        let err = ext.tokenize(&m).unwrap_err();
        assert!(err.is_content_error());
        assert_eq!(err.offset(), 0);
    }

    #[test]
    fn test_render() {
        let ext = LatexExtension::new();
        let token = Token {
            kind: TokenKind::Math {
                body: "a<b".to_string(),
                display: true,
            },
            span: crate::token::Span::new(0, 7),
            extension: Some("latex-math".to_string()),
        };
        let mut out = HtmlWriter::new();
        ext.render(&token, &mut out);
        assert_eq!(
            out.finish(),
            "<div class=\"math math-display\">a&lt;b</div>"
        );
    }
}
