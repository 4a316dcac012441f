//! Basic Markdown extensions - the base prose grammar
//!
//! Core markdown structures expressed as ordinary extensions so they compose
//! with everything else:
//! - Block (line start only): fenced code, paragraph breaks, headings,
//!   horizontal rules, blockquote and list item markers
//! - Inline: code spans, backslash escapes, images, links, raw HTML tags
//!   (shown escaped), strikethrough, strong and emphasis
//!
//! Headings, blockquotes and list items are line-prefix markers; the rest of
//! the line is lexed as inline tokens.

use crate::error::ExtensionError;
use crate::extensions::{ExtensionKind, Match, ScanContext, Scope, SyntaxExtension, INLINE_LOOKAHEAD};
use crate::html::HtmlWriter;
use crate::token::{Token, TokenKind};
use regex::Regex;
use std::sync::LazyLock;

static FENCE_OPEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}(`{3,}|~{3,})([^\n]*)(?:\n|\z)").expect("code fence regex")
});

static BLANK_LINES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[ \t]*\n)+").expect("blank lines regex"));

static HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(#{1,6})([ \t]+|\n|\z)").expect("heading regex"));

static RULE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})(?:\n|\z)")
        .expect("horizontal rule regex")
});

static BLOCKQUOTE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}> ?").expect("blockquote regex"));

static LIST_ITEM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)(?:[-*+]|(\d{1,9})[.)])(?:[ \t]+|\z)").expect("list item regex")
});

// labels stop at the next `[`, so each bracket is scanned by one opener only
static IMAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^!\[([^\[\]\n]*)\]\(([^()\s]+)(?:[ \t]+"[^"\n]*")?\)"#).expect("image regex")
});

static LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[([^\[\]\n]+)\]\(([^()\s]+)(?:[ \t]+"[^"\n]*")?\)"#).expect("link regex")
});

static RAW_HTML_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^</?[A-Za-z][A-Za-z0-9-]*(?:[ \t][^<>\n]*)?/?>").expect("raw html regex")
});

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Declares a unit-struct extension with the shared boilerplate
macro_rules! base_extension {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $scope:expr, [$($trigger:expr),*]) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ty;

        impl $ty {
            const NAME: &'static str = $name;
            const SCOPE: Scope = $scope;

            fn trigger_chars() -> Vec<char> {
                vec![$($trigger),*]
            }
        }
    };
}

base_extension!(
    /// Fenced code blocks with ``` or ~~~
    FencedCodeExtension, "fenced-code", Scope::Block, ['`', '~', ' ']
);
base_extension!(
    /// A run of blank lines
    ParagraphBreakExtension, "paragraph-break", Scope::Block, ['\n', ' ', '\t']
);
base_extension!(
    /// ATX heading markers
    HeadingExtension, "heading", Scope::Block, ['#', ' ']
);
base_extension!(
    /// Thematic breaks
    HorizontalRuleExtension, "horizontal-rule", Scope::Block, ['-', '*', '_', ' ']
);
base_extension!(
    /// `>` markers
    BlockquoteExtension, "blockquote", Scope::Block, ['>', ' ']
);
base_extension!(
    /// Bullet and ordered list markers
    ListItemExtension, "list-item", Scope::Block,
    ['-', '*', '+', ' ', '\t', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9']
);
base_extension!(
    /// `` `code` ``
    CodeSpanExtension, "code-span", Scope::Inline, ['`']
);
base_extension!(
    /// Backslash escapes of ASCII punctuation
    EscapeExtension, "escape", Scope::Inline, ['\\']
);
base_extension!(
    /// `![alt](url)`
    ImageExtension, "image", Scope::Inline, ['!']
);
base_extension!(
    /// `[text](url)`
    LinkExtension, "link", Scope::Inline, ['[']
);
base_extension!(
    /// HTML tags in model output, rendered escaped
    RawHtmlExtension, "raw-html", Scope::Inline, ['<']
);
base_extension!(
    /// `~~text~~`, and `~text~` unless the single-tilde rule claims it first
    StrikethroughExtension, "strikethrough", Scope::Inline, ['~']
);
base_extension!(
    /// `**text**` and `__text__`
    StrongExtension, "strong", Scope::Inline, ['*', '_']
);
base_extension!(
    /// `*text*` and `_text_`
    EmphasisExtension, "emphasis", Scope::Inline, ['*', '_']
);

/// Implements the descriptor methods every base extension shares
macro_rules! descriptor {
    ($description:literal) => {
        fn name(&self) -> &str {
            Self::NAME
        }

        fn kind(&self) -> ExtensionKind {
            ExtensionKind::Base
        }

        fn scope(&self) -> Scope {
            Self::SCOPE
        }

        fn description(&self) -> &'static str {
            $description
        }

        fn triggers(&self) -> Vec<char> {
            Self::trigger_chars()
        }
    };
}

fn regex_match<'a>(regex: &Regex, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
    let found = regex.find(ctx.rest())?;
    ctx.take(found.end())
}

/// Match `delim` text `delim` on one line, not padded with whitespace
fn delimited_run<'a>(ctx: &ScanContext<'a>, delim: &str, intraword: bool) -> Option<Match<'a>> {
    let marker = delim.chars().next()?;
    let inner = ctx.rest().strip_prefix(delim)?;
    if !intraword && ctx.prev_char().is_some_and(char::is_alphanumeric) {
        return None;
    }
    let first = inner.chars().next()?;
    if first.is_whitespace() || first == marker {
        return None;
    }

    let scan = &inner[..ctx.window(INLINE_LOOKAHEAD).len() - delim.len()];
    let mut prev = first;
    for (i, c) in scan.char_indices().skip(1) {
        if c == '\n' {
            return None;
        }
        let closes = inner[i..].starts_with(delim)
            && !prev.is_whitespace()
            && prev != marker
            && prev != '\\';
        if closes {
            let after = inner[i + delim.len()..].chars().next();
            let extends = after == Some(marker);
            let glued = !intraword && after.is_some_and(char::is_alphanumeric);
            if !extends && !glued {
                let body = &inner[..i];
                return Some(ctx.take(delim.len() * 2 + i)?.with_capture(body));
            }
        }
        prev = c;
    }
    None
}

fn is_safe_url(url: &str, allow_data_images: bool) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    if lower.starts_with("data:") {
        return allow_data_images && lower.starts_with("data:image/");
    }
    !(lower.starts_with("javascript:") || lower.starts_with("vbscript:"))
}

fn body_of<'m>(m: &Match<'m>) -> &'m str {
    m.capture(0).unwrap_or_default()
}

impl SyntaxExtension for FencedCodeExtension {
    descriptor!("Fenced code blocks; an unclosed fence runs to the end of the input");

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        let rest = ctx.rest();
        let caps = FENCE_OPEN_REGEX.captures(rest)?;
        let fence = caps.get(1)?.as_str();
        let info = caps.get(2)?.as_str();
        let fence_char = fence.chars().next()?;
        if fence_char == '`' && info.contains('`') {
            return None;
        }

        let open_len = caps.get(0)?.end();
        let mut offset = open_len;
        for line in rest[open_len..].split_inclusive('\n') {
            let trimmed = line.trim_start_matches(' ');
            let run = trimmed.len() - trimmed.trim_start_matches(fence_char).len();
            let is_close = line.len() - trimmed.len() <= 3
                && run >= fence.len()
                && trimmed[run..].trim().is_empty();
            if is_close {
                return Some(
                    ctx.take(offset + line.len())?
                        .with_capture(&rest[open_len..offset])
                        .with_capture(info)
                        .with_capture("closed"),
                );
            }
            offset += line.len();
        }

        Some(
            ctx.take(rest.len())?
                .with_capture(&rest[open_len..])
                .with_capture(info)
                .with_capture("open"),
        )
    }

    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        let body = body_of(m);
        let closed = m.capture(2) == Some("closed");
        let body = if closed {
            body.strip_suffix('\n').unwrap_or(body)
        } else {
            body
        };
        let lang = m
            .capture(1)
            .and_then(|info| info.split_whitespace().next())
            .map(str::to_string);
        Ok(TokenKind::CodeBlock {
            lang,
            body: body.to_string(),
            closed,
        })
    }

    fn render(&self, token: &Token, out: &mut HtmlWriter) {
        if let TokenKind::CodeBlock { lang, body, closed } = &token.kind {
            let mut pre_attrs = vec![("class", "code-block".to_string())];
            if !closed {
                pre_attrs.push(("data-streaming", "true".to_string()));
            }
            out.open_block("pre", &pre_attrs);
            let code_attrs: Vec<(&str, String)> = lang
                .iter()
                .map(|lang| ("class", format!("language-{}", lang)))
                .collect();
            out.open_nested("code", &code_attrs);
            out.escaped(body);
            out.close("code");
            out.close("pre");
        }
    }
}

impl SyntaxExtension for ParagraphBreakExtension {
    descriptor!("Blank lines end the current paragraph");

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        regex_match(&BLANK_LINES_REGEX, ctx)
    }

    fn tokenize(&self, _m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        Ok(TokenKind::Paragraph)
    }

    fn render(&self, _token: &Token, out: &mut HtmlWriter) {
        out.end_block();
    }
}

impl SyntaxExtension for HeadingExtension {
    descriptor!("ATX headings # to ######");

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        let caps = HEADING_REGEX.captures(ctx.rest())?;
        let hashes = caps.get(1)?;
        let gap = caps.get(2)?;
        // the newline of an empty heading closes it like any other line end
        let len = if gap.as_str() == "\n" {
            gap.start()
        } else {
            gap.end()
        };
        Some(ctx.take(len)?.with_capture(hashes.as_str()))
    }

    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        Ok(TokenKind::Heading {
            level: body_of(m).len() as u8,
        })
    }

    fn render(&self, token: &Token, out: &mut HtmlWriter) {
        if let TokenKind::Heading { level } = token.kind {
            let index = usize::from(level.clamp(1, 6)) - 1;
            out.open_line_block(HEADING_TAGS[index], &[]);
        }
    }
}

impl SyntaxExtension for HorizontalRuleExtension {
    descriptor!("Thematic breaks --- *** ___");

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        regex_match(&RULE_REGEX, ctx)
    }

    fn tokenize(&self, _m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        Ok(TokenKind::HorizontalRule)
    }

    fn render(&self, _token: &Token, out: &mut HtmlWriter) {
        out.void_block("hr", &[]);
    }
}

impl SyntaxExtension for BlockquoteExtension {
    descriptor!("Blockquote markers >");

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        regex_match(&BLOCKQUOTE_REGEX, ctx)
    }

    fn tokenize(&self, _m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        Ok(TokenKind::Blockquote)
    }

    fn render(&self, _token: &Token, out: &mut HtmlWriter) {
        out.open_line_block("blockquote", &[]);
    }
}

impl SyntaxExtension for ListItemExtension {
    descriptor!("Bullet - * + and ordered 1. 1) list item markers");

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        let caps = LIST_ITEM_REGEX.captures(ctx.rest())?;
        let m = ctx
            .take(caps.get(0)?.end())?
            .with_capture(caps.get(1)?.as_str());
        Some(match caps.get(2) {
            Some(number) => m.with_capture(number.as_str()),
            None => m,
        })
    }

    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        let indent: usize = body_of(m)
            .chars()
            .map(|c| if c == '\t' { 4 } else { 1 })
            .sum();
        let number = m
            .capture(1)
            .map(|n| n.parse::<u64>())
            .transpose()
            .map_err(|e| ExtensionError::malformed(Self::NAME, m.offset(), e.to_string()))?;
        Ok(TokenKind::ListItem {
            ordered: number.is_some(),
            number,
            depth: indent / 2,
        })
    }

    fn render(&self, token: &Token, out: &mut HtmlWriter) {
        if let TokenKind::ListItem {
            ordered,
            number,
            depth,
        } = &token.kind
        {
            let mut attrs = vec![
                (
                    "class",
                    if *ordered { "ordered" } else { "bullet" }.to_string(),
                ),
                ("data-depth", depth.to_string()),
            ];
            if let Some(number) = number {
                attrs.push(("value", number.to_string()));
            }
            out.open_line_block("li", &attrs);
        }
    }
}

impl SyntaxExtension for CodeSpanExtension {
    descriptor!("Inline code spans delimited by equal backtick runs");

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        let rest = ctx.rest();
        let ticks = rest.len() - rest.trim_start_matches('`').len();
        if ticks == 0 {
            return None;
        }
        let after = &rest[ticks..];
        let window = ctx.window(INLINE_LOOKAHEAD).get(ticks..).unwrap_or_default();
        // a blank line ends the paragraph the span has to close in
        let limit = window.find("\n\n").unwrap_or(window.len());

        let mut search = 0;
        while let Some(found) = window[search..limit].find('`') {
            let start = search + found;
            let run = after[start..].len() - after[start..].trim_start_matches('`').len();
            if run == ticks {
                let body = &after[..start];
                return Some(ctx.take(ticks * 2 + start)?.with_capture(body));
            }
            search = start + run;
            if search >= limit {
                break;
            }
        }
        // an unmatched run is literal as a whole
        ctx.take(ticks)
    }

    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        let Some(body) = m.capture(0) else {
            return Ok(TokenKind::Text(m.text().to_string()));
        };
        let body = body.replace('\n', " ");
        let padded = body.len() > 2 && body.starts_with(' ') && body.ends_with(' ');
        let code = if padded && !body.trim().is_empty() {
            body[1..body.len() - 1].to_string()
        } else {
            body
        };
        Ok(TokenKind::CodeSpan(code))
    }

    fn render(&self, token: &Token, out: &mut HtmlWriter) {
        if let TokenKind::CodeSpan(code) = &token.kind {
            out.element("code", &[], code);
        }
    }
}

impl SyntaxExtension for EscapeExtension {
    descriptor!("Backslash escapes of ASCII punctuation");

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        let escaped = ctx.rest().strip_prefix('\\')?.chars().next()?;
        if escaped.is_ascii_punctuation() {
            ctx.take(2)
        } else {
            None
        }
    }

    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        m.text()
            .chars()
            .nth(1)
            .map(TokenKind::Escape)
            .ok_or_else(|| ExtensionError::malformed(Self::NAME, m.offset(), "nothing escaped"))
    }

    fn render(&self, token: &Token, out: &mut HtmlWriter) {
        if let TokenKind::Escape(ch) = token.kind {
            out.text(ch.encode_utf8(&mut [0; 4]));
        }
    }
}

impl SyntaxExtension for ImageExtension {
    descriptor!("Images ![alt](url)");

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        let caps = IMAGE_REGEX.captures(ctx.rest())?;
        Some(
            ctx.take(caps.get(0)?.end())?
                .with_capture(caps.get(1)?.as_str())
                .with_capture(caps.get(2)?.as_str()),
        )
    }

    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        let url = m.capture(1).unwrap_or_default();
        if !is_safe_url(url, true) {
            return Err(ExtensionError::malformed(
                Self::NAME,
                m.offset(),
                format!("unsafe image url: {}", url),
            ));
        }
        Ok(TokenKind::Image {
            alt: body_of(m).to_string(),
            url: url.to_string(),
        })
    }

    fn render(&self, token: &Token, out: &mut HtmlWriter) {
        if let TokenKind::Image { alt, url } = &token.kind {
            out.void("img", &[("src", url.clone()), ("alt", alt.clone())]);
        }
    }
}

impl SyntaxExtension for LinkExtension {
    descriptor!("Inline links [text](url)");

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        let caps = LINK_REGEX.captures(ctx.rest())?;
        Some(
            ctx.take(caps.get(0)?.end())?
                .with_capture(caps.get(1)?.as_str())
                .with_capture(caps.get(2)?.as_str()),
        )
    }

    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        let url = m.capture(1).unwrap_or_default();
        if !is_safe_url(url, false) {
            return Err(ExtensionError::malformed(
                Self::NAME,
                m.offset(),
                format!("unsafe link url: {}", url),
            ));
        }
        Ok(TokenKind::Link {
            text: body_of(m).to_string(),
            url: url.to_string(),
        })
    }

    fn render(&self, token: &Token, out: &mut HtmlWriter) {
        if let TokenKind::Link { text, url } = &token.kind {
            out.element(
                "a",
                &[
                    ("href", url.clone()),
                    ("rel", "noopener noreferrer".to_string()),
                ],
                text,
            );
        }
    }
}

impl SyntaxExtension for RawHtmlExtension {
    descriptor!("Single-line HTML tags, kept as escaped text");

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        regex_match(&RAW_HTML_REGEX, ctx)
    }

    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        Ok(TokenKind::RawHtmlEscape(m.text().to_string()))
    }

    fn render(&self, token: &Token, out: &mut HtmlWriter) {
        if let TokenKind::RawHtmlEscape(html) = &token.kind {
            out.text(html);
        }
    }
}

impl SyntaxExtension for StrikethroughExtension {
    descriptor!("Strikethrough ~~text~~ (and ~text~ without the single-tilde rule)");

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        delimited_run(ctx, "~~", true).or_else(|| delimited_run(ctx, "~", true))
    }

    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        Ok(TokenKind::Strikethrough(body_of(m).to_string()))
    }

    fn render(&self, token: &Token, out: &mut HtmlWriter) {
        if let TokenKind::Strikethrough(text) = &token.kind {
            out.element("del", &[], text);
        }
    }
}

impl SyntaxExtension for StrongExtension {
    descriptor!("Strong emphasis **text** and __text__");

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        delimited_run(ctx, "**", true).or_else(|| delimited_run(ctx, "__", false))
    }

    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        Ok(TokenKind::Strong(body_of(m).to_string()))
    }

    fn render(&self, token: &Token, out: &mut HtmlWriter) {
        if let TokenKind::Strong(text) = &token.kind {
            out.element("strong", &[], text);
        }
    }
}

impl SyntaxExtension for EmphasisExtension {
    descriptor!("Emphasis *text* and _text_ (no intraword underscores)");

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        delimited_run(ctx, "*", true).or_else(|| delimited_run(ctx, "_", false))
    }

    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        Ok(TokenKind::Emphasis(body_of(m).to_string()))
    }

    fn render(&self, token: &Token, out: &mut HtmlWriter) {
        if let TokenKind::Emphasis(text) = &token.kind {
            out.element("em", &[], text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn run(ext: &dyn SyntaxExtension, source: &str, line_start: bool) -> Option<(usize, TokenKind)> {
        let m = ext.matches(&ScanContext::new(source, 0, line_start))?;
        Some((m.len(), ext.tokenize(&m).ok()?))
    }

    #[test]
    fn test_fenced_code_closed() {
        let source = "```rust title\nfn main() {}\n```\nafter";
        let (len, kind) = run(&FencedCodeExtension, source, true).unwrap();
        assert_eq!(&source[..len], "```rust title\nfn main() {}\n```\n");
        assert_eq!(
            kind,
            TokenKind::CodeBlock {
                lang: Some("rust".to_string()),
                body: "fn main() {}".to_string(),
                closed: true,
            }
        );
    }

    #[test]
    fn test_fenced_code_unclosed_runs_to_end() {
        let source = "~~~\nstill streaming\n";
        let (len, kind) = run(&FencedCodeExtension, source, true).unwrap();
        assert_eq!(len, source.len());
        assert_eq!(
            kind,
            TokenKind::CodeBlock {
                lang: None,
                body: "still streaming\n".to_string(),
                closed: false,
            }
        );
    }

    #[test]
    fn test_fence_needs_matching_length() {
        let source = "````\n```\n````";
        let (len, kind) = run(&FencedCodeExtension, source, true).unwrap();
        assert_eq!(len, source.len());
        assert!(matches!(kind, TokenKind::CodeBlock { ref body, closed: true, .. } if body == "```"));
    }

    #[test_case("# Title", 2, 1 ; "h1")]
    #[test_case("###### Six", 7, 6 ; "h6")]
    #[test_case("  ## Indented", 5, 2 ; "indented")]
    #[test_case("#\nnext", 1, 1 ; "empty heading leaves newline")]
    fn test_heading(source: &str, len: usize, level: u8) {
        assert_eq!(
            run(&HeadingExtension, source, true),
            Some((len, TokenKind::Heading { level }))
        );
    }

    #[test_case("#hashtag" ; "no space")]
    #[test_case("####### seven" ; "too deep")]
    #[test_case("    # code" ; "four spaces")]
    fn test_not_heading(source: &str) {
        assert!(run(&HeadingExtension, source, true).is_none());
    }

    #[test_case("- item", false, None, 0 ; "dash")]
    #[test_case("    * nested", false, None, 2 ; "nested star")]
    #[test_case("3. third", true, Some(3), 0 ; "ordered dot")]
    #[test_case("\t7) tabbed", true, Some(7), 2 ; "ordered paren tab")]
    fn test_list_item(source: &str, ordered: bool, number: Option<u64>, depth: usize) {
        let (_, kind) = run(&ListItemExtension, source, true).unwrap();
        assert_eq!(
            kind,
            TokenKind::ListItem {
                ordered,
                number,
                depth,
            }
        );
    }

    #[test]
    fn test_list_item_needs_space() {
        assert!(run(&ListItemExtension, "**bold**", true).is_none());
        assert!(run(&ListItemExtension, "-1 degrees", true).is_none());
    }

    #[test_case("---\n" ; "dashes")]
    #[test_case("* * *" ; "spaced stars")]
    #[test_case("___" ; "underscores")]
    fn test_horizontal_rule(source: &str) {
        let (len, kind) = run(&HorizontalRuleExtension, source, true).unwrap();
        assert_eq!(len, source.len());
        assert_eq!(kind, TokenKind::HorizontalRule);
    }

    #[test]
    fn test_blank_lines() {
        let (len, kind) = run(&ParagraphBreakExtension, "\n  \n\ntext", true).unwrap();
        assert_eq!(len, 5);
        assert_eq!(kind, TokenKind::Paragraph);
        assert!(run(&ParagraphBreakExtension, "text\n", true).is_none());
    }

    #[test_case("`code`", "code" ; "simple")]
    #[test_case("`` a ` b ``", "a ` b" ; "double ticks with inner tick")]
    #[test_case("` x `", "x" ; "padding stripped")]
    fn test_code_span(source: &str, code: &str) {
        let (len, kind) = run(&CodeSpanExtension, source, false).unwrap();
        assert_eq!(len, source.len());
        assert_eq!(kind, TokenKind::CodeSpan(code.to_string()));
    }

    #[test]
    fn test_unclosed_code_span() {
        let literal = |ticks: &str| Some((ticks.len(), TokenKind::Text(ticks.to_string())));
        assert_eq!(run(&CodeSpanExtension, "`open", false), literal("`"));
        assert_eq!(run(&CodeSpanExtension, "``a`", false), literal("``"));
        assert_eq!(run(&CodeSpanExtension, "`a\n\nb`", false), literal("`"));
    }

    #[test]
    fn test_code_span_closes_within_lookahead() {
        let far = format!("`{}`", "x".repeat(INLINE_LOOKAHEAD));
        assert_eq!(
            run(&CodeSpanExtension, &far, false),
            Some((1, TokenKind::Text("`".to_string())))
        );
        let near = format!("`{}`", "x".repeat(INLINE_LOOKAHEAD - 8));
        assert_eq!(run(&CodeSpanExtension, &near, false).map(|(len, _)| len), Some(near.len()));
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            run(&EscapeExtension, "\\*", false),
            Some((2, TokenKind::Escape('*')))
        );
        assert!(run(&EscapeExtension, "\\a", false).is_none());
    }

    #[test]
    fn test_link_and_image() {
        assert_eq!(
            run(&LinkExtension, "[docs](https://example.com \"Docs\") x", false),
            Some((
                34,
                TokenKind::Link {
                    text: "docs".to_string(),
                    url: "https://example.com".to_string(),
                }
            ))
        );
        assert_eq!(
            run(&ImageExtension, "![a cat](cat.png)", false),
            Some((
                17,
                TokenKind::Image {
                    alt: "a cat".to_string(),
                    url: "cat.png".to_string(),
                }
            ))
        );
    }

    #[test]
    fn test_link_text_stops_at_open_bracket() {
        assert!(LinkExtension.matches(&ScanContext::new("[a [b](c)", 0, false)).is_none());
        let (len, kind) = run(&LinkExtension, "[b](c)", false).unwrap();
        assert_eq!(len, 6);
        assert_eq!(
            kind,
            TokenKind::Link {
                text: "b".to_string(),
                url: "c".to_string(),
            }
        );
    }

    #[test]
    fn test_strong_body_is_literal() {
        assert_eq!(
            run(&StrongExtension, "**$x$ and @bob**", false),
            Some((16, TokenKind::Strong("$x$ and @bob".to_string())))
        );
    }

    #[test]
    fn test_unsafe_link_is_rejected_by_tokenizer() {
        let ctx = ScanContext::new("[x](javascript:alert(1))", 0, false);
        assert!(LinkExtension.matches(&ctx).is_none());
        let ctx = ScanContext::new("[x](javascript:void)", 0, false);
        let m = LinkExtension.matches(&ctx).unwrap();
        assert!(LinkExtension.tokenize(&m).is_err());
    }

    #[test_case("<b>", true ; "open tag")]
    #[test_case("</div>", true ; "close tag")]
    #[test_case("<img src=\"x\"/>", true ; "self closing")]
    #[test_case("<!-- comment -->", false ; "comment")]
    #[test_case("< b>", false ; "space after angle")]
    #[test_case("a <b", false ; "not at position")]
    fn test_raw_html(source: &str, matches: bool) {
        assert_eq!(run(&RawHtmlExtension, source, false).is_some(), matches);
    }

    #[test_case(&StrongExtension as &dyn SyntaxExtension, "**bold** x", "bold" ; "strong stars")]
    #[test_case(&StrongExtension as &dyn SyntaxExtension, "__bold__", "bold" ; "strong underscores")]
    #[test_case(&EmphasisExtension as &dyn SyntaxExtension, "*it*", "it" ; "emphasis star")]
    #[test_case(&EmphasisExtension as &dyn SyntaxExtension, "_it_.", "it" ; "emphasis underscore")]
    #[test_case(&StrikethroughExtension as &dyn SyntaxExtension, "~~gone~~", "gone" ; "double tilde")]
    #[test_case(&StrikethroughExtension as &dyn SyntaxExtension, "~gone~", "gone" ; "single tilde")]
    fn test_delimited(ext: &dyn SyntaxExtension, source: &str, body: &str) {
        let (_, kind) = run(ext, source, false).unwrap();
        let text = match kind {
            TokenKind::Strong(t) | TokenKind::Emphasis(t) | TokenKind::Strikethrough(t) => t,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(text, body);
    }

    #[test_case(&EmphasisExtension as &dyn SyntaxExtension, "* not emphasis*" ; "leading space")]
    #[test_case(&EmphasisExtension as &dyn SyntaxExtension, "_snake_case" ; "intraword underscore")]
    #[test_case(&EmphasisExtension as &dyn SyntaxExtension, "*a\nb*" ; "line break")]
    #[test_case(&EmphasisExtension as &dyn SyntaxExtension, "**x**" ; "strong is not emphasis")]
    #[test_case(&StrongExtension as &dyn SyntaxExtension, "**open" ; "unclosed")]
    fn test_not_delimited(ext: &dyn SyntaxExtension, source: &str) {
        assert!(run(ext, source, false).is_none());
    }
}
