//! `<details>` block extension
//!
//! Chat content carries collapsible sections (tool calls, reasoning, code
//! interpreter runs) as HTML details blocks whose attribute values are
//! entity-escaped. A block matches only once its closing tag is present;
//! nested details blocks are skipped over when looking for it. A block whose
//! nesting goes deeper than the configured maximum does not match, so its
//! tags stay text and only the inner levels become sections.

use crate::error::ExtensionError;
use crate::extensions::{ExtensionKind, Match, ScanContext, Scope, SyntaxExtension};
use crate::html::HtmlWriter;
use crate::token::{Token, TokenKind};
use chatmark_config::defaults::DEFAULT_MAX_DETAILS_DEPTH;
use html_escape::decode_html_entities;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

const OPEN_TAG: &str = "<details";
const CLOSE_TAG: &str = "</details>";

static ATTRIBUTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][\w\-:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .expect("details attribute regex")
});

static SUMMARY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*<summary(?:\s[^>]*)?>(.*?)</summary>").expect("details summary regex")
});

/// Whether `text` starts with an opening `<details` tag
fn is_open_tag(text: &str) -> bool {
    text.strip_prefix(OPEN_TAG)
        .and_then(|after| after.chars().next())
        .is_some_and(|c| c == '>' || c.is_whitespace())
}

/// Byte length of the opening tag, honoring quoted attribute values
fn open_tag_len(text: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            (None, '>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Parse and entity-decode the attributes of an opening tag
pub fn parse_attributes(tag: &str) -> BTreeMap<String, String> {
    let inner = tag
        .strip_prefix(OPEN_TAG)
        .unwrap_or(tag)
        .trim_end_matches('>');
    ATTRIBUTE_REGEX
        .captures_iter(inner)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let raw = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |v| v.as_str());
            Some((name, decode_html_entities(raw).into_owned()))
        })
        .collect()
}

/// `<details>` block syntax extension
pub struct DetailsExtension {
    max_depth: usize,
}

impl DetailsExtension {
    /// Create a new details extension
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DETAILS_DEPTH)
    }

    /// Match blocks nesting at most `max_depth` levels, counting the block itself
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for DetailsExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxExtension for DetailsExtension {
    fn name(&self) -> &str {
        "details"
    }

    fn kind(&self) -> ExtensionKind {
        ExtensionKind::Details
    }

    fn scope(&self) -> Scope {
        Scope::Block
    }

    fn description(&self) -> &'static str {
        "Supports HTML <details> blocks carrying tool calls and other collapsible sections"
    }

    fn triggers(&self) -> Vec<char> {
        vec!['<']
    }

    fn matches<'a>(&self, ctx: &ScanContext<'a>) -> Option<Match<'a>> {
        let rest = ctx.rest();
        if !is_open_tag(rest) {
            return None;
        }
        let tag_len = open_tag_len(rest)?;

        let mut depth = 1usize;
        let mut pos = tag_len;
        while depth > 0 {
            let next = rest[pos..].find('<')? + pos;
            let tail = &rest[next..];
            if tail.starts_with(CLOSE_TAG) {
                depth -= 1;
                pos = next + CLOSE_TAG.len();
            } else if is_open_tag(tail) {
                depth += 1;
                if depth > self.max_depth {
                    return None;
                }
                pos = next + open_tag_len(tail)?;
            } else {
                pos = next + 1;
            }
        }

        let inner = &rest[tag_len..pos - CLOSE_TAG.len()];
        let end = if rest[pos..].starts_with('\n') {
            pos + 1
        } else {
            pos
        };
        Some(
            ctx.take(end)?
                .with_capture(&rest[..tag_len])
                .with_capture(inner),
        )
    }

    fn tokenize(&self, m: &Match<'_>) -> Result<TokenKind, ExtensionError> {
        let attributes = parse_attributes(m.capture(0).unwrap_or_default());
        let inner = m.capture(1).unwrap_or_default();
        let (summary, body) = match SUMMARY_REGEX.captures(inner) {
            Some(caps) => {
                let whole = caps.get(0).map_or(0, |w| w.end());
                let summary = caps.get(1).map(|s| s.as_str().trim().to_string());
                (summary, &inner[whole..])
            }
            None => (None, inner),
        };
        Ok(TokenKind::Details {
            attributes,
            summary,
            body: body.trim_matches('\n').to_string(),
        })
    }

    fn render(&self, token: &Token, out: &mut HtmlWriter) {
        if let TokenKind::Details {
            attributes,
            summary,
            body,
        } = &token.kind
        {
            let kind = attributes.get("type").cloned().unwrap_or_default();
            out.open_block("details", &[("data-type", kind)]);
            out.open_nested("summary", &[]);
            out.escaped(summary.as_deref().unwrap_or("Details"));
            out.close("summary");
            out.open_nested("div", &[("class", "details-body".to_string())]);
            out.escaped(body);
            out.close("div");
            out.close("details");
        }
    }
}

/// Factory function to create the details extension
pub fn create_details_extension(max_depth: usize) -> Arc<dyn SyntaxExtension> {
    Arc::new(DetailsExtension::with_max_depth(max_depth))
}
