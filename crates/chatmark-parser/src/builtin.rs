//! Default extension set and ordering

use crate::basic_markdown::{
    BlockquoteExtension, CodeSpanExtension, EmphasisExtension, EscapeExtension,
    FencedCodeExtension, HeadingExtension, HorizontalRuleExtension, ImageExtension,
    LinkExtension, ListItemExtension, ParagraphBreakExtension, RawHtmlExtension,
    StrikethroughExtension, StrongExtension,
};
use crate::citations::create_citation_extension;
use crate::details::create_details_extension;
use crate::error::{RegistryError, RegistryResult};
use crate::extensions::{ExtensionRegistry, SyntaxExtension};
use crate::footnotes::{create_footnote_definition_extension, create_footnote_reference_extension};
use crate::latex::create_latex_extension;
use crate::lexer::Lexer;
use crate::mentions::create_mention_extension;
use crate::tilde::create_disable_single_tilde_extension;
use chatmark_config::ParserConfig;
use std::sync::Arc;

/// Extensions enabled by `config`, in the order the lexer tries them
///
/// Block: details, fenced code, paragraph break, heading, horizontal rule,
/// footnote definition, blockquote, list item.
///
/// Inline: code span, math, escape, footnote reference, citation, image,
/// link, mentions (one per trigger), raw HTML, disable-single-tilde,
/// strikethrough, strong, emphasis.
pub fn default_extensions(config: &ParserConfig) -> Vec<Arc<dyn SyntaxExtension>> {
    let mut extensions: Vec<Arc<dyn SyntaxExtension>> = Vec::new();

    if config.details {
        extensions.push(create_details_extension(config.max_details_depth));
    }
    extensions.push(Arc::new(FencedCodeExtension));
    extensions.push(Arc::new(ParagraphBreakExtension));
    extensions.push(Arc::new(HeadingExtension));
    extensions.push(Arc::new(HorizontalRuleExtension));
    if config.footnotes {
        extensions.push(create_footnote_definition_extension());
    }
    extensions.push(Arc::new(BlockquoteExtension));
    extensions.push(Arc::new(ListItemExtension));

    extensions.push(Arc::new(CodeSpanExtension));
    if config.math {
        extensions.push(create_latex_extension());
    }
    extensions.push(Arc::new(EscapeExtension));
    if config.footnotes {
        extensions.push(create_footnote_reference_extension());
    }
    if config.citations {
        extensions.push(create_citation_extension());
    }
    extensions.push(Arc::new(ImageExtension));
    extensions.push(Arc::new(LinkExtension));
    if config.mentions {
        extensions.extend(config.mention_triggers.iter().map(|&t| create_mention_extension(t)));
    }
    extensions.push(Arc::new(RawHtmlExtension));
    if config.disable_single_tilde {
        extensions.push(create_disable_single_tilde_extension());
    }
    extensions.push(Arc::new(StrikethroughExtension));
    extensions.push(Arc::new(StrongExtension));
    extensions.push(Arc::new(EmphasisExtension));

    extensions
}

/// Validate `config` and build the default registry from it
pub fn default_registry(config: &ParserConfig) -> RegistryResult<ExtensionRegistry> {
    config
        .validate()
        .map_err(|e| RegistryError::InvalidConfig(e.to_string()))?;
    ExtensionRegistry::builder()
        .with_extensions(default_extensions(config))
        .build()
}

/// Compose a lexer from `config`
pub fn lexer_from_config(config: &ParserConfig) -> RegistryResult<Lexer> {
    Ok(default_registry(config)?.compose())
}

/// Lexer with every default extension enabled
pub fn default_lexer() -> Lexer {
    match lexer_from_config(&ParserConfig::default()) {
        Ok(lexer) => lexer,
        Err(err) => {
            tracing::warn!(error = %err, "default parser configuration rejected, using an empty registry");
            ExtensionRegistry::default().compose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::{ExtensionKind, Scope};

    #[test]
    fn test_default_order() {
        let registry = default_registry(&ParserConfig::default()).unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "details",
                "fenced-code",
                "paragraph-break",
                "heading",
                "horizontal-rule",
                "footnote-definition",
                "blockquote",
                "list-item",
                "code-span",
                "latex-math",
                "escape",
                "footnote-reference",
                "citations",
                "image",
                "link",
                "mention-@",
                "mention-#",
                "raw-html",
                "disable-single-tilde",
                "strikethrough",
                "strong",
                "emphasis",
            ]
        );
    }

    #[test]
    fn test_stats() {
        let stats = default_registry(&ParserConfig::default()).unwrap().stats();
        assert_eq!(stats.total, 22);
        assert_eq!(stats.block, 8);
        assert_eq!(stats.inline, 14);
        assert_eq!(stats.by_kind[&ExtensionKind::Mention], 2);
        assert_eq!(stats.by_kind[&ExtensionKind::Base], 14);
    }

    #[test]
    fn test_disabled_families_are_left_out() {
        let config = ParserConfig {
            math: false,
            mentions: false,
            details: false,
            ..ParserConfig::default()
        };
        let registry = default_registry(&config).unwrap();
        assert!(registry.get("latex-math").is_none());
        assert!(registry.get("details").is_none());
        assert!(registry.iter().all(|ext| ext.kind() != ExtensionKind::Mention));
        assert!(registry
            .iter()
            .filter(|ext| ext.scope() == Scope::Block)
            .all(|ext| ext.name() != "details"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ParserConfig {
            mention_triggers: vec!['@', '@'],
            ..ParserConfig::default()
        };
        assert!(matches!(
            default_registry(&config),
            Err(RegistryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_single_tilde_rule_toggle() {
        let with_rule = default_lexer();
        let tokens = with_rule.lex("~x~");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].kind.is_text());

        let config = ParserConfig {
            disable_single_tilde: false,
            ..ParserConfig::default()
        };
        let without_rule = lexer_from_config(&config).unwrap();
        let tokens = without_rule.lex("~x~");
        assert_eq!(
            tokens[0].kind,
            crate::token::TokenKind::Strikethrough("x".to_string())
        );
    }
}
