//! Chatmark Parser
//!
//! A composable lexer for conversational AI output. This crate provides:
//! - A uniform `SyntaxExtension` trait; the base prose grammar is itself a set of extensions
//! - Math, citation, footnote, mention, details and disable-single-tilde extensions
//! - A registry that composes an ordered extension list into a `Lexer` once
//! - A flat, lossless token stream: token spans always reconstruct the input
//! - Recovery instead of failure: malformed syntax falls back to literal text
//! - A scanner for base64 directives embedded in HTML comments

pub mod basic_markdown;
pub mod builtin;
pub mod citations;
pub mod details;
pub mod directives;
pub mod error;
pub mod extensions;
pub mod footnotes;
pub mod html;
pub mod latex;
pub mod lexer;
pub mod mentions;
pub mod tilde;
pub mod token;

// Re-export main types for convenience
pub use directives::{scan_directives, Article, CalendarImport, Directive, CALENDAR_IMPORT};
pub use error::{DirectiveError, ExtensionError, RegistryError, RegistryResult};
pub use extensions::{
    compose, ExtensionKind, ExtensionRegistry, ExtensionRegistryBuilder, ExtensionRegistryStats,
    Match, ScanContext, Scope, SyntaxExtension, INLINE_LOOKAHEAD,
};
pub use html::HtmlWriter;
pub use lexer::{LexOutput, Lexer};
pub use token::{reconstruct, FootnoteKind, Span, Token, TokenKind};

// Convenience factory functions
pub use builtin::{default_extensions, default_lexer, default_registry, lexer_from_config};
pub use citations::create_citation_extension;
pub use details::create_details_extension;
pub use footnotes::{create_footnote_definition_extension, create_footnote_reference_extension};
pub use latex::create_latex_extension;
pub use mentions::create_mention_extension;
pub use tilde::create_disable_single_tilde_extension;
