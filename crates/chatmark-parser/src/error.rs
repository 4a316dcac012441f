//! Parser error types
//!
//! Nothing here escapes `Lexer::lex`: extension errors are recovered by
//! falling back to literal text and are only reported as diagnostics.

use thiserror::Error;

/// An extension matched a span it could not turn into a token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionError {
    /// The matcher claimed a span the tokenizer rejected
    #[error("Malformed {extension} syntax at byte {offset}: {reason}")]
    MalformedSyntax {
        /// Extension that produced the match
        extension: String,
        /// Byte offset of the match
        offset: usize,
        /// Why the span was rejected
        reason: String,
    },

    /// The matcher reported a span it does not own
    #[error("Extension {extension} reported an invalid match length {len} at byte {offset}")]
    InvalidMatch {
        /// Offending extension
        extension: String,
        /// Byte offset of the match
        offset: usize,
        /// Reported length
        len: usize,
    },
}

impl ExtensionError {
    /// Create a malformed syntax error
    pub fn malformed(extension: impl Into<String>, offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedSyntax {
            extension: extension.into(),
            offset,
            reason: reason.into(),
        }
    }

    /// Byte offset the error refers to
    pub fn offset(&self) -> usize {
        match self {
            Self::MalformedSyntax { offset, .. } | Self::InvalidMatch { offset, .. } => *offset,
        }
    }

    /// Malformed input is a content problem; an invalid match is an extension bug
    pub fn is_content_error(&self) -> bool {
        matches!(self, Self::MalformedSyntax { .. })
    }
}

/// Errors raised while composing a registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two extensions share a name
    #[error("Duplicate extension name: {0}")]
    DuplicateName(String),

    /// Building the default registry from configuration failed
    #[error("Invalid parser configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while decoding an inline directive payload
#[derive(Debug, Error)]
pub enum DirectiveError {
    /// The payload is not valid base64
    #[error("Invalid base64 payload in {name} directive: {source}")]
    Base64 {
        /// Directive name
        name: String,
        /// Decoder error
        #[source]
        source: base64::DecodeError,
    },

    /// The decoded payload is not valid JSON of the expected shape
    #[error("Invalid JSON payload in {name} directive: {source}")]
    Json {
        /// Directive name
        name: String,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },

    /// The directive has a different name than expected
    #[error("Expected {expected} directive, found {found}")]
    UnexpectedName {
        /// Name the caller asked for
        expected: String,
        /// Name actually present
        found: String,
    },
}

/// Result alias for registry construction
pub type RegistryResult<T> = Result<T, RegistryError>;
