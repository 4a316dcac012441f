//! Render error types
//!
//! Interpretation and rendering are total; the only fallible step is building
//! a tool record out of a details block that does not describe one.

use thiserror::Error;

/// A details block could not be read as a tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The block is some other kind of details section
    #[error("Details block of type {found:?} is not a tool call")]
    NotToolCall {
        /// The `type` attribute found, if any
        found: Option<String>,
    },

    /// A field every tool call needs is missing or empty
    #[error("Tool call is missing its {0} attribute")]
    MissingField(&'static str),
}

impl RecordError {
    /// Missing fields mean there is nothing to render, not that content is broken
    pub fn is_empty_record(&self) -> bool {
        matches!(self, Self::MissingField(_))
    }
}

/// Result alias for record construction
pub type RecordResult<T> = Result<T, RecordError>;
