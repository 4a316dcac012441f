//! Inline directive scanner
//!
//! Tools embed out-of-band payloads in their output as HTML comments,
//! `<!-- NAME:<base64> -->`, which arrive entity-escaped once they pass
//! through a chat transcript. No lexer extension matches them; consumers
//! scan the raw content with [`scan_directives`] instead.

use crate::error::DirectiveError;
use crate::token::Span;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static DIRECTIVE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(<!--|&lt;!--)\s*([A-Z][A-Z0-9_]*):([A-Za-z0-9+/=]+)\s*(?:-->|--&gt;)")
        .expect("directive regex")
});

/// Directive name used by the content planner's calendar import
pub const CALENDAR_IMPORT: &str = "CALENDAR_IMPORT";

/// A directive found in content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Directive name, e.g. `CALENDAR_IMPORT`
    pub name: String,
    /// Base64 payload as written
    pub payload: String,
    /// Where the directive sits in the scanned text
    pub span: Span,
    /// Whether the directive was entity-escaped
    pub escaped: bool,
}

impl Directive {
    /// Decode the base64 payload
    pub fn decode_bytes(&self) -> Result<Vec<u8>, DirectiveError> {
        STANDARD
            .decode(self.payload.as_bytes())
            .map_err(|source| DirectiveError::Base64 {
                name: self.name.clone(),
                source,
            })
    }

    /// Decode the payload as JSON of type `T`
    pub fn decode_json<T: DeserializeOwned>(&self) -> Result<T, DirectiveError> {
        let bytes = self.decode_bytes()?;
        serde_json::from_slice(&bytes).map_err(|source| DirectiveError::Json {
            name: self.name.clone(),
            source,
        })
    }
}

/// Find every directive in `text`, in order
pub fn scan_directives(text: &str) -> Vec<Directive> {
    DIRECTIVE_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Directive {
                name: caps.get(2)?.as_str().to_string(),
                payload: caps.get(3)?.as_str().to_string(),
                span: Span::new(whole.start(), whole.end()),
                escaped: caps.get(1)?.as_str().starts_with('&'),
            })
        })
        .collect()
}

/// One planned article of a calendar import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Planned publication date as written by the tool
    pub publish_date: String,
    /// Working title
    pub title: String,
    /// Any further fields the tool attached
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Payload of a `CALENDAR_IMPORT` directive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarImport {
    /// Articles to import
    pub articles: Vec<Article>,
}

impl CalendarImport {
    /// Decode a calendar import from its directive
    pub fn from_directive(directive: &Directive) -> Result<Self, DirectiveError> {
        if directive.name != CALENDAR_IMPORT {
            return Err(DirectiveError::UnexpectedName {
                expected: CALENDAR_IMPORT.to_string(),
                found: directive.name.clone(),
            });
        }
        directive.decode_json()
    }

    /// First calendar import in `text`, if any decodes
    pub fn find_in(text: &str) -> Option<Self> {
        scan_directives(text)
            .iter()
            .filter(|d| d.name == CALENDAR_IMPORT)
            .find_map(|d| match Self::from_directive(d) {
                Ok(import) => Some(import),
                Err(err) => {
                    tracing::debug!(error = %err, "skipping undecodable calendar import");
                    None
                }
            })
    }
}
