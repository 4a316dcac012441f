//! Lexer composition settings

use crate::defaults::{DEFAULT_MAX_DETAILS_DEPTH, DEFAULT_MENTION_TRIGGERS};
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which syntax extensions the default registry composes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// One mention extension is registered per trigger, in this order
    pub mention_triggers: Vec<char>,
    /// `$...$`, `$$...$$`, `\(...\)` and `\[...\]` math spans
    pub math: bool,
    /// `[1]` style citation markers
    pub citations: bool,
    /// `[^label]` references and `[^label]:` definitions
    pub footnotes: bool,
    /// Mention tokens for every configured trigger
    pub mentions: bool,
    /// Treat lone `~` as literal text so only `~~text~~` strikes through
    pub disable_single_tilde: bool,
    /// `<details>` blocks carrying tool calls and reasoning
    pub details: bool,
    /// A details block nesting deeper than this is left as text
    pub max_details_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            mention_triggers: DEFAULT_MENTION_TRIGGERS.to_vec(),
            math: true,
            citations: true,
            footnotes: true,
            mentions: true,
            disable_single_tilde: true,
            details: true,
            max_details_depth: DEFAULT_MAX_DETAILS_DEPTH,
        }
    }
}

impl ParserConfig {
    /// Reject a zero nesting depth and trigger characters that would collide
    /// with prose or each other
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_details_depth == 0 {
            return Err(ConfigError::invalid(
                "parser.max_details_depth",
                "must be at least 1",
            ));
        }
        let mut seen = HashSet::new();
        for trigger in &self.mention_triggers {
            if trigger.is_whitespace() || trigger.is_alphanumeric() {
                return Err(ConfigError::invalid(
                    "parser.mention_triggers",
                    format!("'{}' cannot be a trigger character", trigger),
                ));
            }
            if !seen.insert(*trigger) {
                return Err(ConfigError::invalid(
                    "parser.mention_triggers",
                    format!("'{}' is listed more than once", trigger),
                ));
            }
        }
        Ok(())
    }
}
