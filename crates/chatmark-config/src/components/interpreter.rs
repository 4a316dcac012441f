//! Tool-result interpretation settings

use crate::defaults::{DEFAULT_MAX_UNWRAP_DEPTH, DEFAULT_RICH_MARKERS, DEFAULT_RICH_MIN_LENGTH};
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Unwrap cap and rich-content heuristic
///
/// The heuristic is approximate by nature: the markers and the length
/// threshold are tuned defaults, not a classifier with guaranteed accuracy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Maximum JSON decode steps before the current value is taken as final
    pub max_unwrap_depth: usize,
    /// A multi-line result at least this many chars long is rich content
    pub rich_min_length: usize,
    /// Substrings that flag a result as rich content on their own
    pub rich_markers: Vec<String>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_unwrap_depth: DEFAULT_MAX_UNWRAP_DEPTH,
            rich_min_length: DEFAULT_RICH_MIN_LENGTH,
            rich_markers: DEFAULT_RICH_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl InterpreterConfig {
    /// Validate ranges
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_unwrap_depth == 0 {
            return Err(ConfigError::invalid(
                "interpreter.max_unwrap_depth",
                "must allow at least one decode step",
            ));
        }
        if self.rich_min_length == 0 {
            return Err(ConfigError::invalid(
                "interpreter.rich_min_length",
                "must be at least 1",
            ));
        }
        if self.rich_markers.iter().any(|m| m.is_empty()) {
            return Err(ConfigError::invalid(
                "interpreter.rich_markers",
                "empty marker would match every result",
            ));
        }
        Ok(())
    }
}
