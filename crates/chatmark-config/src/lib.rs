//! # chatmark configuration
//!
//! Configuration for every tunable knob of the chatmark pipeline:
//!
//! - `[parser]` - which syntax extensions are composed and the mention trigger characters
//! - `[interpreter]` - unwrap depth cap and the rich-content heuristic
//! - `[sections]` - default-open preference and the forced-collapse section types
//!
//! All fields have documented, stable defaults; an empty TOML document yields
//! [`ChatmarkConfig::default()`].
//!
//! ```rust
//! use chatmark_config::ChatmarkConfig;
//!
//! let config = ChatmarkConfig::from_toml_str(r#"
//!     [parser]
//!     mention_triggers = ["@"]
//! "#).unwrap();
//! assert_eq!(config.parser.mention_triggers, vec!['@']);
//! assert_eq!(config.interpreter.max_unwrap_depth, 8);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod components;
pub mod defaults;
mod error;

pub use components::{InterpreterConfig, ParserConfig, SectionConfig};
pub use error::{ConfigError, ConfigResult};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatmarkConfig {
    /// Lexer composition settings
    #[serde(default)]
    pub parser: ParserConfig,
    /// Tool-result interpretation settings
    #[serde(default)]
    pub interpreter: InterpreterConfig,
    /// Collapsible section settings
    #[serde(default)]
    pub sections: SectionConfig,
}

impl ChatmarkConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading chatmark config");
        Self::from_toml_str(&source)
    }

    /// Load a TOML file if it exists, falling back to defaults otherwise
    pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate every section
    pub fn validate(&self) -> ConfigResult<()> {
        self.parser.validate()?;
        self.interpreter.validate()?;
        self.sections.validate()?;
        Ok(())
    }
}
