//! Collapsible section settings

use crate::defaults::DEFAULT_FORCED_COLLAPSE_TYPES;
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Default visibility of collapsible sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionConfig {
    /// User preference: open details sections when they first mount
    pub details_open_by_default: bool,
    /// Section types that always mount closed, whatever the preference says
    pub forced_collapse_types: Vec<String>,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            details_open_by_default: false,
            forced_collapse_types: DEFAULT_FORCED_COLLAPSE_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

impl SectionConfig {
    /// Whether sections of this type ignore the default-open preference
    pub fn is_forced_collapse(&self, section_type: &str) -> bool {
        self.forced_collapse_types.iter().any(|t| t == section_type)
    }

    /// Validate entries
    pub fn validate(&self) -> ConfigResult<()> {
        if self.forced_collapse_types.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::invalid(
                "sections.forced_collapse_types",
                "section type names cannot be blank",
            ));
        }
        Ok(())
    }
}
