use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading the config file failed
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The TOML document is malformed or has wrongly typed fields
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Serializing the config failed
    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A field holds a value outside its allowed range
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field
        field: String,
        /// Why the value was rejected
        reason: String,
    },
}

impl ConfigError {
    /// Create a validation error
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
