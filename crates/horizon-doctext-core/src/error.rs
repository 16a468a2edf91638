//! Error types for Horizon Doctext.

use std::path::PathBuf;

/// Result type alias for document text model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a tree provider or loading configuration.
///
/// Expected outcomes such as reaching a document boundary or an empty selection
/// are never reported through this type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The external tree provider failed at the transport level (for example
    /// the underlying object died). Never retried.
    #[error("Tree provider unavailable during {operation}: {message}")]
    ProviderUnavailable {
        operation: &'static str,
        message: String,
    },

    /// Configuration text could not be parsed.
    #[error("Configuration parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration could not be written as TOML.
    #[error("Configuration serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Configuration file could not be read.
    #[error("Failed to read configuration '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An automation id pattern failed to compile.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A configuration value parsed but cannot be used.
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl Error {
    /// Create a provider failure for the named operation.
    pub fn provider(operation: &'static str, message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            operation,
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a value error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error came from the tree provider.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, Self::ProviderUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = Error::provider("get_text", "object died");
        assert!(err.is_provider_failure());
        assert_eq!(
            err.to_string(),
            "Tree provider unavailable during get_text: object died"
        );
    }

    #[test]
    fn test_invalid_value_is_not_provider_failure() {
        let err = Error::invalid_value("tab.poll-interval-ms", "must be greater than zero");
        assert!(!err.is_provider_failure());
        assert!(err.to_string().contains("tab.poll-interval-ms"));
    }
}
