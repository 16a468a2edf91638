//! Configuration for the document text model.
//!
//! Every knob the text model needs is carried by an explicit
//! [`TextModelConfig`] value that callers pass in, so linearization stays a
//! function of its inputs. Configurations can be built in code or loaded from
//! TOML:
//!
//! ```ignore
//! let config = TextModelConfig::from_toml_str(r#"
//!     format-units = ["format", "word", "character"]
//!     max-depth = 24
//!
//!     [tab]
//!     timeout-ms = 500
//! "#)?;
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::logging::targets;
use crate::unit::TextUnit;

/// Automation id pattern identifying page elements.
pub const DEFAULT_PAGE_ID_PATTERN: &str = "^UIA_AutomationId_Word_Page_";

/// Automation id prefix of the editable wrappers placed around links, table cells etc.
pub const DEFAULT_CONTENT_WRAPPER_PREFIX: &str = "UIA_AutomationId_Word_Content";

/// Configuration for linearization, navigation and browse-mode behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TextModelConfig {
    /// Regex matched against automation ids to detect page elements.
    pub page_id_pattern: String,
    /// Automation id prefix of provider-injected content wrappers.
    pub content_wrapper_prefix: String,
    /// Units used to split text into formatted chunks, coarsest first.
    pub format_units: Vec<TextUnit>,
    /// Maximum nesting depth walked below the enclosing element.
    pub max_depth: usize,
    /// Maximum number of consecutive sentinel characters skipped by one move.
    pub sentinel_skip_limit: usize,
    /// Maximum text length requested from the provider per call.
    pub max_text_length: Option<usize>,
    /// Tab gesture handling.
    pub tab: TabConfig,
}

impl Default for TextModelConfig {
    fn default() -> Self {
        Self {
            page_id_pattern: DEFAULT_PAGE_ID_PATTERN.to_string(),
            content_wrapper_prefix: DEFAULT_CONTENT_WRAPPER_PREFIX.to_string(),
            format_units: vec![TextUnit::Format, TextUnit::Word],
            max_depth: 32,
            sentinel_skip_limit: 64,
            max_text_length: None,
            tab: TabConfig::default(),
        }
    }
}

impl TextModelConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        tracing::debug!(target: targets::CONFIG, "Loading configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Serialize this configuration as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check that values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::invalid_value(
                "max-depth",
                "must be greater than zero",
            ));
        }
        if self.tab.poll_interval_ms == 0 {
            return Err(Error::invalid_value(
                "tab.poll-interval-ms",
                "must be greater than zero",
            ));
        }
        if self.max_text_length == Some(0) {
            return Err(Error::invalid_value(
                "max-text-length",
                "must be greater than zero when set",
            ));
        }
        regex::Regex::new(&self.page_id_pattern)
            .map_err(|e| Error::invalid_pattern(self.page_id_pattern.clone(), e))?;
        Ok(())
    }

    /// Set the format split units.
    pub fn format_units(mut self, units: impl Into<Vec<TextUnit>>) -> Self {
        self.format_units = units.into();
        self
    }

    /// Set the maximum walk depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the tab gesture timeout.
    pub fn tab_timeout(mut self, timeout: Duration) -> Self {
        self.tab.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

/// Settings for the tab gesture state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TabConfig {
    /// How long to wait for the selection to change after forwarding a tab.
    pub timeout_ms: u64,
    /// How often the selection is polled while waiting.
    pub poll_interval_ms: u64,
}

impl Default for TabConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 1000,
            poll_interval_ms: 10,
        }
    }
}

impl TabConfig {
    /// The wait timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = TextModelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.format_units, vec![TextUnit::Format, TextUnit::Word]);
        assert_eq!(config.tab.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TextModelConfig::from_toml_str(
            r#"
            format-units = ["format", "word", "character"]
            max-depth = 8

            [tab]
            timeout-ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(
            config.format_units,
            vec![TextUnit::Format, TextUnit::Word, TextUnit::Character]
        );
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.tab.timeout_ms, 250);
        assert_eq!(config.tab.poll_interval_ms, 10);
        assert_eq!(config.page_id_pattern, DEFAULT_PAGE_ID_PATTERN);
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let err = TextModelConfig::from_toml_str("[tab]\npoll-interval-ms = 0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let err = TextModelConfig::from_toml_str("page-id-pattern = \"(unclosed\"\n").unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn test_unknown_unit_is_parse_error() {
        let err = TextModelConfig::from_toml_str("format-units = [\"sentence\"]\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "content-wrapper-prefix = \"Wrapper_\"").unwrap();

        let config = TextModelConfig::from_file(file.path()).unwrap();
        assert_eq!(config.content_wrapper_prefix, "Wrapper_");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TextModelConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = TextModelConfig::new()
            .max_depth(12)
            .tab_timeout(Duration::from_millis(300));
        let text = config.to_toml_string().unwrap();
        assert_eq!(TextModelConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_tab_timeout_saturates() {
        let config = TextModelConfig::new().tab_timeout(Duration::MAX);
        assert_eq!(config.tab.timeout_ms, u64::MAX);

        let timeout = Duration::from_micros(2_500);
        let config = TextModelConfig::new().tab_timeout(timeout);
        assert_eq!(config.tab.timeout_ms, 2);
    }
}
