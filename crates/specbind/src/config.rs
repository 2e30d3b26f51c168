//! Configuration
//!
//! Settings load from a YAML file; `SPECBIND_*` environment variables
//! override individual values. The result converts into the
//! [`ActionSettings`] every action receives, so nothing reads global state.
//!
//! ```yaml
//! application:
//!   start_url: http://localhost:8080
//! browser:
//!   element_locate_timeout_ms: 10000
//!   highlight_mode: full
//! logging:
//!   level: debug
//!   json: true
//! ```

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::actions::{ActionSettings, HighlightMode};
use crate::result::{SpecBindError, SpecBindResult};
use crate::wait::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "SPECBIND_";

// =============================================================================
// SECTIONS
// =============================================================================

/// Application under test
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Base URL relative page URLs resolve against
    pub start_url: String,
}

/// Browser timing and behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Element waits and validation retries
    pub element_locate_timeout_ms: u64,
    /// Page waits
    pub page_load_timeout_ms: u64,
    /// Delay between polls
    pub poll_interval_ms: u64,
    /// Re-run failing validations until the element timeout
    pub retry_validation_until_timeout: bool,
    /// Element highlighting
    pub highlight_mode: HighlightMode,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            element_locate_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            page_load_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            retry_validation_until_timeout: false,
            highlight_mode: HighlightMode::Off,
        }
    }
}

/// Log output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directives, e.g. `info` or `specbind=debug`
    pub level: String,
    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecBindConfig {
    /// Browser timing and behavior
    pub browser: BrowserConfig,
    /// Application under test
    pub application: ApplicationConfig,
    /// Log output
    pub logging: LoggingConfig,
}

impl SpecBindConfig {
    /// Parse YAML; missing sections and keys take their defaults
    pub fn from_yaml_str(yaml: &str) -> SpecBindResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn load(path: impl AsRef<Path>) -> SpecBindResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|err| {
            SpecBindError::config(format!("Failed to read {}: {err}", path.display()))
        })?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load a YAML file, then apply environment overrides
    pub fn load_with_env(path: impl AsRef<Path>) -> SpecBindResult<Self> {
        let mut config = Self::load(path)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Defaults with environment overrides
    pub fn from_env() -> SpecBindResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `SPECBIND_*` variables from the process environment
    pub fn apply_env(&mut self) -> SpecBindResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by full variable name
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> SpecBindResult<()> {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(url) = var("START_URL") {
            self.application.start_url = url;
        }
        if let Some(value) = var("ELEMENT_TIMEOUT_MS") {
            self.browser.element_locate_timeout_ms = parse_var("ELEMENT_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = var("PAGE_TIMEOUT_MS") {
            self.browser.page_load_timeout_ms = parse_var("PAGE_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = var("POLL_INTERVAL_MS") {
            self.browser.poll_interval_ms = parse_var("POLL_INTERVAL_MS", &value)?;
        }
        if let Some(value) = var("RETRY_VALIDATION") {
            self.browser.retry_validation_until_timeout = parse_var("RETRY_VALIDATION", &value)?;
        }
        if let Some(value) = var("HIGHLIGHT_MODE") {
            self.browser.highlight_mode = match value.trim().to_ascii_lowercase().as_str() {
                "off" => HighlightMode::Off,
                "full" => HighlightMode::Full,
                _ => return Err(invalid_var("HIGHLIGHT_MODE", &value)),
            };
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(value) = var("LOG_JSON") {
            self.logging.json = parse_var("LOG_JSON", &value)?;
        }
        self.validate()
    }

    /// Reject values no action can run with
    pub fn validate(&self) -> SpecBindResult<()> {
        if self.browser.poll_interval_ms == 0 {
            return Err(SpecBindError::config("browser.poll_interval_ms must be greater than zero"));
        }
        if self.logging.level.trim().is_empty() {
            return Err(SpecBindError::config("logging.level must not be empty"));
        }
        Ok(())
    }

    /// Settings handed to actions
    #[must_use]
    pub fn action_settings(&self) -> ActionSettings {
        ActionSettings::from(self)
    }
}

impl From<&SpecBindConfig> for ActionSettings {
    fn from(config: &SpecBindConfig) -> Self {
        Self {
            element_timeout: Duration::from_millis(config.browser.element_locate_timeout_ms),
            page_timeout: Duration::from_millis(config.browser.page_load_timeout_ms),
            poll_interval: Duration::from_millis(config.browser.poll_interval_ms),
            retry_validation_until_timeout: config.browser.retry_validation_until_timeout,
            highlight_mode: config.browser.highlight_mode,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> SpecBindResult<T> {
    value.trim().parse().map_err(|_| invalid_var(name, value))
}

fn invalid_var(name: &str, value: &str) -> SpecBindError {
    SpecBindError::config(format!("Invalid {ENV_PREFIX}{name}: '{value}'"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_defaults_for_missing_keys() {
            let config = SpecBindConfig::from_yaml_str("application:\n  start_url: http://app\n").unwrap();
            assert_eq!(config.application.start_url, "http://app");
            assert_eq!(config.browser, BrowserConfig::default());
            assert_eq!(config.logging.level, "info");
        }

        #[test]
        fn test_full_document() {
            let yaml = "
browser:
  element_locate_timeout_ms: 5000
  page_load_timeout_ms: 9000
  poll_interval_ms: 50
  retry_validation_until_timeout: true
  highlight_mode: full
logging:
  level: specbind=debug
  json: true
";
            let config = SpecBindConfig::from_yaml_str(yaml).unwrap();
            let settings = config.action_settings();
            assert_eq!(settings.element_timeout, Duration::from_secs(5));
            assert_eq!(settings.page_timeout, Duration::from_secs(9));
            assert_eq!(settings.poll_interval, Duration::from_millis(50));
            assert!(settings.retry_validation_until_timeout);
            assert_eq!(settings.highlight_mode, HighlightMode::Full);
            assert!(config.logging.json);
        }

        #[test]
        fn test_zero_poll_interval_rejected() {
            let err = SpecBindConfig::from_yaml_str("browser:\n  poll_interval_ms: 0\n").unwrap_err();
            assert!(matches!(err, SpecBindError::Config { .. }));
        }

        #[test]
        fn test_malformed_yaml() {
            let err = SpecBindConfig::from_yaml_str("browser: [1, 2").unwrap_err();
            assert!(matches!(err, SpecBindError::Yaml(_)));
        }

        #[test]
        fn test_load_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "application:\n  start_url: http://file").unwrap();
            let config = SpecBindConfig::load(file.path()).unwrap();
            assert_eq!(config.application.start_url, "http://file");
        }

        #[test]
        fn test_load_missing_file() {
            let dir = tempfile::tempdir().unwrap();
            let err = SpecBindConfig::load(dir.path().join("absent.yaml")).unwrap_err();
            assert!(err.to_string().contains("Failed to read"));
        }
    }

    mod override_tests {
        use super::*;

        #[test]
        fn test_overrides_win() {
            let mut config = SpecBindConfig::from_yaml_str("application:\n  start_url: http://file\n").unwrap();
            config
                .apply_overrides(overrides(&[
                    ("SPECBIND_START_URL", "http://env"),
                    ("SPECBIND_ELEMENT_TIMEOUT_MS", "1500"),
                    ("SPECBIND_RETRY_VALIDATION", "true"),
                    ("SPECBIND_HIGHLIGHT_MODE", "FULL"),
                    ("SPECBIND_LOG_JSON", "true"),
                ]))
                .unwrap();
            assert_eq!(config.application.start_url, "http://env");
            assert_eq!(config.browser.element_locate_timeout_ms, 1500);
            assert!(config.browser.retry_validation_until_timeout);
            assert_eq!(config.browser.highlight_mode, HighlightMode::Full);
            assert!(config.logging.json);
        }

        #[test]
        fn test_invalid_override() {
            let mut config = SpecBindConfig::default();
            let err = config
                .apply_overrides(overrides(&[("SPECBIND_PAGE_TIMEOUT_MS", "soon")]))
                .unwrap_err();
            assert!(err.to_string().contains("SPECBIND_PAGE_TIMEOUT_MS"));
            let err = config
                .apply_overrides(overrides(&[("SPECBIND_HIGHLIGHT_MODE", "blink")]))
                .unwrap_err();
            assert!(err.to_string().contains("blink"));
        }

        #[test]
        fn test_no_overrides_keeps_values() {
            let mut config = SpecBindConfig::default();
            config.apply_overrides(|_| None).unwrap();
            assert_eq!(config, SpecBindConfig::default());
        }
    }
}
