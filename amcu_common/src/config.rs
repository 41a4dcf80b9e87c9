//! Bridge configuration (`amcu.toml`).
//!
//! Every table is optional. `[shared]` carries logging and identity,
//! `[bridge]` selects the driver and sizes the event queue, and
//! `[drivers.<name>]` holds driver-specific settings passed through as a raw
//! TOML table.
//!
//! ```rust,no_run
//! use amcu_common::config::{BridgeConfig, ConfigError};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = BridgeConfig::load_validated(Path::new("amcu.toml"))?;
//!     println!("driver: {}", config.bridge.driver);
//!     Ok(())
//! }
//! ```

use crate::consts::{DEFAULT_DRIVER, DEFAULT_EVENT_QUEUE_DEPTH, DEFAULT_SERVICE_NAME};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading `amcu.toml`.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// `shared.log_level` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-call tracing, including operations on an uninitialized bridge.
    Trace,
    /// Driver construction, listener registration, motion start/stop.
    Debug,
    /// Lifecycle only.
    #[default]
    Info,
    /// Dropped events and driver errors.
    Warn,
    /// Failures only.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// `[shared]` table: logging and instance identity.
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "amcu-bridge-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Instance identifier, attached to log output.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `service_name` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load any deserializable configuration type from a TOML file.
///
/// A missing file is reported as `ConfigError::FileNotFound` so callers can
/// fall back to defaults; read and syntax failures are `ParseError`.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Read and parse `path`.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound,
            _ => ConfigError::ParseError(format!("{}: {}", path.display(), e)),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

/// Default function for `driver`
fn default_driver() -> String {
    DEFAULT_DRIVER.to_string()
}

/// Default function for `event_queue_depth`
fn default_event_queue_depth() -> usize {
    DEFAULT_EVENT_QUEUE_DEPTH
}

/// Bridge behavior settings (`[bridge]` table).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeSection {
    /// Name of the registered driver to construct on first initialization.
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Capacity of the queue between event producers and the dispatcher.
    #[serde(default = "default_event_queue_depth")]
    pub event_queue_depth: usize,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            event_queue_depth: default_event_queue_depth(),
            json_logs: false,
        }
    }
}

/// Complete bridge configuration.
///
/// Every section is optional; a missing file is equivalent to an empty one.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "amcu-bridge"
///
/// [bridge]
/// driver = "simulation"
/// event_queue_depth = 32
///
/// [drivers.simulation]
/// cycle_time_us = 10000
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Logging and service identity.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Bridge behavior.
    #[serde(default)]
    pub bridge: BridgeSection,

    /// Per-driver settings. Key = driver name.
    #[serde(default)]
    pub drivers: HashMap<String, toml::Table>,
}

impl BridgeConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `shared.service_name` is empty
    /// - `bridge.driver` is empty
    /// - `bridge.event_queue_depth` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.bridge.driver.is_empty() {
            return Err(ConfigError::ValidationError(
                "bridge.driver cannot be empty".to_string(),
            ));
        }
        if self.bridge.event_queue_depth == 0 {
            return Err(ConfigError::ValidationError(
                "bridge.event_queue_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate a configuration file.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Settings table of the selected driver (empty if absent).
    pub fn driver_settings(&self) -> toml::Table {
        self.drivers
            .get(&self.bridge.driver)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_log_level_parses_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            level: LogLevel,
        }

        for (text, level, tracing_level) in [
            ("trace", LogLevel::Trace, tracing::Level::TRACE),
            ("debug", LogLevel::Debug, tracing::Level::DEBUG),
            ("info", LogLevel::Info, tracing::Level::INFO),
            ("warn", LogLevel::Warn, tracing::Level::WARN),
            ("error", LogLevel::Error, tracing::Level::ERROR),
        ] {
            let parsed: Wrapper = toml::from_str(&format!("level = \"{text}\"")).unwrap();
            assert_eq!(parsed.level, level);
            assert_eq!(tracing::Level::from(level), tracing_level);
        }
        assert!(toml::from_str::<Wrapper>("level = \"loud\"").is_err());
    }

    #[test]
    fn test_shared_config_rejects_empty_service_name() {
        let config = SharedConfig {
            log_level: LogLevel::Debug,
            service_name: String::new(),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_missing_file_is_distinguishable() {
        let result = BridgeConfig::load(Path::new("/nonexistent/amcu.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound)));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[bridge\ndriver = ").unwrap();

        let result = BridgeConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_validated_rejects_zero_queue() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[bridge]\nevent_queue_depth = 0").unwrap();
        file.flush().unwrap();

        assert!(BridgeConfig::load(file.path()).is_ok());
        assert!(matches!(
            BridgeConfig::load_validated(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_shared_section_partial() {
        let config: BridgeConfig = toml::from_str("[shared]\nlog_level = \"warn\"\n").unwrap();
        assert_eq!(config.shared.log_level, LogLevel::Warn);
        assert_eq!(config.shared.service_name, DEFAULT_SERVICE_NAME);
    }

    #[test]
    fn test_bridge_config_defaults() {
        let config: BridgeConfig = toml::from_str("").unwrap();
        assert_eq!(config.shared.service_name, DEFAULT_SERVICE_NAME);
        assert_eq!(config.bridge.driver, "simulation");
        assert_eq!(config.bridge.event_queue_depth, DEFAULT_EVENT_QUEUE_DEPTH);
        assert!(!config.bridge.json_logs);
        assert!(config.driver_settings().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bridge_config_driver_settings() {
        let config: BridgeConfig = toml::from_str(
            r#"
[bridge]
driver = "simulation"

[drivers.simulation]
cycle_time_us = 0
max_rpm = 150.0

[drivers.other]
port = 3
"#,
        )
        .unwrap();

        let settings = config.driver_settings();
        assert_eq!(settings.get("cycle_time_us"), Some(&toml::Value::Integer(0)));
        assert!(settings.get("port").is_none());
    }

    #[test]
    fn test_bridge_config_validation() {
        let mut config = BridgeConfig::default();
        config.bridge.event_queue_depth = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = BridgeConfig::default();
        config.bridge.driver.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bridge_section_rejects_unknown_fields() {
        let result: Result<BridgeConfig, _> = toml::from_str("[bridge]\ndriverr = \"x\"\n");
        assert!(result.is_err());
    }
}
