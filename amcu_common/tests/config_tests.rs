//! Bridge configuration file tests.
//!
//! Tests for `BridgeConfig::load_validated()`: full file, partial file
//! defaults, missing file, malformed TOML, validation failures and
//! driver-settings extraction.

use amcu_common::config::{BridgeConfig, ConfigError, LogLevel};
use amcu_common::hal::driver::{DriverContext, EventSink};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write `content` as bridge.toml in the given directory.
fn write_bridge_toml(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("bridge.toml");
    fs::write(&path, content).unwrap();
    path
}

/// Subset of simulation settings used to check table extraction.
#[derive(Debug, Deserialize)]
struct SimSettings {
    cycle_time_us: u32,
    max_rpm: f32,
}

// ─── Tests ──────────────────────────────────────────────────────────

/// Test: a complete file loads with every section populated.
#[test]
fn load_full_config() {
    let tmp = TempDir::new().unwrap();
    let path = write_bridge_toml(
        tmp.path(),
        r#"
[shared]
log_level = "debug"
service_name = "robot-7"

[bridge]
driver = "simulation"
event_queue_depth = 8
json_logs = true

[drivers.simulation]
cycle_time_us = 0
max_rpm = 120.0
"#,
    );

    let config = BridgeConfig::load_validated(&path).expect("should load");
    assert_eq!(config.shared.log_level, LogLevel::Debug);
    assert_eq!(config.shared.service_name, "robot-7");
    assert_eq!(config.bridge.event_queue_depth, 8);
    assert!(config.bridge.json_logs);

    let ctx = DriverContext::new(config.driver_settings(), EventSink::discard());
    let sim: SimSettings = ctx.settings().expect("simulation settings");
    assert_eq!(sim.cycle_time_us, 0);
    assert_eq!(sim.max_rpm, 120.0);
}

/// Test: sections left out fall back to defaults.
#[test]
fn partial_config_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = write_bridge_toml(tmp.path(), "[bridge]\nevent_queue_depth = 4\n");

    let config = BridgeConfig::load_validated(&path).expect("should load");
    assert_eq!(config.shared.log_level, LogLevel::Info);
    assert_eq!(config.shared.service_name, "amcu-bridge");
    assert_eq!(config.bridge.driver, "simulation");
    assert_eq!(config.bridge.event_queue_depth, 4);
    assert!(config.drivers.is_empty());
}

/// Test: a missing file is reported as such.
#[test]
fn missing_file() {
    let tmp = TempDir::new().unwrap();
    let result = BridgeConfig::load_validated(&tmp.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound)));
}

/// Test: malformed TOML is a parse error.
#[test]
fn malformed_file() {
    let tmp = TempDir::new().unwrap();
    let path = write_bridge_toml(tmp.path(), "[bridge\ndriver = ");
    let result = BridgeConfig::load_validated(&path);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

/// Test: semantic validation runs after parsing.
#[test]
fn zero_queue_depth_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = write_bridge_toml(tmp.path(), "[bridge]\nevent_queue_depth = 0\n");
    let result = BridgeConfig::load_validated(&path);
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

/// Test: an explicit empty service name is rejected.
#[test]
fn empty_service_name_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = write_bridge_toml(tmp.path(), "[shared]\nservice_name = \"\"\n");
    let result = BridgeConfig::load_validated(&path);
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

/// Test: settings of drivers other than the selected one are ignored.
#[test]
fn driver_settings_follow_selected_driver() {
    let tmp = TempDir::new().unwrap();
    let path = write_bridge_toml(
        tmp.path(),
        r#"
[bridge]
driver = "hardware"

[drivers.simulation]
cycle_time_us = 0

[drivers.hardware]
port = "/dev/ttyS1"
"#,
    );

    let config = BridgeConfig::load_validated(&path).expect("should load");
    let settings = config.driver_settings();
    assert_eq!(
        settings.get("port").and_then(|v| v.as_str()),
        Some("/dev/ttyS1")
    );
    assert!(settings.get("cycle_time_us").is_none());
}
