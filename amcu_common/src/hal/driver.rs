//! AMCU driver trait and error types.
//!
//! This module defines:
//! - `AmcuDriver` trait - Interface for pluggable AMCU backends
//! - `DriverError` enum - Error types for driver operations
//! - `EventSink` - Channel through which a driver reports hardware events
//! - `DriverContext` / `DriverFactory` - Driver construction

use crate::hal::types::{
    AxisSpeeds, DistanceTarget, DriveBase, DriverEvent, LimitSwitchConfig, Motor, PidGains,
};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error types for driver operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// No driver registered under this name
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Motor id has no slot on the board
    #[error("Invalid motor: {0}")]
    InvalidMotor(Motor),

    /// Operation not available on this hardware
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Motion command issued before a drive base was configured
    #[error("No drive base configured")]
    NotConfigured,

    /// Driver-specific settings could not be parsed
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Sink for hardware events raised by a driver.
///
/// Drivers call [`EventSink::emit`] from whatever thread observes the event.
/// Implementations must not block.
#[derive(Clone)]
pub struct EventSink {
    emit: Arc<dyn Fn(DriverEvent) + Send + Sync>,
}

impl EventSink {
    /// Create a sink from a non-blocking callback.
    pub fn new(emit: impl Fn(DriverEvent) + Send + Sync + 'static) -> Self {
        Self {
            emit: Arc::new(emit),
        }
    }

    /// A sink that drops every event.
    pub fn discard() -> Self {
        Self::new(|_| {})
    }

    /// Report an event.
    #[inline]
    pub fn emit(&self, event: DriverEvent) {
        (self.emit)(event);
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink").finish_non_exhaustive()
    }
}

/// Everything a factory needs to build a driver.
#[derive(Debug, Clone)]
pub struct DriverContext {
    /// Driver-specific settings (`[drivers.<name>]` table).
    pub settings: toml::Table,
    /// Where the driver reports hardware events.
    pub events: EventSink,
}

impl DriverContext {
    /// Create a context.
    pub fn new(settings: toml::Table, events: EventSink) -> Self {
        Self { settings, events }
    }

    /// Deserialize the driver-specific settings.
    ///
    /// # Errors
    /// Returns `DriverError::ConfigError` if the table does not match `T`.
    pub fn settings<T: DeserializeOwned>(&self) -> Result<T, DriverError> {
        toml::Value::Table(self.settings.clone())
            .try_into::<T>()
            .map_err(|e| DriverError::ConfigError(e.to_string()))
    }
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn(DriverContext) -> Result<Box<dyn AmcuDriver>, DriverError>;

/// Trait defining the interface of an AMCU driver.
///
/// The bridge owns exactly one driver and calls it synchronously from the
/// thread that entered the bridge. Implementations are expected to return
/// quickly; the bridge imposes no timeout.
///
/// # Lifecycle
///
/// 1. Built by a [`DriverFactory`] on the first topology initializer
/// 2. `configure()` - Called for every topology initializer, including later
///    reconfigurations of the same instance
/// 3. Dropped only on explicit bridge shutdown
pub trait AmcuDriver: Send {
    /// Returns the driver's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Configure the drive-base topology and geometry.
    fn configure(&mut self, base: &DriveBase) -> Result<(), DriverError>;

    /// Set PID gains for all motors.
    fn set_pid(&mut self, gains: PidGains) -> Result<(), DriverError>;

    /// Configure the limit switch of one motor.
    fn set_limit_switch(&mut self, motor: Motor, config: LimitSwitchConfig) -> Result<(), DriverError>;

    /// Closed-loop target RPM for one motor.
    fn set_rpm(&mut self, motor: Motor, rpm: i8) -> Result<(), DriverError>;

    /// Open-loop speed in percent for one motor.
    fn set_speed(&mut self, motor: Motor, percent: i8) -> Result<(), DriverError>;

    /// Reset one motor's encoder counter to zero.
    fn reset_encoder(&mut self, motor: Motor) -> Result<(), DriverError>;

    /// Stop all motors immediately and cancel any running motion.
    fn stop(&mut self) -> Result<(), DriverError>;

    /// Current encoder count.
    fn encoder(&mut self, motor: Motor) -> Result<i16, DriverError>;

    /// Current RPM.
    fn rpm(&mut self, motor: Motor) -> Result<i32, DriverError>;

    /// Drive the base at the given body speeds until replaced or stopped.
    fn speed_drive(&mut self, speeds: AxisSpeeds) -> Result<(), DriverError>;

    /// Drive the base at the given body speeds for `time_s` seconds.
    ///
    /// Completion is reported as [`DriverEvent::DriveAction`].
    fn time_drive(&mut self, speeds: AxisSpeeds, time_s: u8) -> Result<(), DriverError>;

    /// Drive the base by the given displacement.
    ///
    /// Completion is reported as [`DriverEvent::DriveAction`].
    fn drive_distance(&mut self, target: DistanceTarget) -> Result<(), DriverError>;

    /// Force a limit-switch input to an electrical level.
    ///
    /// Only backends without physical inputs can do this. Default: unsupported.
    fn set_switch_input(&mut self, motor: Motor, _level: bool) -> Result<(), DriverError> {
        Err(DriverError::Unsupported(format!(
            "{} cannot drive switch input of {}",
            self.name(),
            motor
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::InvalidMotor(Motor(7));
        assert!(err.to_string().contains("M7"));

        let err = DriverError::DriverNotFound("ethercat".to_string());
        assert!(err.to_string().contains("ethercat"));
    }

    #[test]
    fn test_event_sink_forwards_events() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let sink = EventSink::new(move |event| {
            assert_eq!(event, DriverEvent::DriveAction);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        sink.emit(DriverEvent::DriveAction);
        sink.clone().emit(DriverEvent::DriveAction);
        EventSink::discard().emit(DriverEvent::LimitSwitch);

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_context_settings() {
        #[derive(Debug, Deserialize)]
        struct Settings {
            #[serde(default)]
            max_rpm: f32,
        }

        let mut table = toml::Table::new();
        table.insert("max_rpm".to_string(), toml::Value::Float(120.0));
        let ctx = DriverContext::new(table, EventSink::discard());
        let settings: Settings = ctx.settings().expect("valid settings");
        assert_eq!(settings.max_rpm, 120.0);

        let empty = DriverContext::new(toml::Table::new(), EventSink::discard());
        let settings: Settings = empty.settings().expect("defaults");
        assert_eq!(settings.max_rpm, 0.0);

        let mut bad = toml::Table::new();
        bad.insert("max_rpm".to_string(), toml::Value::String("fast".into()));
        let ctx = DriverContext::new(bad, EventSink::discard());
        assert!(matches!(
            ctx.settings::<Settings>(),
            Err(DriverError::ConfigError(_))
        ));
    }
}
