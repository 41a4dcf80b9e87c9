//! Prelude module for common re-exports.
//!
//! This module provides convenient re-exports of commonly used types
//! so that consumers can do `use amcu_common::prelude::*;` and get
//! the most important types without listing individual paths.
//!
//! # Usage
//!
//! ```rust
//! use amcu_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{BridgeConfig, BridgeSection, ConfigError, ConfigLoader, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{LIMIT_SWITCH_MOTORS, MOTOR_COUNT};

// ─── Driver ─────────────────────────────────────────────────────────
pub use crate::hal::driver::{AmcuDriver, DriverContext, DriverError, DriverFactory, EventSink};
pub use crate::hal::types::{
    AxisSpeeds, DistanceTarget, DriveBase, DriverEvent, LimitSwitchConfig, Motor, PidGains,
    Topology,
};
