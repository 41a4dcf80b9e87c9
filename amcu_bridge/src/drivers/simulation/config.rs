//! Simulation driver settings (`[drivers.simulation]` table).

use amcu_common::hal::driver::DriverError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

/// Accepted `max_rpm` values.
const MAX_RPM_RANGE: RangeInclusive<f32> = 1.0..=10_000.0;

/// Accepted `cruise_speed_cms` values.
const CRUISE_SPEED_RANGE: RangeInclusive<f32> = 0.1..=1_000.0;

/// Accepted `cruise_turn_degs` values.
const CRUISE_TURN_RANGE: RangeInclusive<f32> = 0.1..=3_600.0;

fn check_range(name: &str, value: f32, range: &RangeInclusive<f32>) -> Result<(), DriverError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(DriverError::ConfigError(format!(
            "{} must be within {}..={}, got {}",
            name,
            range.start(),
            range.end(),
            value
        )))
    }
}

/// Tunables of the simulated AMCU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Background stepping period in microseconds. 0 disables the ticker;
    /// the model then only advances through `SimulationDriver::step`.
    pub cycle_time_us: u64,
    /// Motor speed at 100 % duty [rpm].
    pub max_rpm: f32,
    /// Encoder counts per motor revolution.
    pub counts_per_rev: u16,
    /// First-order motor response time constant [ms].
    pub motor_time_constant_ms: u32,
    /// Duration of one limit-switch `bounce` unit [ms].
    pub debounce_unit_ms: u32,
    /// Translation speed used by distance drives [cm/s].
    pub cruise_speed_cms: f32,
    /// Rotation speed used by distance drives [deg/s].
    pub cruise_turn_degs: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cycle_time_us: 10_000,
            max_rpm: 100.0,
            counts_per_rev: 360,
            motor_time_constant_ms: 50,
            debounce_unit_ms: 10,
            cruise_speed_cms: 20.0,
            cruise_turn_degs: 45.0,
        }
    }
}

impl SimulationConfig {
    /// Settings for manual stepping (no background ticker).
    pub fn manual() -> Self {
        Self {
            cycle_time_us: 0,
            ..Self::default()
        }
    }

    /// Stepping period, or `None` when the ticker is disabled.
    pub fn cycle_time(&self) -> Option<Duration> {
        (self.cycle_time_us > 0).then(|| Duration::from_micros(self.cycle_time_us))
    }

    /// Motor time constant [s].
    pub fn time_constant_s(&self) -> f32 {
        self.motor_time_constant_ms as f32 / 1000.0
    }

    /// Validate the settings.
    ///
    /// # Errors
    /// Returns `DriverError::ConfigError` for a speed outside its range
    /// (NaN and infinities included) or a zero encoder resolution.
    pub fn validate(&self) -> Result<(), DriverError> {
        check_range("max_rpm", self.max_rpm, &MAX_RPM_RANGE)?;
        if self.counts_per_rev == 0 {
            return Err(DriverError::ConfigError(
                "counts_per_rev cannot be zero".to_string(),
            ));
        }
        check_range("cruise_speed_cms", self.cruise_speed_cms, &CRUISE_SPEED_RANGE)?;
        check_range("cruise_turn_degs", self.cruise_turn_degs, &CRUISE_TURN_RANGE)
    }
}
