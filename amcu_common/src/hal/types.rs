//! AMCU command and event types.
//!
//! This module defines the data passed from the bridge to a driver:
//! - `Motor` - Logical motor slot on the board
//! - `DriveBase` - Topology plus geometry of the drive base
//! - `PidGains` / `LimitSwitchConfig` - Tuning and switch settings
//! - `AxisSpeeds` / `DistanceTarget` - Whole-robot motion commands
//! - `DriverEvent` - Hardware events forwarded to listeners

use crate::consts::{
    DRIVE_ACTION_METHOD, LIMIT_SWITCH_METHOD, LIMIT_SWITCH_MOTORS, MOTOR_COUNT,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical motor slot on the AMCU board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Motor(pub u8);

impl Motor {
    /// Raw motor id.
    #[inline]
    pub const fn id(self) -> u8 {
        self.0
    }

    /// Array index of this motor, or `None` if the id has no slot.
    #[inline]
    pub const fn index(self) -> Option<usize> {
        if (self.0 as usize) < MOTOR_COUNT {
            Some(self.0 as usize)
        } else {
            None
        }
    }

    /// Whether this motor has a limit-switch interrupt.
    pub fn has_limit_switch(self) -> bool {
        LIMIT_SWITCH_MOTORS.contains(&self.0)
    }
}

impl fmt::Display for Motor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

/// Drive-base topology without geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Three omni wheels (left, right, back).
    Omni,
    /// Four mecanum wheels.
    Mecanum,
    /// Two-wheel differential drive.
    Differential2,
    /// Four-wheel differential drive.
    Differential4,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Topology::Omni => "omni",
            Topology::Mecanum => "mecanum",
            Topology::Differential2 => "differential-2wheel",
            Topology::Differential4 => "differential-4wheel",
        };
        f.write_str(name)
    }
}

/// Drive-base topology with geometry and motor assignment.
///
/// Lengths are millimetres. Values are passed through as narrowed; no
/// plausibility checks happen here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveBase {
    /// Three-wheel omni drive.
    Omni {
        /// Wheel radius [mm]
        wheel_radius_mm: u8,
        /// Distance from robot centre to wheel contact [mm]
        robot_radius_mm: u16,
        /// Left wheel motor
        left: Motor,
        /// Right wheel motor
        right: Motor,
        /// Back wheel motor
        back: Motor,
    },
    /// Four-wheel mecanum drive.
    Mecanum {
        /// Wheel radius [mm]
        wheel_radius_mm: u8,
        /// Robot length [mm]
        robot_x_mm: u16,
        /// Robot width [mm]
        robot_y_mm: u16,
        /// Front left motor
        front_left: Motor,
        /// Front right motor
        front_right: Motor,
        /// Back left motor
        back_left: Motor,
        /// Back right motor
        back_right: Motor,
    },
    /// Two-wheel differential drive.
    Differential2 {
        /// Wheel radius [mm]
        wheel_radius_mm: u8,
        /// Distance between the wheels [mm]
        wheel_distance_mm: u16,
        /// Left motor
        left: Motor,
        /// Right motor
        right: Motor,
    },
    /// Four-wheel differential drive.
    Differential4 {
        /// Wheel radius [mm]
        wheel_radius_mm: u8,
        /// Distance between left and right wheels [mm]
        wheel_distance_mm: u16,
        /// Front left motor
        front_left: Motor,
        /// Front right motor
        front_right: Motor,
        /// Back left motor
        back_left: Motor,
        /// Back right motor
        back_right: Motor,
    },
}

impl DriveBase {
    /// Topology of this drive base.
    pub fn topology(&self) -> Topology {
        match self {
            DriveBase::Omni { .. } => Topology::Omni,
            DriveBase::Mecanum { .. } => Topology::Mecanum,
            DriveBase::Differential2 { .. } => Topology::Differential2,
            DriveBase::Differential4 { .. } => Topology::Differential4,
        }
    }

    /// Wheel radius [mm].
    pub fn wheel_radius_mm(&self) -> u8 {
        match *self {
            DriveBase::Omni { wheel_radius_mm, .. }
            | DriveBase::Mecanum { wheel_radius_mm, .. }
            | DriveBase::Differential2 { wheel_radius_mm, .. }
            | DriveBase::Differential4 { wheel_radius_mm, .. } => wheel_radius_mm,
        }
    }

    /// Motors driven by this base, in declaration order.
    pub fn motors(&self) -> heapless::Vec<Motor, MOTOR_COUNT> {
        match *self {
            DriveBase::Omni { left, right, back, .. } => [left, right, back].into_iter().collect(),
            DriveBase::Mecanum {
                front_left,
                front_right,
                back_left,
                back_right,
                ..
            }
            | DriveBase::Differential4 {
                front_left,
                front_right,
                back_left,
                back_right,
                ..
            } => [front_left, front_right, back_left, back_right]
                .into_iter()
                .collect(),
            DriveBase::Differential2 { left, right, .. } => [left, right].into_iter().collect(),
        }
    }
}

/// PID gains applied to every motor's speed loop.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f32,
    /// Integral gain (0 = disabled).
    pub ki: f32,
    /// Derivative gain (0 = disabled).
    pub kd: f32,
}

/// Limit-switch settings for one motor, as raw codes.
///
/// Non-zero codes mean "set"; the driver owns their exact interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LimitSwitchConfig {
    /// Active level: low (0) or high (non-zero).
    pub high: u8,
    /// Disabled (0) or enabled (non-zero).
    pub enable: u8,
    /// Normally open (0) or normally closed (non-zero).
    pub mode: u8,
    /// Debounce interval in driver-defined units (0 = none).
    pub bounce: u8,
}

impl LimitSwitchConfig {
    /// Whether the switch is enabled.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enable != 0
    }

    /// Whether the switch is active on a high level.
    #[inline]
    pub fn active_high(&self) -> bool {
        self.high != 0
    }

    /// Whether the switch is normally closed.
    #[inline]
    pub fn normally_closed(&self) -> bool {
        self.mode != 0
    }
}

/// Body speeds for whole-robot motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AxisSpeeds {
    /// Forward speed [cm/s]
    pub x: i8,
    /// Strafe speed, positive to the left [cm/s]
    pub y: i8,
    /// Rotation speed, counter-clockwise [deg/s]
    pub w: i8,
}

impl AxisSpeeds {
    /// All axes at rest.
    pub const ZERO: AxisSpeeds = AxisSpeeds { x: 0, y: 0, w: 0 };

    /// Create body speeds.
    pub const fn new(x: i8, y: i8, w: i8) -> Self {
        Self { x, y, w }
    }
}

/// Target displacement for a distance-bounded drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DistanceTarget {
    /// Forward distance [m]
    pub x_m: u8,
    /// Strafe distance [m]
    pub y_m: u8,
    /// Rotation [deg]
    pub omega_deg: u16,
}

/// Hardware event forwarded to a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriverEvent {
    /// A limit switch triggered.
    LimitSwitch,
    /// A bounded drive action completed.
    DriveAction,
}

impl DriverEvent {
    /// Name of the listener method invoked for this event.
    pub const fn listener_method(self) -> &'static str {
        match self {
            DriverEvent::LimitSwitch => LIMIT_SWITCH_METHOD,
            DriverEvent::DriveAction => DRIVE_ACTION_METHOD,
        }
    }
}

impl fmt::Display for DriverEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverEvent::LimitSwitch => f.write_str("limit-switch"),
            DriverEvent::DriveAction => f.write_str("drive-action"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motor_index_bounds() {
        assert_eq!(Motor(0).index(), Some(0));
        assert_eq!(Motor(3).index(), Some(3));
        assert_eq!(Motor(4).index(), None);
        assert_eq!(Motor(255).index(), None);
    }

    #[test]
    fn motor_one_has_no_limit_switch() {
        assert!(Motor(0).has_limit_switch());
        assert!(!Motor(1).has_limit_switch());
        assert!(Motor(2).has_limit_switch());
        assert!(Motor(3).has_limit_switch());
    }

    #[test]
    fn drive_base_motors_follow_declaration_order() {
        let base = DriveBase::Mecanum {
            wheel_radius_mm: 30,
            robot_x_mm: 400,
            robot_y_mm: 300,
            front_left: Motor(2),
            front_right: Motor(0),
            back_left: Motor(3),
            back_right: Motor(1),
        };
        assert_eq!(base.topology(), Topology::Mecanum);
        assert_eq!(base.wheel_radius_mm(), 30);
        assert_eq!(
            base.motors().as_slice(),
            &[Motor(2), Motor(0), Motor(3), Motor(1)]
        );

        let omni = DriveBase::Omni {
            wheel_radius_mm: 20,
            robot_radius_mm: 150,
            left: Motor(0),
            right: Motor(1),
            back: Motor(2),
        };
        assert_eq!(omni.motors().len(), 3);
    }

    #[test]
    fn limit_switch_codes() {
        let cfg = LimitSwitchConfig {
            high: 1,
            enable: 1,
            mode: 0,
            bounce: 3,
        };
        assert!(cfg.is_enabled());
        assert!(cfg.active_high());
        assert!(!cfg.normally_closed());
        assert!(!LimitSwitchConfig::default().is_enabled());
    }

    #[test]
    fn event_listener_methods() {
        assert_eq!(
            DriverEvent::LimitSwitch.listener_method(),
            "onLimitSwitchTriggered"
        );
        assert_eq!(DriverEvent::DriveAction.listener_method(), "onDriveAction");
    }
}
