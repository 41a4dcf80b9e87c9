//! Narrowing of 32-bit boundary integers to driver bit-widths.
//!
//! Every conversion is two's-complement truncation to the low bits, the same
//! result a C++ `static_cast` to the narrower type produces. Out-of-range
//! values are not rejected here; interpreting them is the driver's concern.

use crate::hal::types::{AxisSpeeds, DistanceTarget, DriveBase, LimitSwitchConfig, Motor};

/// Truncate to an unsigned 8-bit value.
#[inline]
pub const fn to_u8(value: i32) -> u8 {
    value as u8
}

/// Truncate to an unsigned 16-bit value.
#[inline]
pub const fn to_u16(value: i32) -> u16 {
    value as u16
}

/// Truncate to a signed 8-bit value.
#[inline]
pub const fn to_i8(value: i32) -> i8 {
    value as i8
}

/// Truncate to a motor id.
#[inline]
pub const fn to_motor(value: i32) -> Motor {
    Motor(value as u8)
}

/// Omni drive base from boundary arguments.
pub const fn omni(wheel_radius: i32, robot_radius: i32, left: i32, right: i32, back: i32) -> DriveBase {
    DriveBase::Omni {
        wheel_radius_mm: to_u8(wheel_radius),
        robot_radius_mm: to_u16(robot_radius),
        left: to_motor(left),
        right: to_motor(right),
        back: to_motor(back),
    }
}

/// Mecanum drive base from boundary arguments.
#[allow(clippy::too_many_arguments)]
pub const fn mecanum(
    wheel_radius: i32,
    robot_x: i32,
    robot_y: i32,
    front_left: i32,
    front_right: i32,
    back_left: i32,
    back_right: i32,
) -> DriveBase {
    DriveBase::Mecanum {
        wheel_radius_mm: to_u8(wheel_radius),
        robot_x_mm: to_u16(robot_x),
        robot_y_mm: to_u16(robot_y),
        front_left: to_motor(front_left),
        front_right: to_motor(front_right),
        back_left: to_motor(back_left),
        back_right: to_motor(back_right),
    }
}

/// Two-wheel differential drive base from boundary arguments.
pub const fn differential_2wheel(wheel_radius: i32, wheel_distance: i32, left: i32, right: i32) -> DriveBase {
    DriveBase::Differential2 {
        wheel_radius_mm: to_u8(wheel_radius),
        wheel_distance_mm: to_u16(wheel_distance),
        left: to_motor(left),
        right: to_motor(right),
    }
}

/// Four-wheel differential drive base from boundary arguments.
pub const fn differential_4wheel(
    wheel_radius: i32,
    wheel_distance: i32,
    front_left: i32,
    front_right: i32,
    back_left: i32,
    back_right: i32,
) -> DriveBase {
    DriveBase::Differential4 {
        wheel_radius_mm: to_u8(wheel_radius),
        wheel_distance_mm: to_u16(wheel_distance),
        front_left: to_motor(front_left),
        front_right: to_motor(front_right),
        back_left: to_motor(back_left),
        back_right: to_motor(back_right),
    }
}

/// Limit-switch codes from boundary arguments.
pub const fn limit_switch(high: i32, enable: i32, mode: i32, bounce: i32) -> LimitSwitchConfig {
    LimitSwitchConfig {
        high: to_u8(high),
        enable: to_u8(enable),
        mode: to_u8(mode),
        bounce: to_u8(bounce),
    }
}

/// Body speeds from boundary arguments.
pub const fn axis_speeds(x: i32, y: i32, w: i32) -> AxisSpeeds {
    AxisSpeeds::new(to_i8(x), to_i8(y), to_i8(w))
}

/// Distance target from boundary arguments.
pub const fn distance(x_m: i32, y_m: i32, omega_deg: i32) -> DistanceTarget {
    DistanceTarget {
        x_m: to_u8(x_m),
        y_m: to_u8(y_m),
        omega_deg: to_u16(omega_deg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_values_pass_through() {
        assert_eq!(to_u8(200), 200);
        assert_eq!(to_u16(30), 30);
        assert_eq!(to_i8(-100), -100);
        assert_eq!(to_motor(3), Motor(3));
    }

    #[test]
    fn boundaries_truncate_like_static_cast() {
        assert_eq!(to_u8(255), 255);
        assert_eq!(to_u8(256), 0);
        assert_eq!(to_u8(-1), 255);
        assert_eq!(to_u16(65_536), 0);
        assert_eq!(to_u16(-1), u16::MAX);
        assert_eq!(to_i8(127), 127);
        assert_eq!(to_i8(128), -128);
        assert_eq!(to_i8(-129), 127);
        assert_eq!(to_motor(257), Motor(1));
    }

    #[test]
    fn narrowing_is_deterministic() {
        for value in [i32::MIN, -129, -128, -1, 0, 127, 128, 255, 256, 65_535, i32::MAX] {
            assert_eq!(to_u8(value), to_u8(value));
            assert_eq!(to_i8(value).to_ne_bytes(), to_i8(value).to_ne_bytes());
            assert_eq!(to_u16(value), to_u16(value));
            assert_eq!(to_u8(value), (value & 0xFF) as u8);
            assert_eq!(to_u16(value), (value & 0xFFFF) as u16);
        }
    }

    #[test]
    fn builders_narrow_every_field() {
        assert_eq!(
            differential_2wheel(5, 30, 1, 2),
            DriveBase::Differential2 {
                wheel_radius_mm: 5,
                wheel_distance_mm: 30,
                left: Motor(1),
                right: Motor(2),
            }
        );
        assert_eq!(
            omni(300, 70_000, 0, 1, 2),
            DriveBase::Omni {
                wheel_radius_mm: 44,
                robot_radius_mm: 4_464,
                left: Motor(0),
                right: Motor(1),
                back: Motor(2),
            }
        );
        assert_eq!(axis_speeds(50, -200, 129), AxisSpeeds::new(50, 56, -127));
        assert_eq!(
            distance(2, -1, 450),
            DistanceTarget {
                x_m: 2,
                y_m: 255,
                omega_deg: 450,
            }
        );
        let sw = limit_switch(1, 1, 0, 260);
        assert_eq!(sw.bounce, 4);
    }
}
