//! Inverse kinematics for the supported drive bases.
//!
//! Converts a body velocity into per-wheel speeds. Conventions: x forward,
//! y to the left, rotation counter-clockwise. Geometry is in millimetres.

use amcu_common::consts::MOTOR_COUNT;
use amcu_common::hal::types::{AxisSpeeds, DriveBase, Motor};
use std::f32::consts::{FRAC_PI_3, PI};

/// Body velocity of the robot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyVelocity {
    /// Forward [mm/s]
    pub vx_mm_s: f32,
    /// Left [mm/s]
    pub vy_mm_s: f32,
    /// Counter-clockwise [rad/s]
    pub omega_rad_s: f32,
}

impl BodyVelocity {
    /// Convert boundary speeds (cm/s, cm/s, deg/s).
    pub fn from_axis_speeds(speeds: AxisSpeeds) -> Self {
        Self {
            vx_mm_s: f32::from(speeds.x) * 10.0,
            vy_mm_s: f32::from(speeds.y) * 10.0,
            omega_rad_s: f32::from(speeds.w).to_radians(),
        }
    }

    /// Whether every component is zero.
    pub fn is_zero(&self) -> bool {
        self.vx_mm_s == 0.0 && self.vy_mm_s == 0.0 && self.omega_rad_s == 0.0
    }
}

/// Wheel surface speeds [mm/s] in `DriveBase::motors()` order.
fn wheel_speeds(base: &DriveBase, body: BodyVelocity) -> heapless::Vec<f32, MOTOR_COUNT> {
    let BodyVelocity {
        vx_mm_s: vx,
        vy_mm_s: vy,
        omega_rad_s: omega,
    } = body;

    match *base {
        DriveBase::Omni {
            robot_radius_mm, ..
        } => {
            // Wheels sit at +60° (left), -60° (right) and 180° (back).
            let turn = f32::from(robot_radius_mm) * omega;
            let (sin, cos) = FRAC_PI_3.sin_cos();
            [
                -sin * vx + cos * vy + turn,
                sin * vx + cos * vy + turn,
                -vy + turn,
            ]
            .into_iter()
            .collect()
        }
        DriveBase::Mecanum {
            robot_x_mm,
            robot_y_mm,
            ..
        } => {
            let turn = (f32::from(robot_x_mm) + f32::from(robot_y_mm)) / 2.0 * omega;
            [vx - vy - turn, vx + vy + turn, vx + vy - turn, vx - vy + turn]
                .into_iter()
                .collect()
        }
        DriveBase::Differential2 {
            wheel_distance_mm, ..
        } => {
            let turn = f32::from(wheel_distance_mm) / 2.0 * omega;
            [vx - turn, vx + turn].into_iter().collect()
        }
        DriveBase::Differential4 {
            wheel_distance_mm, ..
        } => {
            let turn = f32::from(wheel_distance_mm) / 2.0 * omega;
            [vx - turn, vx + turn, vx - turn, vx + turn]
                .into_iter()
                .collect()
        }
    }
}

/// Per-motor target speeds [rpm] for a body velocity.
///
/// If any wheel would exceed `max_rpm`, all wheels are scaled down by the
/// same factor so the motion direction is preserved. A zero wheel radius
/// yields zero speeds.
pub fn wheel_rpm(
    base: &DriveBase,
    body: BodyVelocity,
    max_rpm: f32,
) -> heapless::Vec<(Motor, f32), MOTOR_COUNT> {
    let radius = f32::from(base.wheel_radius_mm());
    let to_rpm = if radius > 0.0 {
        60.0 / (2.0 * PI * radius)
    } else {
        0.0
    };

    let rpms: heapless::Vec<f32, MOTOR_COUNT> = wheel_speeds(base, body)
        .iter()
        .map(|v| v * to_rpm)
        .collect();
    let peak = rpms.iter().fold(0.0_f32, |acc, r| acc.max(r.abs()));
    let scale = if peak > max_rpm { max_rpm / peak } else { 1.0 };

    base.motors()
        .into_iter()
        .zip(rpms)
        .map(|(motor, rpm)| (motor, rpm * scale))
        .collect()
}
