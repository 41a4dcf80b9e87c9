//! Motor physics simulator.
//!
//! Each `MotorSimulator` models one DC motor with encoder:
//! - Open-loop duty command (`set_speed`)
//! - Closed-loop velocity command (`set_rpm` and body motions), PID trim on
//!   top of a feed-forward duty
//! - First-order response towards the commanded speed
//! - 16-bit wrapping encoder counter

use amcu_common::hal::types::PidGains;
use tracing::trace;

use super::config::SimulationConfig;

/// Command currently applied to a motor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MotorCommand {
    /// No drive; the motor coasts down.
    #[default]
    Idle,
    /// Open-loop duty, -1.0 ..= 1.0.
    Duty(f32),
    /// Closed-loop target speed [rpm].
    Velocity(f32),
}

/// PID accumulator state, reset whenever the command mode changes.
#[derive(Debug, Clone, Copy, Default)]
struct PidState {
    integral: f32,
    prev_error: f32,
}

/// One PID cycle on a normalized speed error, output in duty units.
///
/// Zero Ki disables integral; zero Kd disables derivative. The integral is
/// clamped to the duty range.
fn pid_compute(state: &mut PidState, gains: &PidGains, error: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }

    let p_term = gains.kp * error;

    let i_term = if gains.ki != 0.0 {
        state.integral = (state.integral + gains.ki * error * dt).clamp(-1.0, 1.0);
        state.integral
    } else {
        state.integral = 0.0;
        0.0
    };

    let d_term = if gains.kd != 0.0 {
        gains.kd * (error - state.prev_error) / dt
    } else {
        0.0
    };

    state.prev_error = error;
    p_term + i_term + d_term
}

/// Simulated motor with encoder.
#[derive(Debug, Clone, Default)]
pub struct MotorSimulator {
    command: MotorCommand,
    /// Current speed [rpm]
    rpm: f32,
    /// Encoder position [counts], unwrapped
    position: f64,
    pid: PidState,
}

impl MotorSimulator {
    /// Create a motor at rest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current command.
    pub fn command(&self) -> MotorCommand {
        self.command
    }

    /// Apply a new command. Switching mode resets the PID state.
    pub fn set_command(&mut self, command: MotorCommand) {
        if std::mem::discriminant(&command) != std::mem::discriminant(&self.command) {
            self.pid = PidState::default();
        }
        self.command = command;
    }

    /// Stop immediately: no command, zero speed.
    pub fn halt(&mut self) {
        self.command = MotorCommand::Idle;
        self.rpm = 0.0;
        self.pid = PidState::default();
    }

    /// Current speed [rpm].
    pub fn rpm(&self) -> f32 {
        self.rpm
    }

    /// Encoder reading, wrapping like a 16-bit hardware counter.
    pub fn encoder(&self) -> i16 {
        (self.position as i64) as i16
    }

    /// Zero the encoder.
    pub fn reset_encoder(&mut self) {
        self.position = 0.0;
    }

    /// Advance the model by `dt_s` seconds.
    pub fn update(&mut self, dt_s: f32, gains: &PidGains, config: &SimulationConfig) {
        if dt_s <= 0.0 {
            return;
        }

        let duty = match self.command {
            MotorCommand::Idle => 0.0,
            MotorCommand::Duty(duty) => duty,
            MotorCommand::Velocity(target) => {
                let error = (target - self.rpm) / config.max_rpm;
                let trim = pid_compute(&mut self.pid, gains, error, dt_s);
                target / config.max_rpm + trim
            }
        }
        .clamp(-1.0, 1.0);

        let target_rpm = duty * config.max_rpm;
        let tau = config.time_constant_s();
        let alpha = if tau > 0.0 { dt_s / (tau + dt_s) } else { 1.0 };
        self.rpm += alpha * (target_rpm - self.rpm);

        self.position +=
            f64::from(self.rpm) / 60.0 * f64::from(config.counts_per_rev) * f64::from(dt_s);
        trace!(rpm = self.rpm, position = self.position, "motor update");
    }
}
