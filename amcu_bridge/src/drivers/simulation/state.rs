//! Simulated AMCU board state.
//!
//! `SimState` holds everything the simulated board knows: the configured
//! drive base, PID gains, four motors, limit switches and the running body
//! motion. It is advanced explicitly with [`SimState::step`]; operations that
//! complete a drive action or trip a limit switch return the resulting
//! [`DriverEvent`] for the caller to publish.

use amcu_common::consts::{MAX_PERCENT, MOTOR_COUNT};
use amcu_common::hal::driver::DriverError;
use amcu_common::hal::types::{
    AxisSpeeds, DistanceTarget, DriveBase, DriverEvent, LimitSwitchConfig, Motor, PidGains,
};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::config::SimulationConfig;
use super::kinematics::{BodyVelocity, wheel_rpm};
use super::motor::{MotorCommand, MotorSimulator};

/// Limit-switch input of one motor.
#[derive(Debug, Clone, Copy, Default)]
struct LimitSwitch {
    config: LimitSwitchConfig,
    /// Effective (polarity-corrected) state of the input
    active: bool,
    /// Simulation time of the last accepted trigger
    last_trigger: Option<Duration>,
}

/// Whole-robot motion in progress.
#[derive(Debug, Clone, Copy)]
struct BodyMotion {
    /// Remaining time, `None` for open-ended speed drives
    remaining: Option<Duration>,
}

/// State of the simulated board.
#[derive(Debug, Clone)]
pub struct SimState {
    config: SimulationConfig,
    base: Option<DriveBase>,
    gains: PidGains,
    motors: [MotorSimulator; MOTOR_COUNT],
    switches: [LimitSwitch; MOTOR_COUNT],
    motion: Option<BodyMotion>,
    /// Simulation time since creation
    clock: Duration,
}

/// Array index of a motor or `InvalidMotor`.
fn slot(motor: Motor) -> Result<usize, DriverError> {
    motor.index().ok_or(DriverError::InvalidMotor(motor))
}

impl SimState {
    /// Create a board with every motor at rest and no drive base.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            base: None,
            gains: PidGains::default(),
            motors: Default::default(),
            switches: [LimitSwitch::default(); MOTOR_COUNT],
            motion: None,
            clock: Duration::ZERO,
        }
    }

    /// Simulation settings.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Configured drive base.
    pub fn drive_base(&self) -> Option<&DriveBase> {
        self.base.as_ref()
    }

    /// Current PID gains.
    pub fn gains(&self) -> PidGains {
        self.gains
    }

    /// Whether a body motion is running.
    pub fn motion_active(&self) -> bool {
        self.motion.is_some()
    }

    /// Simulation time.
    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Command currently applied to a motor.
    pub fn motor_command(&self, motor: Motor) -> Result<MotorCommand, DriverError> {
        Ok(self.motors[slot(motor)?].command())
    }

    /// Configure the drive base. Any motion is stopped first.
    pub fn configure(&mut self, base: DriveBase) -> Result<(), DriverError> {
        for motor in base.motors() {
            slot(motor)?;
        }
        if self.base.is_some() {
            info!("Reconfiguring drive base as {}", base.topology());
        }
        self.halt_all();
        self.base = Some(base);
        debug!("Drive base configured: {:?}", base);
        Ok(())
    }

    /// Set PID gains for all motors.
    pub fn set_pid(&mut self, gains: PidGains) {
        self.gains = gains;
    }

    /// Configure one motor's limit switch.
    pub fn set_limit_switch(
        &mut self,
        motor: Motor,
        config: LimitSwitchConfig,
    ) -> Result<(), DriverError> {
        let idx = slot(motor)?;
        if !motor.has_limit_switch() {
            return Err(DriverError::Unsupported(format!(
                "{motor} has no limit switch input"
            )));
        }
        let switch = &mut self.switches[idx];
        switch.config = config;
        switch.active = false;
        switch.last_trigger = None;
        Ok(())
    }

    /// Closed-loop target for one motor.
    pub fn set_rpm(&mut self, motor: Motor, rpm: i8) -> Result<(), DriverError> {
        let idx = slot(motor)?;
        self.cancel_motion_using(motor);
        self.motors[idx].set_command(MotorCommand::Velocity(f32::from(rpm)));
        Ok(())
    }

    /// Open-loop duty for one motor.
    pub fn set_speed(&mut self, motor: Motor, percent: i8) -> Result<(), DriverError> {
        let idx = slot(motor)?;
        self.cancel_motion_using(motor);
        let duty = f32::from(percent) / f32::from(MAX_PERCENT);
        self.motors[idx].set_command(MotorCommand::Duty(duty));
        Ok(())
    }

    /// Zero one encoder.
    pub fn reset_encoder(&mut self, motor: Motor) -> Result<(), DriverError> {
        self.motors[slot(motor)?].reset_encoder();
        Ok(())
    }

    /// Encoder count of one motor.
    pub fn encoder(&self, motor: Motor) -> Result<i16, DriverError> {
        Ok(self.motors[slot(motor)?].encoder())
    }

    /// Speed of one motor, rounded to whole rpm.
    pub fn rpm(&self, motor: Motor) -> Result<i32, DriverError> {
        Ok(self.motors[slot(motor)?].rpm().round() as i32)
    }

    /// Stop every motor and cancel any motion.
    pub fn stop(&mut self) {
        self.halt_all();
    }

    /// Open-ended body motion.
    pub fn speed_drive(&mut self, speeds: AxisSpeeds) -> Result<(), DriverError> {
        self.start_motion(BodyVelocity::from_axis_speeds(speeds), None)
    }

    /// Body motion for `time_s` seconds.
    ///
    /// A zero duration completes at once and returns the drive-action event.
    pub fn time_drive(
        &mut self,
        speeds: AxisSpeeds,
        time_s: u8,
    ) -> Result<Option<DriverEvent>, DriverError> {
        if time_s == 0 {
            self.require_base()?;
            self.finish_motion();
            return Ok(Some(DriverEvent::DriveAction));
        }
        self.start_motion(
            BodyVelocity::from_axis_speeds(speeds),
            Some(Duration::from_secs(u64::from(time_s))),
        )?;
        Ok(None)
    }

    /// Body motion covering `target` at cruise speed.
    ///
    /// All axes finish together: the slowest axis sets the duration and the
    /// others are slowed to match. A zero target completes at once.
    pub fn drive_distance(
        &mut self,
        target: DistanceTarget,
    ) -> Result<Option<DriverEvent>, DriverError> {
        self.require_base()?;

        let x_mm = f32::from(target.x_m) * 1000.0;
        let y_mm = f32::from(target.y_m) * 1000.0;
        let omega_deg = f32::from(target.omega_deg);

        let cruise_mm_s = self.config.cruise_speed_cms * 10.0;
        let duration_s = (x_mm / cruise_mm_s)
            .max(y_mm / cruise_mm_s)
            .max(omega_deg / self.config.cruise_turn_degs);

        if duration_s <= 0.0 {
            self.finish_motion();
            return Ok(Some(DriverEvent::DriveAction));
        }

        let body = BodyVelocity {
            vx_mm_s: x_mm / duration_s,
            vy_mm_s: y_mm / duration_s,
            omega_rad_s: omega_deg.to_radians() / duration_s,
        };
        let duration = Duration::try_from_secs_f32(duration_s).map_err(|_| {
            DriverError::Unsupported(format!(
                "distance drive would take {duration_s}s at the configured cruise speed"
            ))
        })?;
        debug!("Distance drive {:?} over {:.2}s", target, duration_s);
        self.start_motion(body, Some(duration))?;
        Ok(None)
    }

    /// Set the raw electrical level of a limit-switch input.
    ///
    /// The input is active when `level XOR normally_closed == active_high`.
    /// An enabled switch going active stops its motor, cancels a body motion
    /// that uses the motor and returns the limit-switch event, unless the
    /// previous trigger lies within the debounce window.
    pub fn set_switch_input(
        &mut self,
        motor: Motor,
        level: bool,
    ) -> Result<Option<DriverEvent>, DriverError> {
        let idx = slot(motor)?;
        if !motor.has_limit_switch() {
            return Err(DriverError::Unsupported(format!(
                "{motor} has no limit switch input"
            )));
        }

        let clock = self.clock;
        let window = Duration::from_millis(
            u64::from(self.switches[idx].config.bounce) * u64::from(self.config.debounce_unit_ms),
        );
        let switch = &mut self.switches[idx];
        let active = (level ^ switch.config.normally_closed()) == switch.config.active_high();
        let rising = active && !switch.active;
        switch.active = active;

        if !rising || !switch.config.is_enabled() {
            return Ok(None);
        }
        if let Some(last) = switch.last_trigger {
            if clock.saturating_sub(last) < window {
                debug!("{motor} limit switch bounce ignored");
                return Ok(None);
            }
        }
        switch.last_trigger = Some(clock);

        warn!("{motor} limit switch triggered");
        self.cancel_motion_using(motor);
        self.motors[idx].halt();
        Ok(Some(DriverEvent::LimitSwitch))
    }

    /// Advance the simulation by `dt`.
    ///
    /// Returns the drive-action event when a bounded motion finishes.
    pub fn step(&mut self, dt: Duration) -> Option<DriverEvent> {
        self.clock += dt;
        let dt_s = dt.as_secs_f32();
        for motor in &mut self.motors {
            motor.update(dt_s, &self.gains, &self.config);
        }

        let motion = self.motion.as_mut()?;
        let remaining = motion.remaining.as_mut()?;
        *remaining = remaining.saturating_sub(dt);
        if remaining.is_zero() {
            info!("Drive action complete");
            self.finish_motion();
            return Some(DriverEvent::DriveAction);
        }
        None
    }

    fn require_base(&self) -> Result<DriveBase, DriverError> {
        self.base.ok_or(DriverError::NotConfigured)
    }

    fn start_motion(
        &mut self,
        body: BodyVelocity,
        duration: Option<Duration>,
    ) -> Result<(), DriverError> {
        let base = self.require_base()?;
        for (motor, rpm) in wheel_rpm(&base, body, self.config.max_rpm) {
            self.motors[slot(motor)?].set_command(MotorCommand::Velocity(rpm));
        }
        self.motion = Some(BodyMotion {
            remaining: duration,
        });
        Ok(())
    }

    /// End the body motion and let the base motors coast.
    fn finish_motion(&mut self) {
        self.motion = None;
        if let Some(base) = self.base {
            for motor in base.motors() {
                if let Some(idx) = motor.index() {
                    self.motors[idx].set_command(MotorCommand::Idle);
                }
            }
        }
    }

    /// A per-motor command on a base motor ends the body motion.
    fn cancel_motion_using(&mut self, motor: Motor) {
        let uses_motor = self
            .base
            .is_some_and(|base| base.motors().contains(&motor));
        if self.motion.is_some() && uses_motor {
            debug!("{motor} command overrides running body motion");
            self.finish_motion();
        }
    }

    fn halt_all(&mut self) {
        self.motion = None;
        for motor in &mut self.motors {
            motor.halt();
        }
    }
}
