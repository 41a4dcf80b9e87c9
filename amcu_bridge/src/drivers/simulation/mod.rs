//! Simulation driver module.
//!
//! A software AMCU for development and testing without physical hardware:
//! motor dynamics, drive-base kinematics, encoders and limit switches.

mod config;
mod driver;
mod kinematics;
mod motor;
mod state;

pub use config::SimulationConfig;
pub use driver::SimulationDriver;
pub use kinematics::{BodyVelocity, wheel_rpm};
pub use motor::{MotorCommand, MotorSimulator};
pub use state::SimState;

use amcu_common::hal::driver::{AmcuDriver, DriverContext, DriverError};
use tracing::info;

/// Factory function to create a simulation driver instance.
pub fn create_driver(ctx: DriverContext) -> Result<Box<dyn AmcuDriver>, DriverError> {
    let config: SimulationConfig = ctx.settings()?;
    config.validate()?;
    info!(
        "Creating simulation driver (cycle {} us, max {} rpm)",
        config.cycle_time_us, config.max_rpm
    );
    Ok(Box::new(SimulationDriver::new(config, ctx.events)))
}
