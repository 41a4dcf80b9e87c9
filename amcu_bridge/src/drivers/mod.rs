//! AMCU driver implementations.
//!
//! This module contains all built-in driver implementations:
//!
//! - [`simulation`] - Software AMCU for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `AmcuDriver` trait from `amcu_common::hal::driver`
//! 3. Register the factory in [`register_all_drivers`]

pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register all built-in drivers.
pub fn register_all_drivers(registry: &mut DriverRegistry) {
    registry.register("simulation", simulation::create_driver);
}
