//! Hardware abstraction for the AMCU motor controller.
//!
//! - [`driver`] - `AmcuDriver` trait, `DriverError`, event sink and factory types
//! - [`types`] - Motor ids, drive-base topologies, gains and motion commands
//! - [`narrow`] - Conversions from 32-bit boundary integers to driver widths

pub mod driver;
pub mod narrow;
pub mod types;
