//! Bridge error type.

use amcu_common::config::ConfigError;
use amcu_common::hal::driver::DriverError;
use thiserror::Error;

/// Outcome of a failed bridge operation.
///
/// Internally every operation reports one of these; the JNI layer collapses
/// them to the silent default Java expects.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No topology initializer has constructed the driver yet
    #[error("Driver not initialized")]
    NotInitialized,

    /// The driver rejected the operation
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Bridge configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The event dispatcher thread could not be started
    #[error("Failed to start event dispatcher: {0}")]
    Dispatcher(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether this is the "driver not yet constructed" case.
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, BridgeError::NotInitialized)
    }
}
