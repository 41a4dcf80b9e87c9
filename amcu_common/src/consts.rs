//! System-wide constants for the AMCU workspace.
//!
//! Single source of truth for motor limits, boundary names and default
//! settings. Imported by all crates.

use static_assertions::const_assert;

/// Number of motor slots on the AMCU board.
pub const MOTOR_COUNT: usize = 4;

/// Motors wired to a limit-switch interrupt. Motor 1 has none.
pub const LIMIT_SWITCH_MOTORS: [u8; 3] = [0, 2, 3];

/// Largest magnitude accepted for percentage commands.
pub const MAX_PERCENT: i8 = 100;

/// Driver constructed when the configuration names none.
pub const DEFAULT_DRIVER: &str = "simulation";

/// Default service name used for logging.
pub const DEFAULT_SERVICE_NAME: &str = "amcu-bridge";

/// Default capacity of the driver-event queue.
pub const DEFAULT_EVENT_QUEUE_DEPTH: usize = 32;

/// Environment variable holding the bridge configuration path.
pub const CONFIG_ENV_VAR: &str = "AMCU_BRIDGE_CONFIG";

/// JNI signature of both listener trigger methods.
pub const LISTENER_METHOD_SIGNATURE: &str = "()V";

/// Listener method invoked on limit-switch events.
pub const LIMIT_SWITCH_METHOD: &str = "onLimitSwitchTriggered";

/// Listener method invoked on drive-action events.
pub const DRIVE_ACTION_METHOD: &str = "onDriveAction";

const_assert!(MOTOR_COUNT <= u8::MAX as usize);
const_assert!(LIMIT_SWITCH_MOTORS.len() < MOTOR_COUNT);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_switch_motors_are_valid_slots() {
        for id in LIMIT_SWITCH_MOTORS {
            assert!((id as usize) < MOTOR_COUNT);
        }
        assert!(!LIMIT_SWITCH_MOTORS.contains(&1));
    }

    #[test]
    fn listener_signature_takes_no_arguments() {
        assert_eq!(LISTENER_METHOD_SIGNATURE, "()V");
        assert_ne!(LIMIT_SWITCH_METHOD, DRIVE_ACTION_METHOD);
    }
}
