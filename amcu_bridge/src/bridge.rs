//! The `NativeBridge` core.
//!
//! Owns the single AMCU driver instance and the two listener slots. Every
//! operation reports a [`BridgeError`]; turning errors into the silent
//! defaults Java expects is left to the JNI layer.
//!
//! # Driver lifecycle
//!
//! ```text
//!   (absent) ──init_drive_base──► (constructed) ──init_drive_base──► reconfigured
//!       ▲                              │
//!       └────────── shutdown ──────────┘
//! ```

use amcu_common::config::BridgeConfig;
use amcu_common::hal::driver::{AmcuDriver, DriverContext, DriverError, EventSink};
use amcu_common::hal::types::{
    AxisSpeeds, DistanceTarget, DriveBase, DriverEvent, LimitSwitchConfig, Motor, PidGains,
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::callbacks::CallbackSlot;
use crate::driver_registry::DriverRegistry;
use crate::error::BridgeError;

/// Driver singleton plus listener slots.
///
/// `L` is the listener handle type: `jni::objects::GlobalRef` behind the JNI
/// entry points, any owned value elsewhere.
pub struct NativeBridge<L> {
    registry: DriverRegistry,
    driver_name: String,
    driver_settings: toml::Table,
    events: EventSink,
    driver: Mutex<Option<Box<dyn AmcuDriver>>>,
    limit_switch: CallbackSlot<L>,
    drive_action: CallbackSlot<L>,
}

impl<L> NativeBridge<L> {
    /// Create a bridge without a driver.
    ///
    /// The driver named by `config.bridge.driver` is built from `registry` on
    /// the first topology initializer and reports events to `events`.
    pub fn new(registry: DriverRegistry, config: &BridgeConfig, events: EventSink) -> Self {
        Self {
            registry,
            driver_name: config.bridge.driver.clone(),
            driver_settings: config.driver_settings(),
            events,
            driver: Mutex::new(None),
            limit_switch: CallbackSlot::new("limit-switch"),
            drive_action: CallbackSlot::new("drive-action"),
        }
    }

    fn lock_driver(&self) -> MutexGuard<'_, Option<Box<dyn AmcuDriver>>> {
        self.driver.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the driver, or fail with `NotInitialized`.
    pub fn with_driver<T>(
        &self,
        f: impl FnOnce(&mut dyn AmcuDriver) -> Result<T, DriverError>,
    ) -> Result<T, BridgeError> {
        let mut guard = self.lock_driver();
        let driver = guard.as_deref_mut().ok_or(BridgeError::NotInitialized)?;
        Ok(f(driver)?)
    }

    /// Construct the driver if absent, then configure the drive base.
    ///
    /// Later calls reconfigure the same driver instance.
    ///
    /// # Errors
    /// Returns `BridgeError::Driver` if the driver cannot be built or
    /// rejects the configuration. A failed build leaves the bridge
    /// uninitialized.
    pub fn init_drive_base(&self, base: DriveBase) -> Result<(), BridgeError> {
        let mut guard = self.lock_driver();
        if guard.is_none() {
            let ctx = DriverContext::new(self.driver_settings.clone(), self.events.clone());
            let driver = self.registry.create_driver(&self.driver_name, ctx)?;
            info!(
                "Driver '{}' v{} constructed",
                driver.name(),
                driver.version()
            );
            *guard = Some(driver);
        }

        let driver = guard.as_deref_mut().ok_or(BridgeError::NotInitialized)?;
        debug!("Configuring {} drive base", base.topology());
        driver.configure(&base)?;
        Ok(())
    }

    /// Set PID gains.
    pub fn set_pid(&self, gains: PidGains) -> Result<(), BridgeError> {
        self.with_driver(|d| d.set_pid(gains))
    }

    /// Configure one motor's limit switch.
    pub fn set_limit_switch(
        &self,
        motor: Motor,
        config: LimitSwitchConfig,
    ) -> Result<(), BridgeError> {
        self.with_driver(|d| d.set_limit_switch(motor, config))
    }

    /// Closed-loop target for one motor.
    pub fn set_rpm(&self, motor: Motor, rpm: i8) -> Result<(), BridgeError> {
        self.with_driver(|d| d.set_rpm(motor, rpm))
    }

    /// Open-loop speed for one motor.
    pub fn set_speed(&self, motor: Motor, percent: i8) -> Result<(), BridgeError> {
        self.with_driver(|d| d.set_speed(motor, percent))
    }

    /// Zero one motor's encoder.
    pub fn reset_encoder(&self, motor: Motor) -> Result<(), BridgeError> {
        self.with_driver(|d| d.reset_encoder(motor))
    }

    /// Drive a limit-switch input, for backends that simulate one.
    pub fn set_switch_input(&self, motor: Motor, level: bool) -> Result<(), BridgeError> {
        self.with_driver(|d| d.set_switch_input(motor, level))
    }

    /// Stop every motor.
    pub fn stop(&self) -> Result<(), BridgeError> {
        self.with_driver(|d| d.stop())
    }

    /// Encoder count of one motor.
    pub fn encoder(&self, motor: Motor) -> Result<i16, BridgeError> {
        self.with_driver(|d| d.encoder(motor))
    }

    /// Speed of one motor [rpm].
    pub fn rpm(&self, motor: Motor) -> Result<i32, BridgeError> {
        self.with_driver(|d| d.rpm(motor))
    }

    /// Open-ended body motion.
    pub fn speed_drive(&self, speeds: AxisSpeeds) -> Result<(), BridgeError> {
        self.with_driver(|d| d.speed_drive(speeds))
    }

    /// Time-bounded body motion.
    pub fn time_drive(&self, speeds: AxisSpeeds, time_s: u8) -> Result<(), BridgeError> {
        self.with_driver(|d| d.time_drive(speeds, time_s))
    }

    /// Distance-bounded body motion.
    pub fn drive_distance(&self, target: DistanceTarget) -> Result<(), BridgeError> {
        self.with_driver(|d| d.drive_distance(target))
    }

    /// Whether a topology initializer has constructed the driver.
    pub fn is_initialized(&self) -> bool {
        self.lock_driver().is_some()
    }

    /// Name of the constructed driver.
    pub fn driver_name(&self) -> Option<&'static str> {
        self.lock_driver().as_ref().map(|d| d.name())
    }

    fn slot(&self, event: DriverEvent) -> &CallbackSlot<L> {
        match event {
            DriverEvent::LimitSwitch => &self.limit_switch,
            DriverEvent::DriveAction => &self.drive_action,
        }
    }

    /// Register or clear (`None`) the listener for `event`.
    ///
    /// Returns `true` if a previously registered listener was released.
    pub fn register_listener(&self, event: DriverEvent, listener: Option<L>) -> bool {
        self.slot(event).register(listener)
    }

    /// Whether a listener is registered for `event`.
    pub fn has_listener(&self, event: DriverEvent) -> bool {
        self.slot(event).is_registered()
    }

    /// Hand the listener for `event` to `invoke`.
    ///
    /// The slot lock is not held while `invoke` runs. Returns `false`
    /// without calling `invoke` when no listener is registered.
    pub fn deliver(&self, event: DriverEvent, invoke: impl FnOnce(&L)) -> bool {
        let Some(listener) = self.slot(event).current() else {
            debug!("No {} listener registered", event);
            return false;
        };
        invoke(&listener);
        true
    }

    /// Stop and drop the driver and clear both listener slots.
    ///
    /// The next topology initializer constructs a fresh driver.
    pub fn shutdown(&self) {
        let driver = self.lock_driver().take();
        if let Some(mut driver) = driver {
            if let Err(e) = driver.stop() {
                warn!("Failed to stop driver on shutdown: {}", e);
            }
            info!("Driver '{}' released", driver.name());
        }
        self.limit_switch.clear();
        self.drive_action.clear();
    }
}
