//! JNI entry points for `com.frc.amcu.AMCUWrapper`.
//!
//! One process-wide [`BridgeRuntime`] is created in `JNI_OnLoad`. Entry
//! points narrow their `jint` arguments, call the bridge and collapse any
//! error to the silent default Java expects (nothing, or zero). Nothing is
//! ever thrown into Java.
//!
//! Listener methods run on the dispatcher thread, which attaches to the JVM
//! once and detaches when the library is unloaded.

#![allow(non_snake_case)]

use amcu_common::config::{BridgeConfig, ConfigError};
use amcu_common::consts::{CONFIG_ENV_VAR, LISTENER_METHOD_SIGNATURE};
use amcu_common::hal::narrow;
use amcu_common::hal::types::{DriverEvent, PidGains};
use jni::objects::{GlobalRef, JClass, JObject};
use jni::sys::{JNI_ERR, JNI_FALSE, JNI_TRUE, JNI_VERSION_1_6, jboolean, jfloat, jint, jshort};
use jni::{JNIEnv, JavaVM};
use std::ffi::c_void;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, trace, warn};

use crate::bridge::NativeBridge;
use crate::driver_registry::DriverRegistry;
use crate::error::BridgeError;
use crate::logging::init_tracing;
use crate::runtime::BridgeRuntime;

struct JniRuntime {
    vm: JavaVM,
    runtime: BridgeRuntime<GlobalRef>,
}

static RUNTIME: OnceLock<JniRuntime> = OnceLock::new();

/// Load the bridge configuration from `path`.
///
/// No path or a missing file yields defaults; an unreadable or invalid file
/// is logged and also yields defaults.
pub fn load_config(path: Option<&Path>) -> BridgeConfig {
    let Some(path) = path else {
        return BridgeConfig::default();
    };
    match BridgeConfig::load_validated(path) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound) => {
            debug!("No bridge config at {}, using defaults", path.display());
            BridgeConfig::default()
        }
        Err(e) => {
            warn!("Ignoring bridge config {}: {}", path.display(), e);
            BridgeConfig::default()
        }
    }
}

/// Collapse a bridge result to the value Java sees.
fn or_default<T: Default>(op: &'static str, result: Result<T, BridgeError>) -> T {
    match result {
        Ok(value) => value,
        Err(BridgeError::NotInitialized) => {
            trace!(op = op, "Driver not initialized, ignored");
            T::default()
        }
        Err(e) => {
            warn!(op = op, "{}", e);
            T::default()
        }
    }
}

/// Run `f` against the loaded bridge, defaulting when the library was never
/// initialized through `JNI_OnLoad`.
fn with_bridge<T: Default>(
    op: &'static str,
    f: impl FnOnce(&NativeBridge<GlobalRef>) -> Result<T, BridgeError>,
) -> T {
    match RUNTIME.get() {
        Some(rt) => or_default(op, f(rt.runtime.bridge())),
        None => {
            trace!(op = op, "Bridge not loaded, ignored");
            T::default()
        }
    }
}

/// Call the listener's no-argument event method.
///
/// A missing method or a Java exception is cleared and ignored.
fn invoke_listener(env: &mut JNIEnv, listener: &GlobalRef, event: DriverEvent) {
    let method = event.listener_method();
    let result = env.with_local_frame(4, |env| -> jni::errors::Result<()> {
        env.call_method(listener, method, LISTENER_METHOD_SIGNATURE, &[])?;
        Ok(())
    });
    if let Err(e) = result {
        if env.exception_check().unwrap_or(false) {
            let _ = env.exception_clear();
        }
        debug!("Listener {}{} failed: {}", method, LISTENER_METHOD_SIGNATURE, e);
    }
}

/// Library load hook: configure logging, create the bridge, start the
/// dispatcher thread.
#[unsafe(no_mangle)]
pub extern "system" fn JNI_OnLoad(raw_vm: *mut jni::sys::JavaVM, _reserved: *mut c_void) -> jint {
    // SAFETY: the JVM passes a valid, process-lifetime JavaVM pointer.
    let vm = match unsafe { JavaVM::from_raw(raw_vm) } {
        Ok(vm) => vm,
        Err(_) => return JNI_ERR,
    };

    let path = std::env::var_os(CONFIG_ENV_VAR);
    let config = load_config(path.as_deref().map(Path::new));
    init_tracing(config.shared.log_level.into(), config.bridge.json_logs);

    let rt = RUNTIME.get_or_init(|| JniRuntime {
        vm,
        runtime: BridgeRuntime::new(DriverRegistry::with_builtin_drivers(), &config),
    });

    let vm: &'static JavaVM = &rt.vm;
    let started = rt.runtime.start(move || {
        let mut attached = match vm.attach_current_thread() {
            Ok(guard) => Some(guard),
            Err(e) => {
                warn!("Dispatcher could not attach to the JVM: {}", e);
                None
            }
        };
        move |listener: &GlobalRef, event: DriverEvent| {
            if let Some(env) = attached.as_deref_mut() {
                invoke_listener(env, listener, event);
            }
        }
    });
    if let Err(e) = started {
        warn!("Listener delivery disabled: {}", e);
    }

    info!(
        "{} loaded (driver '{}')",
        config.shared.service_name, config.bridge.driver
    );
    JNI_VERSION_1_6
}

/// Library unload hook: release the driver and listeners, stop the
/// dispatcher (detaching its thread).
#[unsafe(no_mangle)]
pub extern "system" fn JNI_OnUnload(_raw_vm: *mut jni::sys::JavaVM, _reserved: *mut c_void) {
    if let Some(rt) = RUNTIME.get() {
        rt.runtime.shutdown();
        info!("Bridge unloaded");
    }
}

/// External drivers call this when a limit switch triggers.
#[unsafe(no_mangle)]
pub extern "C" fn notifyLimitSwitchTriggered() {
    if let Some(rt) = RUNTIME.get() {
        rt.runtime.notify(DriverEvent::LimitSwitch);
    }
}

/// External drivers call this when a bounded drive action completes.
#[unsafe(no_mangle)]
pub extern "C" fn notifyDriveAction() {
    if let Some(rt) = RUNTIME.get() {
        rt.runtime.notify(DriverEvent::DriveAction);
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_initOmniDriveBaseNative(
    _env: JNIEnv,
    _class: JClass,
    wheel_radius: jint,
    robot_radius: jint,
    motor_left: jint,
    motor_right: jint,
    motor_back: jint,
) {
    let base = narrow::omni(wheel_radius, robot_radius, motor_left, motor_right, motor_back);
    with_bridge("initOmniDriveBase", |b| b.init_drive_base(base));
}

#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_initMecanumDriveBaseNative(
    _env: JNIEnv,
    _class: JClass,
    wheel_radius: jint,
    robot_x: jint,
    robot_y: jint,
    motor_front_left: jint,
    motor_front_right: jint,
    motor_back_left: jint,
    motor_back_right: jint,
) {
    let base = narrow::mecanum(
        wheel_radius,
        robot_x,
        robot_y,
        motor_front_left,
        motor_front_right,
        motor_back_left,
        motor_back_right,
    );
    with_bridge("initMecanumDriveBase", |b| b.init_drive_base(base));
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_initDifferentialDriveBase2WheelNative(
    _env: JNIEnv,
    _class: JClass,
    wheel_radius: jint,
    wheel_distance: jint,
    motor_left: jint,
    motor_right: jint,
) {
    let base = narrow::differential_2wheel(wheel_radius, wheel_distance, motor_left, motor_right);
    with_bridge("initDifferentialDriveBase2Wheel", |b| b.init_drive_base(base));
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_initDifferentialDriveBase4WheelNative(
    _env: JNIEnv,
    _class: JClass,
    wheel_radius: jint,
    wheel_distance: jint,
    motor_front_left: jint,
    motor_front_right: jint,
    motor_back_left: jint,
    motor_back_right: jint,
) {
    let base = narrow::differential_4wheel(
        wheel_radius,
        wheel_distance,
        motor_front_left,
        motor_front_right,
        motor_back_left,
        motor_back_right,
    );
    with_bridge("initDifferentialDriveBase4Wheel", |b| b.init_drive_base(base));
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_setPIDNative(
    _env: JNIEnv,
    _class: JClass,
    kp: jfloat,
    ki: jfloat,
    kd: jfloat,
) {
    with_bridge("setPID", |b| b.set_pid(PidGains { kp, ki, kd }));
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_setLimitSwitchesNative(
    _env: JNIEnv,
    _class: JClass,
    motor: jint,
    high: jint,
    enable: jint,
    mode: jint,
    bounce: jint,
) {
    let config = narrow::limit_switch(high, enable, mode, bounce);
    with_bridge("setLimitSwitches", |b| {
        b.set_limit_switch(narrow::to_motor(motor), config)
    });
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_setRPMNative(
    _env: JNIEnv,
    _class: JClass,
    motor: jint,
    rpm: jint,
) {
    with_bridge("setRPM", |b| {
        b.set_rpm(narrow::to_motor(motor), narrow::to_i8(rpm))
    });
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_setSpeedNative(
    _env: JNIEnv,
    _class: JClass,
    motor: jint,
    percent: jint,
) {
    with_bridge("setSpeed", |b| {
        b.set_speed(narrow::to_motor(motor), narrow::to_i8(percent))
    });
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_resetEncoderNative(
    _env: JNIEnv,
    _class: JClass,
    motor: jint,
) {
    with_bridge("resetEncoder", |b| b.reset_encoder(narrow::to_motor(motor)));
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_stopNative(_env: JNIEnv, _class: JClass) {
    with_bridge("stop", |b| b.stop());
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_getEncoderNative(
    _env: JNIEnv,
    _class: JClass,
    motor: jint,
) -> jshort {
    with_bridge("getEncoder", |b| b.encoder(narrow::to_motor(motor)))
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_getRPMNative(
    _env: JNIEnv,
    _class: JClass,
    motor: jint,
) -> jint {
    with_bridge("getRPM", |b| b.rpm(narrow::to_motor(motor)))
}

/// Store a global reference to `callback` (or clear the slot for null).
fn register_callback(env: &mut JNIEnv, event: DriverEvent, callback: &JObject) {
    let listener = if callback.is_null() {
        None
    } else {
        match env.new_global_ref(callback) {
            Ok(global) => Some(global),
            Err(e) => {
                warn!("Could not reference {} listener: {}", event, e);
                None
            }
        }
    };
    with_bridge("registerCallback", |b| {
        b.register_listener(event, listener);
        Ok(())
    });
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_registerLimitSwitchCallbackNative(
    mut env: JNIEnv,
    _class: JClass,
    callback: JObject,
) {
    register_callback(&mut env, DriverEvent::LimitSwitch, &callback);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_registerDriveActionCallbackNative(
    mut env: JNIEnv,
    _class: JClass,
    callback: JObject,
) {
    register_callback(&mut env, DriverEvent::DriveAction, &callback);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_speedDriveNative(
    _env: JNIEnv,
    _class: JClass,
    x_speed: jint,
    y_speed: jint,
    w_speed: jint,
) {
    let speeds = narrow::axis_speeds(x_speed, y_speed, w_speed);
    with_bridge("speedDrive", |b| b.speed_drive(speeds));
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_timeDriveNative(
    _env: JNIEnv,
    _class: JClass,
    x_speed: jint,
    y_speed: jint,
    w_speed: jint,
    time_s: jint,
) {
    let speeds = narrow::axis_speeds(x_speed, y_speed, w_speed);
    with_bridge("timeDrive", |b| b.time_drive(speeds, narrow::to_u8(time_s)));
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_driveDistanceNative(
    _env: JNIEnv,
    _class: JClass,
    x_meter: jint,
    y_meter: jint,
    omega_degree: jint,
) {
    let target = narrow::distance(x_meter, y_meter, omega_degree);
    with_bridge("driveDistance", |b| b.drive_distance(target));
}

/// Whether a topology initializer has constructed the driver.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_isInitializedNative(
    _env: JNIEnv,
    _class: JClass,
) -> jboolean {
    let initialized = RUNTIME
        .get()
        .is_some_and(|rt| rt.runtime.bridge().is_initialized());
    if initialized { JNI_TRUE } else { JNI_FALSE }
}

/// Stop and release the driver and both listeners.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_frc_amcu_AMCUWrapper_shutdownNative(_env: JNIEnv, _class: JClass) {
    with_bridge("shutdown", |b| {
        b.shutdown();
        Ok(())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_path_or_file_yields_defaults() {
        assert_eq!(load_config(None).bridge.driver, "simulation");
        let config = load_config(Some(Path::new("/nonexistent/amcu.toml")));
        assert_eq!(config.bridge.event_queue_depth, 32);
    }

    #[test]
    fn valid_file_is_used() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[bridge]\nevent_queue_depth = 4\njson_logs = true").unwrap();
        let config = load_config(Some(file.path()));
        assert_eq!(config.bridge.event_queue_depth, 4);
        assert!(config.bridge.json_logs);
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[bridge]\nevent_queue_depth = 0").unwrap();
        assert_eq!(load_config(Some(file.path())).bridge.event_queue_depth, 32);

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[bridge\n").unwrap();
        assert_eq!(load_config(Some(file.path())).bridge.driver, "simulation");
    }

    #[test]
    fn errors_collapse_to_defaults() {
        assert_eq!(or_default::<i16>("getEncoder", Err(BridgeError::NotInitialized)), 0);
        let err = BridgeError::Driver(amcu_common::hal::driver::DriverError::NotConfigured);
        assert_eq!(or_default::<i32>("getRPM", Err(err)), 0);
        assert_eq!(or_default("getRPM", Ok(42)), 42);
    }

    #[test]
    fn entry_points_are_silent_without_load() {
        assert_eq!(with_bridge("getEncoder", |b| b.encoder(narrow::to_motor(1))), 0);
        notifyDriveAction();
        notifyLimitSwitchTriggered();
    }
}
