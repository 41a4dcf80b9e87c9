//! # AMCU Simulation CLI
//!
//! Drives the bridge in-process against the configured driver (the
//! simulation driver by default), without a JVM. Listener callbacks are
//! delivered on the dispatcher thread exactly as they would be to Java.
//!
//! # Usage
//!
//! ```bash
//! # Differential drive scenario: init, set speed, read encoder
//! amcu_sim scenario
//!
//! # Timed drive, waiting for the drive-action callback
//! amcu_sim timed-drive --x 10 --seconds 2
//!
//! # Trip the limit switch of motor 2, waiting for the limit-switch callback
//! amcu_sim limit-switch --motor 2
//!
//! # Custom configuration, verbose JSON logs
//! amcu_sim --config amcu.toml -v --json scenario
//! ```

#![deny(warnings)]

use amcu_common::hal::narrow;
use amcu_common::hal::types::{DriverEvent, Motor};
use amcu_jni::{BridgeRuntime, DriverRegistry, load_config, logging::init_tracing};
use clap::{Parser, Subcommand};
use crossbeam_channel::{Sender, unbounded};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, error, info};

/// AMCU bridge simulator
#[derive(Parser, Debug)]
#[command(name = "amcu_sim")]
#[command(version)]
#[command(about = "Exercise the AMCU bridge against a simulated motor controller")]
#[command(long_about = None)]
struct Args {
    /// Path to bridge configuration (amcu.toml). Defaults apply if absent.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Init a 2-wheel differential base, set motor speed, read the encoder
    Scenario {
        /// Speed of the left motor [%]
        #[arg(long, default_value_t = 50, allow_hyphen_values = true)]
        percent: i32,

        /// How long to let the motor run before the second reading [ms]
        #[arg(long, default_value_t = 1000)]
        run_ms: u64,
    },
    /// Run a timed drive and wait for the drive-action callback
    ///
    /// Requires a driver that advances on its own (simulation with a
    /// non-zero cycle_time_us).
    TimedDrive {
        /// Forward speed [cm/s]
        #[arg(long, default_value_t = 10, allow_hyphen_values = true)]
        x: i32,

        /// Strafe speed [cm/s]
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        y: i32,

        /// Rotation speed [deg/s]
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        w: i32,

        /// Drive duration [s]
        #[arg(long, default_value_t = 2)]
        seconds: i32,

        /// Give up waiting for the callback after this many seconds
        #[arg(long, default_value_t = 10)]
        timeout_s: u64,
    },
    /// Trip a simulated limit switch and wait for the limit-switch callback
    ///
    /// Runs on a 3-wheel omni base (motors 0, 2 and 3 carry switches).
    LimitSwitch {
        /// Motor whose switch is tripped
        #[arg(long, default_value_t = 0)]
        motor: i32,

        /// Active level: 0 = low, 1 = high
        #[arg(long, default_value_t = 1)]
        high: i32,

        /// Switch wiring: 0 = normally open, 1 = normally closed
        #[arg(long, default_value_t = 0)]
        mode: i32,

        /// Give up waiting for the callback after this many seconds
        #[arg(long, default_value_t = 2)]
        timeout_s: u64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("amcu_sim failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing
    setup_tracing(&args);

    info!("AMCU simulator v{} starting...", env!("CARGO_PKG_VERSION"));
    let config = load_config(args.config.as_deref());

    let runtime: BridgeRuntime<Sender<DriverEvent>> =
        BridgeRuntime::new(DriverRegistry::with_builtin_drivers(), &config);
    runtime.start(|| {
        |listener: &Sender<DriverEvent>, event: DriverEvent| {
            info!("Listener {} fired", event.listener_method());
            let _ = listener.send(event);
        }
    })?;

    let result = match args.command {
        Command::Scenario { percent, run_ms } => scenario(&runtime, percent, run_ms),
        Command::TimedDrive {
            x,
            y,
            w,
            seconds,
            timeout_s,
        } => timed_drive(&runtime, (x, y, w), seconds, timeout_s),
        Command::LimitSwitch {
            motor,
            high,
            mode,
            timeout_s,
        } => limit_switch(&runtime, motor, (high, mode), timeout_s),
    };

    runtime.shutdown();
    info!("AMCU simulator shutdown complete");
    result
}

/// Differential-2 base (radius 5, distance 30, motors 1 and 2), then
/// `set_speed(1, percent)` and encoder readings before and after running.
fn scenario(
    runtime: &BridgeRuntime<Sender<DriverEvent>>,
    percent: i32,
    run_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let bridge = runtime.bridge();
    let left = Motor(1);

    bridge.init_drive_base(narrow::differential_2wheel(5, 30, 1, 2))?;
    bridge.set_speed(left, narrow::to_i8(percent))?;
    let before = bridge.encoder(left)?;
    println!("encoder({left}) before rotation: {before}");

    std::thread::sleep(Duration::from_millis(run_ms));
    println!(
        "encoder({left}) after {run_ms} ms: {}, rpm: {}",
        bridge.encoder(left)?,
        bridge.rpm(left)?
    );
    bridge.stop()?;
    Ok(())
}

fn timed_drive(
    runtime: &BridgeRuntime<Sender<DriverEvent>>,
    (x, y, w): (i32, i32, i32),
    seconds: i32,
    timeout_s: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let bridge = runtime.bridge();
    let (tx, rx) = unbounded();
    bridge.register_listener(DriverEvent::DriveAction, Some(tx));

    bridge.init_drive_base(narrow::differential_2wheel(5, 30, 1, 2))?;
    bridge.time_drive(narrow::axis_speeds(x, y, w), narrow::to_u8(seconds))?;
    info!("Timed drive started, waiting for completion");

    let event = rx.recv_timeout(Duration::from_secs(timeout_s))?;
    println!(
        "{event} received, encoders: {} / {}",
        bridge.encoder(Motor(1))?,
        bridge.encoder(Motor(2))?
    );
    Ok(())
}

/// Enable the switch, run the motor, then drive the input to its active level.
fn limit_switch(
    runtime: &BridgeRuntime<Sender<DriverEvent>>,
    motor: i32,
    (high, mode): (i32, i32),
    timeout_s: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let bridge = runtime.bridge();
    let motor = narrow::to_motor(motor);
    let (tx, rx) = unbounded();
    bridge.register_listener(DriverEvent::LimitSwitch, Some(tx));

    bridge.init_drive_base(narrow::omni(30, 150, 0, 2, 3))?;
    bridge.set_limit_switch(motor, narrow::limit_switch(high, 1, mode, 0))?;
    bridge.set_speed(motor, 50)?;

    // Electrical level that reads as active for this wiring.
    let level = (high != 0) != (mode != 0);
    bridge.set_switch_input(motor, level)?;
    info!("Switch input of {} driven {}", motor, if level { "high" } else { "low" });

    let event = rx.recv_timeout(Duration::from_secs(timeout_s))?;
    println!("{event} received, rpm({motor}): {}", bridge.rpm(motor)?);
    bridge.stop()?;
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(level, args.json);
}
