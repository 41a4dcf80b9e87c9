//! Simulation driver implementation.
//!
//! The `SimulationDriver` implements the `AmcuDriver` trait on top of a
//! shared [`SimState`]. With a non-zero `cycle_time_us` a background ticker
//! thread advances the model in real time; otherwise the model only moves
//! when [`SimulationDriver::step`] is called.

use super::config::SimulationConfig;
use super::state::SimState;
use amcu_common::hal::driver::{AmcuDriver, DriverError, EventSink};
use amcu_common::hal::types::{
    AxisSpeeds, DistanceTarget, DriveBase, DriverEvent, LimitSwitchConfig, Motor, PidGains,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Background thread stepping the model at a fixed period.
struct Ticker {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    fn spawn(state: Arc<Mutex<SimState>>, events: EventSink, period: Duration) -> Option<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let spawned = std::thread::Builder::new()
            .name("amcu-sim".to_string())
            .spawn(move || {
                debug!("Simulation ticker started ({}us)", period.as_micros());
                let mut last_cycle = Instant::now();
                while flag.load(Ordering::SeqCst) {
                    let cycle_start = Instant::now();
                    let dt = cycle_start.duration_since(last_cycle);
                    last_cycle = cycle_start;

                    let event = lock(&state).step(dt);
                    if let Some(event) = event {
                        events.emit(event);
                    }

                    let elapsed = cycle_start.elapsed();
                    if elapsed < period {
                        std::thread::sleep(period - elapsed);
                    }
                }
                debug!("Simulation ticker stopped");
            });

        match spawned {
            Ok(handle) => Some(Self {
                running,
                handle: Some(handle),
            }),
            Err(e) => {
                warn!("Failed to start simulation ticker: {}", e);
                None
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Simulation ticker panicked");
            }
        }
    }
}

fn lock(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Simulation driver implementing the AmcuDriver trait.
pub struct SimulationDriver {
    state: Arc<Mutex<SimState>>,
    events: EventSink,
    ticker: Option<Ticker>,
}

impl SimulationDriver {
    /// Create a simulation driver reporting events to `events`.
    ///
    /// Starts the background ticker when `config.cycle_time()` is set.
    pub fn new(config: SimulationConfig, events: EventSink) -> Self {
        let period = config.cycle_time();
        let state = Arc::new(Mutex::new(SimState::new(config)));
        let ticker =
            period.and_then(|p| Ticker::spawn(Arc::clone(&state), events.clone(), p));
        Self {
            state,
            events,
            ticker,
        }
    }

    /// Whether a background ticker is running.
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Advance the model by `dt`, publishing any completed drive action.
    pub fn step(&self, dt: Duration) {
        let event = lock(&self.state).step(dt);
        self.publish(event);
    }

    /// Emit outside the state lock.
    fn publish(&self, event: Option<DriverEvent>) {
        if let Some(event) = event {
            self.events.emit(event);
        }
    }
}

impl AmcuDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn configure(&mut self, base: &DriveBase) -> Result<(), DriverError> {
        lock(&self.state).configure(*base)?;
        info!("Simulation configured for {} drive", base.topology());
        Ok(())
    }

    fn set_pid(&mut self, gains: PidGains) -> Result<(), DriverError> {
        lock(&self.state).set_pid(gains);
        debug!("PID gains set: {:?}", gains);
        Ok(())
    }

    fn set_limit_switch(
        &mut self,
        motor: Motor,
        config: LimitSwitchConfig,
    ) -> Result<(), DriverError> {
        lock(&self.state).set_limit_switch(motor, config)
    }

    fn set_rpm(&mut self, motor: Motor, rpm: i8) -> Result<(), DriverError> {
        lock(&self.state).set_rpm(motor, rpm)
    }

    fn set_speed(&mut self, motor: Motor, percent: i8) -> Result<(), DriverError> {
        lock(&self.state).set_speed(motor, percent)
    }

    fn reset_encoder(&mut self, motor: Motor) -> Result<(), DriverError> {
        lock(&self.state).reset_encoder(motor)
    }

    fn stop(&mut self) -> Result<(), DriverError> {
        lock(&self.state).stop();
        Ok(())
    }

    fn encoder(&mut self, motor: Motor) -> Result<i16, DriverError> {
        lock(&self.state).encoder(motor)
    }

    fn rpm(&mut self, motor: Motor) -> Result<i32, DriverError> {
        lock(&self.state).rpm(motor)
    }

    fn speed_drive(&mut self, speeds: AxisSpeeds) -> Result<(), DriverError> {
        lock(&self.state).speed_drive(speeds)
    }

    fn time_drive(&mut self, speeds: AxisSpeeds, time_s: u8) -> Result<(), DriverError> {
        let event = lock(&self.state).time_drive(speeds, time_s)?;
        self.publish(event);
        Ok(())
    }

    fn drive_distance(&mut self, target: DistanceTarget) -> Result<(), DriverError> {
        let event = lock(&self.state).drive_distance(target)?;
        self.publish(event);
        Ok(())
    }

    /// Motors without a switch input return `DriverError::Unsupported`.
    fn set_switch_input(&mut self, motor: Motor, level: bool) -> Result<(), DriverError> {
        let event = lock(&self.state).set_switch_input(motor, level)?;
        self.publish(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{Receiver, unbounded};

    fn recording_driver(config: SimulationConfig) -> (SimulationDriver, Receiver<DriverEvent>) {
        let (tx, rx) = unbounded();
        let sink = EventSink::new(move |event| {
            let _ = tx.send(event);
        });
        (SimulationDriver::new(config, sink), rx)
    }

    fn diff2() -> DriveBase {
        DriveBase::Differential2 {
            wheel_radius_mm: 5,
            wheel_distance_mm: 30,
            left: Motor(1),
            right: Motor(2),
        }
    }

    #[test]
    fn manual_driver_has_no_ticker() {
        let (driver, _rx) = recording_driver(SimulationConfig::manual());
        assert!(!driver.is_ticking());
        assert_eq!(driver.name(), "simulation");
    }

    #[test]
    fn time_drive_event_published_on_step() {
        let (mut driver, rx) = recording_driver(SimulationConfig::manual());
        driver.configure(&diff2()).unwrap();
        driver.time_drive(AxisSpeeds::new(10, 0, 0), 1).unwrap();
        assert!(rx.try_recv().is_err());

        for _ in 0..10 {
            driver.step(Duration::from_millis(100));
        }
        assert_eq!(rx.try_recv(), Ok(DriverEvent::DriveAction));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn zero_time_drive_publishes_immediately() {
        let (mut driver, rx) = recording_driver(SimulationConfig::manual());
        driver.configure(&diff2()).unwrap();
        driver.time_drive(AxisSpeeds::new(10, 0, 0), 0).unwrap();
        assert_eq!(rx.try_recv(), Ok(DriverEvent::DriveAction));
    }

    #[test]
    fn switch_input_publishes_limit_event() {
        let (mut driver, rx) = recording_driver(SimulationConfig::manual());
        driver
            .set_limit_switch(
                Motor(0),
                LimitSwitchConfig {
                    high: 1,
                    enable: 1,
                    mode: 0,
                    bounce: 0,
                },
            )
            .unwrap();
        driver.set_switch_input(Motor(0), true).unwrap();
        assert_eq!(rx.try_recv(), Ok(DriverEvent::LimitSwitch));
        assert!(driver.set_switch_input(Motor(1), true).is_err());
    }

    #[test]
    fn ticker_advances_model() {
        let config = SimulationConfig {
            cycle_time_us: 1_000,
            ..SimulationConfig::default()
        };
        let (mut driver, rx) = recording_driver(config);
        assert!(driver.is_ticking());
        driver.configure(&diff2()).unwrap();
        driver.set_speed(Motor(1), 100).unwrap();
        driver.time_drive(AxisSpeeds::new(5, 0, 0), 1).unwrap();

        let event = rx.recv_timeout(Duration::from_secs(5));
        assert_eq!(event, Ok(DriverEvent::DriveAction));
        assert!(driver.encoder(Motor(1)).unwrap() != 0);
        drop(driver);
    }
}
