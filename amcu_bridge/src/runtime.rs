//! Bridge plus event dispatcher, wired together.
//!
//! `BridgeRuntime` is what a host (the JNI library, the CLI, tests) holds:
//! the driver reports events into the dispatcher queue, and the dispatcher
//! thread hands each event to the listener registered in the bridge.

use amcu_common::config::BridgeConfig;
use amcu_common::hal::types::DriverEvent;
use std::sync::Arc;
use tracing::info;

use crate::bridge::NativeBridge;
use crate::dispatcher::EventDispatcher;
use crate::driver_registry::DriverRegistry;
use crate::error::BridgeError;

/// A [`NativeBridge`] whose events are delivered on a dispatcher thread.
pub struct BridgeRuntime<L> {
    bridge: Arc<NativeBridge<L>>,
    dispatcher: EventDispatcher,
}

impl<L: Send + Sync + 'static> BridgeRuntime<L> {
    /// Create the runtime. No thread runs until [`start`](Self::start).
    pub fn new(registry: DriverRegistry, config: &BridgeConfig) -> Self {
        let dispatcher = EventDispatcher::new(config.bridge.event_queue_depth);
        let bridge = Arc::new(NativeBridge::new(registry, config, dispatcher.sink()));
        info!(
            "Bridge runtime created (driver '{}', queue depth {})",
            config.bridge.driver, config.bridge.event_queue_depth
        );
        Self { bridge, dispatcher }
    }

    /// The bridge operations.
    pub fn bridge(&self) -> &NativeBridge<L> {
        &self.bridge
    }

    /// Start delivering events.
    ///
    /// `setup` runs once on the dispatcher thread and returns the function
    /// that invokes a listener. It is only called for events whose slot holds
    /// a listener. Returns `Ok(false)` if already started.
    ///
    /// # Errors
    /// Returns `BridgeError::Dispatcher` if the thread cannot be spawned.
    pub fn start<F, H>(&self, setup: F) -> Result<bool, BridgeError>
    where
        F: FnOnce() -> H + Send + 'static,
        H: FnMut(&L, DriverEvent),
    {
        let bridge = Arc::clone(&self.bridge);
        let started = self.dispatcher.start(move || {
            let mut invoke = setup();
            move |event: DriverEvent| {
                bridge.deliver(event, |listener| invoke(listener, event));
            }
        })?;
        Ok(started)
    }

    /// Queue an event raised outside the driver's own sink.
    pub fn notify(&self, event: DriverEvent) {
        self.dispatcher.notify(event);
    }

    /// Events dropped because the queue was full.
    pub fn dropped_events(&self) -> u64 {
        self.dispatcher.dropped_events()
    }

    /// Release the driver and listeners, then stop the dispatcher.
    pub fn shutdown(&self) {
        self.bridge.shutdown();
        self.dispatcher.shutdown();
    }
}
