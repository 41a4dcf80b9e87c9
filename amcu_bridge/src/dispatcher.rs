//! Event dispatcher thread.
//!
//! Hardware events may be raised on any thread (a driver's ticker, an
//! interrupt thread of an external C++ driver). Producers hand them to a
//! bounded queue and return immediately; one dedicated thread drains the
//! queue and runs the delivery handler. The handler is built on that thread,
//! so thread-bound state such as a JVM attachment lives exactly as long as
//! the dispatcher.
//!
//! ```text
//!  producer threads          dispatcher thread
//!  ┌──────────────┐  try_send  ┌──────────────┐    ┌────────────┐
//!  │  EventSink   │───────────►│  Receiver    │───►│  handler   │
//!  └──────────────┘  (bounded) └──────────────┘    └────────────┘
//! ```

use amcu_common::hal::driver::EventSink;
use amcu_common::hal::types::DriverEvent;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// Queue entry.
#[derive(Debug)]
enum Envelope {
    Event(DriverEvent),
    Shutdown,
}

/// Bounded event queue plus the thread draining it.
#[derive(Debug)]
pub struct EventDispatcher {
    tx: Sender<Envelope>,
    /// Receiver until `start` hands it to the thread
    rx: Mutex<Option<Receiver<Envelope>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    /// Set when the dispatcher thread stops itself
    stop: Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
}

impl EventDispatcher {
    /// Create the queue with room for `depth` pending events.
    ///
    /// Events can be queued right away; they are delivered once
    /// [`start`](Self::start) runs.
    pub fn new(depth: usize) -> Self {
        let (tx, rx) = bounded(depth.max(1));
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
            handle: Mutex::new(None),
            stop: Arc::new(AtomicBool::new(false)),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Non-blocking producer side of the queue.
    ///
    /// A full queue drops the event with a warning.
    pub fn sink(&self) -> EventSink {
        let tx = self.tx.clone();
        let dropped = Arc::clone(&self.dropped);
        EventSink::new(move |event| match tx.try_send(Envelope::Event(event)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                let total = dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!("Event queue full, dropped {} event ({} total)", event, total);
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("Dispatcher stopped, {} event discarded", event);
            }
        })
    }

    /// Queue one event.
    pub fn notify(&self, event: DriverEvent) {
        self.sink().emit(event);
    }

    /// Spawn the dispatcher thread.
    ///
    /// `setup` runs first on the new thread and returns the handler that is
    /// then called once per event, in queue order. Calling `start` again is a
    /// no-op returning `Ok(false)`.
    ///
    /// # Errors
    /// Returns the OS error if the thread cannot be spawned.
    pub fn start<F, H>(&self, setup: F) -> std::io::Result<bool>
    where
        F: FnOnce() -> H + Send + 'static,
        H: FnMut(DriverEvent),
    {
        let Some(rx) = self.rx.lock().unwrap_or_else(PoisonError::into_inner).take() else {
            return Ok(false);
        };

        let stop = Arc::clone(&self.stop);
        let handle = std::thread::Builder::new()
            .name("amcu-events".to_string())
            .spawn(move || {
                let mut handler = setup();
                debug!("Event dispatcher running");
                for envelope in rx {
                    match envelope {
                        Envelope::Event(event) => handler(event),
                        Envelope::Shutdown => break,
                    }
                    if stop.load(Ordering::Acquire) {
                        break;
                    }
                }
                debug!("Event dispatcher exiting");
            })?;

        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        info!("Event dispatcher started");
        Ok(true)
    }

    /// Whether the dispatcher thread has been started and not yet stopped.
    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Number of events dropped because the queue was full.
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Stop the thread after it has drained the events queued so far.
    ///
    /// Returns immediately if the dispatcher never started. Called from the
    /// dispatcher thread itself it never blocks: the thread exits once the
    /// current handler returns and events still queued are discarded.
    pub fn shutdown(&self) {
        let Some(handle) = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            return;
        };

        if handle.thread().id() == std::thread::current().id() {
            self.stop.store(true, Ordering::Release);
            debug!("Event dispatcher stopping itself");
            return;
        }

        // Blocks only while the queue is full; the dispatcher keeps draining.
        if self.tx.send(Envelope::Shutdown).is_err() {
            debug!("Dispatcher already gone");
        }
        if handle.join().is_err() {
            warn!("Event dispatcher panicked");
        }
        info!("Event dispatcher stopped");
    }
}

impl Drop for EventDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
