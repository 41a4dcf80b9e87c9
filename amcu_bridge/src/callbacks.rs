//! Listener slots for hardware events.
//!
//! A `CallbackSlot` holds at most one listener. The listener type is generic:
//! the JNI layer stores `jni::objects::GlobalRef`, tests and the CLI store
//! plain Rust values. Dropping the stored value is what releases it, so a
//! `GlobalRef` is deleted exactly when the slot (and any in-flight delivery)
//! lets go of it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Holder of at most one event listener.
#[derive(Debug)]
pub struct CallbackSlot<L> {
    name: &'static str,
    listener: Mutex<Option<Arc<L>>>,
}

impl<L> CallbackSlot<L> {
    /// Create an empty slot. `name` is only used for logging.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            listener: Mutex::new(None),
        }
    }

    fn guard(&self) -> MutexGuard<'_, Option<Arc<L>>> {
        self.listener.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the listener; `None` clears the slot.
    ///
    /// The previous listener is released before the new one is stored.
    /// Returns `true` if a previous listener was replaced.
    pub fn register(&self, listener: Option<L>) -> bool {
        let mut slot = self.guard();
        let previous = slot.take();
        let replaced = previous.is_some();
        drop(previous);
        *slot = listener.map(Arc::new);
        debug!(
            slot = self.name,
            registered = slot.is_some(),
            replaced,
            "Listener slot updated"
        );
        replaced
    }

    /// Current listener, if any.
    ///
    /// The returned handle keeps the listener alive after the slot lock is
    /// released, so a concurrent `register` never waits on a delivery.
    pub fn current(&self) -> Option<Arc<L>> {
        self.guard().clone()
    }

    /// Whether a listener is registered.
    pub fn is_registered(&self) -> bool {
        self.guard().is_some()
    }

    /// Remove the listener.
    pub fn clear(&self) -> bool {
        self.register(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counted(Arc<AtomicUsize>);

    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn replace_releases_previous_once() {
        let drops = Arc::new(AtomicUsize::new(0));
        let slot = CallbackSlot::new("test");

        assert!(!slot.register(Some(Counted(Arc::clone(&drops)))));
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        assert!(slot.register(Some(Counted(Arc::clone(&drops)))));
        assert_eq!(drops.load(Ordering::SeqCst), 1);

        assert!(slot.clear());
        assert_eq!(drops.load(Ordering::SeqCst), 2);
        assert!(!slot.clear());
        assert_eq!(drops.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn in_flight_handle_outlives_replacement() {
        let drops = Arc::new(AtomicUsize::new(0));
        let slot = CallbackSlot::new("test");
        slot.register(Some(Counted(Arc::clone(&drops))));

        let held = slot.current().expect("listener registered");
        slot.register(None);
        assert!(!slot.is_registered());
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        drop(held);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_slot_has_no_listener() {
        let slot: CallbackSlot<u32> = CallbackSlot::new("test");
        assert!(slot.current().is_none());
        slot.register(Some(7));
        assert_eq!(slot.current().as_deref(), Some(&7));
    }
}
