//! # AMCU JNI Bridge
//!
//! Native library behind `com.frc.amcu.AMCUWrapper`, with a pluggable
//! driver architecture. Drivers implement the `AmcuDriver` trait defined in
//! `amcu_common::hal::driver`.
//!
//! # Module Structure
//!
//! - [`bridge`] - `NativeBridge`: driver singleton and listener slots
//! - [`callbacks`] - Listener slots
//! - [`dispatcher`] - Event queue and delivery thread
//! - [`runtime`] - Bridge and dispatcher wired together
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Driver implementations
//! - [`logging`] - Tracing subscriber setup
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                     amcu_bridge (cdylib)                          │
//! │  ┌─────────────┐    ┌──────────────┐    ┌──────────────────────┐  │
//! │  │ JNI entry   │───►│ NativeBridge │◄──►│  Driver Registry     │  │
//! │  │ points      │    │              │    │                      │  │
//! │  └─────────────┘    └──────┬───────┘    └──────────────────────┘  │
//! │         ▲                  │                                      │
//! │         │                  ▼                                      │
//! │  ┌──────┴──────┐   ┌────────────────┐                             │
//! │  │ Dispatcher  │◄──│  AmcuDriver    │ (trait object)              │
//! │  │ (JVM attach)│   │  trait         │                             │
//! │  └─────────────┘   └────────────────┘                             │
//! └───────────────────────────────────────────────────────────────────┘
//! ```

#![deny(warnings)]
#![deny(missing_docs)]

pub mod bridge;
pub mod callbacks;
pub mod dispatcher;
pub mod driver_registry;
pub mod drivers;
pub mod error;
mod jni_bindings;
pub mod logging;
pub mod runtime;

// Re-export key types for convenience
pub use crate::bridge::NativeBridge;
pub use crate::callbacks::CallbackSlot;
pub use crate::dispatcher::EventDispatcher;
pub use crate::driver_registry::DriverRegistry;
pub use crate::error::BridgeError;
pub use crate::jni_bindings::load_config;
pub use crate::runtime::BridgeRuntime;
