//! AMCU Common Library
//!
//! Shared types, narrowing rules, the driver trait and configuration loading
//! used by the AMCU JNI bridge and its drivers.
//!
//! # Module Structure
//!
//! - [`hal`] - Driver trait, errors, motor/topology types and narrowing rules
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Workspace-wide limits and names
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use amcu_common::prelude::*;
//!
//! let base = DriveBase::Differential2 {
//!     wheel_radius_mm: 5,
//!     wheel_distance_mm: 30,
//!     left: Motor(1),
//!     right: Motor(2),
//! };
//! assert_eq!(base.motors().len(), 2);
//! ```

pub mod config;
pub mod consts;
pub mod hal;
pub mod prelude;
