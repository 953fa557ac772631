//! Port traits (interfaces)
//!
//! These traits define the boundary between the device controller and the
//! vendor SDK. Adapters implement them for real hardware and for simulation.

pub mod hardware;

pub use hardware::*;
