//! Implementations of the hardware ports

#[cfg(feature = "bb-api")]
pub mod bb_api;
pub mod simulated;

#[cfg(feature = "bb-api")]
pub use bb_api::BbApi;
pub use simulated::{SimulatedDevice, SimulatedSdk};
