//! Signal Hound BB60C driver
//!
//! Adapts the BB60C real-time spectrum analyzer to a generic SDR device
//! interface: enumerate, configure, stream.
//!
//! ## Architecture (Hexagonal / Ports & Adapters)
//!
//! - `domain/` - Pure domain types, tables, errors, and saved profiles
//! - `ports/` - Trait definitions for the vendor SDK
//! - `adapters/` - Implementations of ports (simulator, vendor `libbb_api`)
//! - `device/` - The configuration and streaming controller
//! - `registry` - Discovery and factory entry points for SDR hosts
//! - `state` - Sharing one device between threads

// Core domain (pure, no I/O)
pub mod domain;
pub mod ports;

// Adapters (external I/O)
pub mod adapters;

pub mod device;
pub mod registry;
pub mod state;

pub use device::Bb60Device;
pub use domain::{Bb60Error, Bb60Result};
pub use registry::{construct, probe, DRIVER_KEY};
