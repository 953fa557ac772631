//! Hardware SDK traits
//!
//! Split into two traits, like the vendor API itself:
//! - `HardwareSdk`: process-level calls: enumerate and open
//! - `HardwareDevice`: per-handle configuration and streaming commands
//!
//! Every command returns the SDK's status as a `HwResult`; the controller
//! decides whether a failure is logged or surfaced.

use std::time::Duration;

use crate::domain::{Diagnostics, HwResult, IqPacket, SampleBuffer, StreamFormat};

/// Entry point of a vendor SDK
pub trait HardwareSdk {
    /// Serial numbers of all attached units, in SDK index order
    fn list_serials(&self) -> HwResult<Vec<u32>>;

    /// Open the unit with the given serial number
    fn open(&self, serial: u32) -> HwResult<Box<dyn HardwareDevice>>;
}

/// Commands on one open unit.
/// Only requires `Send` (not `Sync`); callers serialize access.
pub trait HardwareDevice: Send {
    /// Set decimation and IQ filter bandwidth
    fn configure_iq(&mut self, decimation: u32, bandwidth_hz: f64) -> HwResult<()>;

    /// Set IQ center frequency
    fn configure_center(&mut self, frequency_hz: f64) -> HwResult<()>;

    /// Set the RF gain index, or the auto sentinel
    fn configure_gain(&mut self, gain: i32) -> HwResult<()>;

    /// Set reference level and attenuation (or the auto sentinel)
    fn configure_level(&mut self, reference_db: f64, attenuation_db: f64) -> HwResult<()>;

    /// Set both auxiliary port bit patterns
    fn configure_io(&mut self, port1: u32, port2: u32) -> HwResult<()>;

    /// Select the encoding of samples returned by `get_iq`
    fn configure_data_type(&mut self, format: StreamFormat) -> HwResult<()>;

    /// Start (or restart with the current configuration) IQ streaming
    fn initiate_iq(&mut self) -> HwResult<()>;

    /// Stop any active stream. Safe to call when idle.
    fn abort(&mut self) -> HwResult<()>;

    /// Block up to `timeout` filling `buffer` with samples
    fn get_iq(&mut self, buffer: SampleBuffer<'_>, timeout: Duration) -> HwResult<IqPacket>;

    fn firmware_version(&self) -> HwResult<i32>;

    fn diagnostics(&self) -> HwResult<Diagnostics>;

    fn api_version(&self) -> String;

    /// Release the handle
    fn close(&mut self) -> HwResult<()>;
}
