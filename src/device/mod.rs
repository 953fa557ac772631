//! BB60C configuration and streaming controller
//!
//! `Bb60Device` owns the open hardware handle and the [`DeviceState`] that
//! describes it. Every parameter change goes through a setter here, which
//! records the request and then pushes whatever hardware commands the
//! change implies:
//!
//! - frequency and gain changes are pushed immediately and, while
//!   streaming, re-initiate the stream so they take effect without a stop
//! - sample rate and bandwidth are only recorded; they reach the hardware
//!   when the stream is activated
//! - auxiliary port changes are pushed immediately but refused while
//!   streaming
//!
//! Hardware command failures after open are logged with the SDK's text and
//! otherwise ignored, leaving the requested value in the state. This keeps
//! continuous monitoring running through transient rejections, at the cost
//! that the state can disagree with the device. Set
//! [`ApplyPolicy::Strict`] to have setters return the failure instead.

mod gain;
mod open;
mod profile;
mod sensors;
mod settings;
mod state;
mod stream;
mod tuning;

pub use open::DeviceSelector;
pub use sensors::Sensor;
pub use state::DeviceState;
pub use stream::RxStream;

use crate::domain::tables::MASTER_CLOCK_HZ;
use crate::domain::{
    ApplyPolicy, Bb60Result, DecimationTable, Direction, HardwareInfo, HwResult, PortTable,
};
use crate::ports::HardwareDevice;

/// Driver and hardware key reported to SDR hosts
pub const HARDWARE_KEY: &str = "BB60";

/// An open BB60C
pub struct Bb60Device {
    hw: Box<dyn HardwareDevice>,
    device_id: usize,
    serial: u32,
    state: DeviceState,
    decimation_table: DecimationTable,
    port1_table: PortTable,
    port2_table: PortTable,
    policy: ApplyPolicy,
}

impl Bb60Device {
    /// Wrap an already-open handle. State starts at the power-on defaults
    /// and nothing is pushed to the hardware.
    pub fn from_hardware(hw: Box<dyn HardwareDevice>, device_id: usize, serial: u32) -> Self {
        Self {
            hw,
            device_id,
            serial,
            state: DeviceState::default(),
            decimation_table: DecimationTable::bb60c(),
            port1_table: PortTable::port1(),
            port2_table: PortTable::port2(),
            policy: ApplyPolicy::default(),
        }
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn device_id(&self) -> usize {
        self.device_id
    }

    pub fn serial(&self) -> u32 {
        self.serial
    }

    pub fn apply_policy(&self) -> ApplyPolicy {
        self.policy
    }

    pub fn set_apply_policy(&mut self, policy: ApplyPolicy) {
        self.policy = policy;
    }

    pub fn driver_key(&self) -> &'static str {
        HARDWARE_KEY
    }

    pub fn hardware_key(&self) -> &'static str {
        HARDWARE_KEY
    }

    pub fn master_clock_rate(&self) -> f64 {
        MASTER_CLOCK_HZ
    }

    pub fn decimation_table(&self) -> &DecimationTable {
        &self.decimation_table
    }

    pub fn num_channels(&self, direction: Direction) -> usize {
        match direction {
            Direction::Rx => 1,
            Direction::Tx => 0,
        }
    }

    pub fn list_antennas(&self) -> Vec<&'static str> {
        vec!["RX"]
    }

    pub fn antenna(&self) -> &'static str {
        "RX"
    }

    /// Identification plus live firmware and diagnostics readback
    pub fn hardware_info(&self) -> HardwareInfo {
        let firmware = self
            .hw
            .firmware_version()
            .map_err(|e| log::warn!("GetFirmwareVersion: {e}"))
            .ok();
        let diagnostics = self
            .hw
            .diagnostics()
            .map_err(|e| log::warn!("GetDeviceDiagnostics: {e}"))
            .ok();
        HardwareInfo {
            device_id: self.device_id,
            serial: self.serial,
            api_version: self.hw.api_version(),
            firmware,
            diagnostics,
        }
    }

    /// Log a failed hardware command; surface it only under the strict policy.
    fn check(&self, op: &str, result: HwResult<()>) -> Bb60Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                log::error!("{op}: {e}");
                match self.policy {
                    ApplyPolicy::BestEffort => Ok(()),
                    ApplyPolicy::Strict => Err(e.into()),
                }
            }
        }
    }
}

/// Closing always aborts first so the handle is never left streaming.
impl Drop for Bb60Device {
    fn drop(&mut self) {
        if let Err(e) = self.hw.abort() {
            log::debug!("Abort on close failed: {e}");
        }
        self.state.stream_active = false;
        if let Err(e) = self.hw.close() {
            log::warn!("CloseDevice: {e}");
        }
        log::debug!("BB60 {} (S/N {}) closed", self.device_id, self.serial);
    }
}
