//! Per-device configuration state

use serde::Serialize;

use crate::domain::tables::MASTER_CLOCK_HZ;
use crate::domain::GainMode;

/// Everything the controller has been asked to configure.
///
/// Updated optimistically: a value is recorded even when the hardware
/// rejected the command that carried it, so this may diverge from what the
/// device is actually doing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceState {
    pub center_frequency_hz: f64,
    /// Last requested rate, 0 when never set
    pub requested_sample_rate_hz: f64,
    /// Always a key of the decimation table
    pub decimation: u32,
    /// Bandwidth ceiling; the effective bandwidth is clamped by the table
    pub bandwidth_hz: f64,
    pub gain_mode: GainMode,
    pub rf_gain: i32,
    pub attenuation_db: f64,
    pub reference_level_db: f64,
    pub stream_active: bool,
    pub port1: u32,
    pub port2: u32,
    /// Packets flagged with sample loss since open
    pub overruns: u64,
}

impl Default for DeviceState {
    fn default() -> Self {
        let decimation = 1;
        Self {
            center_frequency_hz: 100e6,
            requested_sample_rate_hz: 0.0,
            decimation,
            bandwidth_hz: MASTER_CLOCK_HZ / decimation as f64,
            gain_mode: GainMode::ReferenceLevel,
            rf_gain: 0,
            attenuation_db: 0.0,
            reference_level_db: -30.0,
            stream_active: false,
            port1: 0,
            port2: 0,
            overruns: 0,
        }
    }
}
