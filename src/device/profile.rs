//! Applying saved profiles

use crate::domain::{Bb60Result, DeviceProfile};

use super::Bb60Device;

impl Bb60Device {
    /// Apply a profile through the regular setters.
    ///
    /// The profile's apply policy takes effect first, so a strict profile
    /// fails on the first rejected hardware command.
    pub fn apply_profile(&mut self, profile: &DeviceProfile) -> Bb60Result<()> {
        log::info!("Applying profile '{}'", profile.name);
        self.set_apply_policy(profile.policy);

        self.set_frequency(profile.frequency_hz)?;
        if let Some(rate) = profile.sample_rate_hz {
            self.set_sample_rate(rate);
        }
        if let Some(bandwidth) = profile.bandwidth_hz {
            self.set_bandwidth(bandwidth);
        }

        self.state.rf_gain = profile.rf_gain;
        self.state.attenuation_db = profile.attenuation_db;
        self.state.reference_level_db = profile.reference_level_db;
        self.set_gain_mode(profile.gain_mode)?;

        self.write_setting("port1", &profile.port1)?;
        self.write_setting("port2", &profile.port2)
    }

    /// Snapshot the current configuration as a profile
    pub fn to_profile(&self, name: &str) -> DeviceProfile {
        let port = |key: &str| self.read_setting(key).unwrap_or_default();
        DeviceProfile {
            name: name.to_string(),
            frequency_hz: self.state.center_frequency_hz,
            sample_rate_hz: (self.state.requested_sample_rate_hz > 0.0)
                .then_some(self.state.requested_sample_rate_hz),
            bandwidth_hz: Some(self.state.bandwidth_hz),
            gain_mode: self.state.gain_mode,
            rf_gain: self.state.rf_gain,
            attenuation_db: self.state.attenuation_db,
            reference_level_db: self.state.reference_level_db,
            port1: port("port1"),
            port2: port("port2"),
            policy: self.policy,
        }
    }
}
