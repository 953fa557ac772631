//! Gain surface: manual (RF index + attenuator) vs reference level

use crate::domain::tables::{
    AUTO_ATTENUATION, AUTO_GAIN, MAX_ATTENUATION_DB, MAX_REFERENCE_LEVEL_DB, MAX_RF_GAIN,
    MIN_REFERENCE_LEVEL_DB,
};
use crate::domain::{Bb60Result, GainControl, GainMode, Range};

use super::Bb60Device;

fn control(name: Option<&str>) -> Bb60Result<GainControl> {
    name.map_or(Ok(GainControl::Ref), str::parse::<GainControl>)
}

impl Bb60Device {
    pub fn list_gains(&self) -> Vec<&'static str> {
        GainControl::ALL.iter().map(GainControl::name).collect()
    }

    pub fn gain_range(&self, name: &str) -> Bb60Result<Range> {
        Ok(match name.parse::<GainControl>()? {
            GainControl::Rf => Range::new(0.0, MAX_RF_GAIN as f64),
            GainControl::Att => Range::new(-MAX_ATTENUATION_DB, 0.0),
            GainControl::Ref => Range::new(MIN_REFERENCE_LEVEL_DB, MAX_REFERENCE_LEVEL_DB),
        })
    }

    /// Set one gain control; `None` means `REF`.
    ///
    /// `RF` and `ATT` switch to manual mode, `REF` to reference-level mode.
    /// The value is kept in its own field either way, so switching back
    /// restores it.
    pub fn set_gain(&mut self, name: Option<&str>, value: f64) -> Bb60Result<()> {
        let control = control(name)?;
        match control {
            GainControl::Rf => self.state.rf_gain = value as i32,
            GainControl::Att => self.state.attenuation_db = value,
            GainControl::Ref => self.state.reference_level_db = value,
        }
        self.set_gain_mode(control.mode())
    }

    /// Read a gain control as it is in effect. The controls of the inactive
    /// mode read as the bottom of their range; `None` reads `REF` in
    /// reference mode and `RF` in manual mode.
    pub fn gain(&self, name: Option<&str>) -> Bb60Result<f64> {
        let mode = self.state.gain_mode;
        let control = match name {
            Some(name) => name.parse()?,
            None if mode == GainMode::ReferenceLevel => GainControl::Ref,
            None => GainControl::Rf,
        };
        Ok(match (control, mode) {
            (GainControl::Rf, GainMode::Manual) => self.state.rf_gain as f64,
            (GainControl::Rf, GainMode::ReferenceLevel) => 0.0,
            (GainControl::Att, GainMode::Manual) => self.state.attenuation_db,
            (GainControl::Att, GainMode::ReferenceLevel) => -MAX_ATTENUATION_DB,
            (GainControl::Ref, GainMode::ReferenceLevel) => self.state.reference_level_db,
            (GainControl::Ref, GainMode::Manual) => MIN_REFERENCE_LEVEL_DB,
        })
    }

    pub fn gain_mode(&self) -> GainMode {
        self.state.gain_mode
    }

    /// Switch strategy and push the gain stages for it
    pub fn set_gain_mode(&mut self, mode: GainMode) -> Bb60Result<()> {
        self.state.gain_mode = mode;
        self.apply_gain_mode()
    }

    fn apply_gain_mode(&mut self) -> Bb60Result<()> {
        let (gain, attenuation) = match self.state.gain_mode {
            GainMode::Manual => (self.state.rf_gain, -self.state.attenuation_db),
            GainMode::ReferenceLevel => (AUTO_GAIN, AUTO_ATTENUATION),
        };

        let result = self.hw.configure_gain(gain);
        let gained = self.check("ConfigureGain", result);

        let result = self
            .hw
            .configure_level(self.state.reference_level_db, attenuation);
        let levelled = self.check("ConfigureLevel", result);

        let restarted = self.update_stream();
        gained.and(levelled).and(restarted)
    }
}
