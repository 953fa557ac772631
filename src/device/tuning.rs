//! Frequency, sample rate and bandwidth

use crate::domain::tables;
use crate::domain::{Bb60Result, Range};

use super::Bb60Device;

impl Bb60Device {
    /// Tune the center frequency.
    ///
    /// No range check is done here; the hardware enforces its own limits.
    /// While streaming the stream is re-initiated so the new frequency takes
    /// effect without a stop.
    pub fn set_frequency(&mut self, frequency_hz: f64) -> Bb60Result<()> {
        self.state.center_frequency_hz = frequency_hz;

        let result = self.hw.configure_center(frequency_hz);
        let tuned = self.check("ConfigureIQCenter", result);
        let restarted = self.update_stream();
        tuned.and(restarted)
    }

    pub fn frequency(&self) -> f64 {
        self.state.center_frequency_hz
    }

    pub fn list_frequencies(&self) -> Vec<&'static str> {
        vec!["RF"]
    }

    pub fn frequency_range(&self) -> Range {
        tables::frequency_range()
    }

    /// Choose the decimation for `rate_hz`, rounding up to the next
    /// supported rate. Applied to the hardware on stream activation.
    pub fn set_sample_rate(&mut self, rate_hz: f64) {
        if self.state.requested_sample_rate_hz == rate_hz {
            return;
        }

        let decimation = self.decimation_table.select(rate_hz);
        self.state.decimation = decimation;
        self.state.requested_sample_rate_hz = rate_hz;

        log::info!(
            "BB60 set decimation {} BW {}MHz SR: {}MHz",
            decimation,
            self.table_bandwidth() / 1e6,
            self.sample_rate() / 1e6
        );
    }

    /// Rate produced by the current decimation
    pub fn sample_rate(&self) -> f64 {
        self.decimation_table.sample_rate(self.state.decimation)
    }

    /// Achievable rates, highest first
    pub fn list_sample_rates(&self) -> Vec<f64> {
        self.decimation_table.sample_rates()
    }

    /// Record a bandwidth ceiling. Clamping happens where it is read.
    pub fn set_bandwidth(&mut self, bandwidth_hz: f64) {
        self.state.bandwidth_hz = bandwidth_hz;
    }

    /// Effective bandwidth: the ceiling clamped to what the decimation allows
    pub fn bandwidth(&self) -> f64 {
        self.state.bandwidth_hz.min(self.table_bandwidth())
    }

    pub fn list_bandwidths(&self) -> Vec<f64> {
        self.decimation_table.bandwidths()
    }

    fn table_bandwidth(&self) -> f64 {
        // decimation is only ever assigned from the table
        self.decimation_table
            .bandwidth(self.state.decimation)
            .unwrap_or(0.0)
    }
}
