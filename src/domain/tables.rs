//! BB60C hardware tables and limits
//!
//! The decimation and port tables are plain values owned by each open
//! device, built once at construction. Nothing here is global or mutable.

use super::types::Range;

/// Fixed ADC master clock
pub const MASTER_CLOCK_HZ: f64 = 40e6;

/// Tunable span of the RF front end
pub const MIN_FREQUENCY_HZ: f64 = 9.0e3;
pub const MAX_FREQUENCY_HZ: f64 = 6.4e9;

pub const MAX_RF_GAIN: i32 = 3;
pub const MAX_ATTENUATION_DB: f64 = 30.0;
pub const MIN_REFERENCE_LEVEL_DB: f64 = -120.0;
pub const MAX_REFERENCE_LEVEL_DB: f64 = 20.0;

/// SDK sentinels that hand gain/attenuation control to the device
pub const AUTO_GAIN: i32 = -1;
pub const AUTO_ATTENUATION: f64 = -1.0;

/// (decimation, achievable IQ bandwidth in Hz), ascending by decimation
const BB60C_DECIMATION: &[(u32, f64)] = &[
    (1, 27e6),
    (2, 17.8e6),
    (4, 8e6),
    (8, 3.75e6),
    (16, 2e6),
    (32, 1e6),
    (64, 500e3),
    (128, 250e3),
    (256, 140e3),
    (512, 65e3),
    (1024, 30e3),
    (2048, 15e3),
    (4096, 8e3),
    (8192, 4e3),
];

/// Ordered lookup from decimation factor to achievable bandwidth.
#[derive(Debug, Clone, PartialEq)]
pub struct DecimationTable {
    master_clock_hz: f64,
    /// Sorted ascending by decimation
    entries: Vec<(u32, f64)>,
}

impl DecimationTable {
    /// The BB60C table at its 40 MHz master clock
    pub fn bb60c() -> Self {
        Self::new(MASTER_CLOCK_HZ, BB60C_DECIMATION)
    }

    /// Build a table from (decimation, bandwidth) pairs in any order.
    ///
    /// Panics if `entries` is empty; every table needs a maximum rate.
    pub fn new(master_clock_hz: f64, entries: &[(u32, f64)]) -> Self {
        assert!(!entries.is_empty(), "decimation table cannot be empty");
        let mut entries = entries.to_vec();
        entries.sort_by_key(|&(decimation, _)| decimation);
        entries.dedup_by_key(|&mut (decimation, _)| decimation);
        Self {
            master_clock_hz,
            entries,
        }
    }

    pub fn master_clock_hz(&self) -> f64 {
        self.master_clock_hz
    }

    pub fn contains(&self, decimation: u32) -> bool {
        self.bandwidth(decimation).is_some()
    }

    /// Achievable bandwidth at `decimation`, if it is a table key
    pub fn bandwidth(&self, decimation: u32) -> Option<f64> {
        self.entries
            .binary_search_by_key(&decimation, |&(d, _)| d)
            .ok()
            .map(|i| self.entries[i].1)
    }

    pub fn sample_rate(&self, decimation: u32) -> f64 {
        self.master_clock_hz / decimation as f64
    }

    /// Smallest decimation, i.e. the maximum sample rate
    pub fn min_decimation(&self) -> u32 {
        self.entries[0].0
    }

    /// Pick the decimation whose rate is the smallest one at or above
    /// `requested_hz`. Requests above the maximum rate get the maximum rate.
    pub fn select(&self, requested_hz: f64) -> u32 {
        self.entries
            .iter()
            .rev()
            .map(|&(decimation, _)| decimation)
            .find(|&decimation| self.sample_rate(decimation) >= requested_hz)
            .unwrap_or_else(|| self.min_decimation())
    }

    /// Achievable sample rates, highest first
    pub fn sample_rates(&self) -> Vec<f64> {
        self.entries
            .iter()
            .map(|&(decimation, _)| self.sample_rate(decimation))
            .collect()
    }

    /// Achievable bandwidths, widest first
    pub fn bandwidths(&self) -> Vec<f64> {
        self.entries.iter().map(|&(_, bw)| bw).collect()
    }
}

/// One auxiliary connector: named modes and their SDK bit patterns.
#[derive(Debug, Clone, PartialEq)]
pub struct PortTable {
    key: &'static str,
    name: &'static str,
    description: &'static str,
    /// In discovery order; the first entry is the default
    modes: Vec<(&'static str, u32)>,
}

// Bit patterns from bb_api.h
const PORT1_AC_COUPLED: u32 = 0x00;
const PORT1_DC_COUPLED: u32 = 0x04;
const PORT1_INT_REF_OUT: u32 = 0x00;
const PORT1_EXT_REF_IN: u32 = 0x08;
const PORT1_OUT_LOGIC_LOW: u32 = 0x14;
const PORT1_OUT_LOGIC_HIGH: u32 = 0x1C;

const PORT2_OUT_LOGIC_LOW: u32 = 0x00;
const PORT2_OUT_LOGIC_HIGH: u32 = 0x20;
const PORT2_IN_TRIGGER_RISING_EDGE: u32 = 0x40;
const PORT2_IN_TRIGGER_FALLING_EDGE: u32 = 0x60;

impl PortTable {
    /// BNC connector 1: reference clock in/out or logic output
    pub fn port1() -> Self {
        Self {
            key: "port1",
            name: "PORT 1",
            description: "BNC connector 1",
            modes: vec![
                ("DEFAULT", 0),
                ("INT_REF_OUT_AC", PORT1_INT_REF_OUT | PORT1_AC_COUPLED),
                ("INT_REF_OUT_DC", PORT1_INT_REF_OUT | PORT1_DC_COUPLED),
                ("EXT_REF_IN_AC", PORT1_EXT_REF_IN | PORT1_AC_COUPLED),
                ("EXT_REF_IN_DC", PORT1_EXT_REF_IN | PORT1_DC_COUPLED),
                ("OUT_LOGIC_LOW_AC", PORT1_OUT_LOGIC_LOW | PORT1_AC_COUPLED),
                ("OUT_LOGIC_LOW_DC", PORT1_OUT_LOGIC_LOW | PORT1_DC_COUPLED),
                ("OUT_LOGIC_HIGH_AC", PORT1_OUT_LOGIC_HIGH | PORT1_AC_COUPLED),
                ("OUT_LOGIC_HIGH_DC", PORT1_OUT_LOGIC_HIGH | PORT1_DC_COUPLED),
            ],
        }
    }

    /// BNC connector 2: logic output or trigger input
    pub fn port2() -> Self {
        Self {
            key: "port2",
            name: "PORT 2",
            description: "BNC connector 2",
            modes: vec![
                ("DEFAULT", 0),
                ("OUT_LOGIC_LOW_DC", PORT2_OUT_LOGIC_LOW),
                ("OUT_LOGIC_HIGH_DC", PORT2_OUT_LOGIC_HIGH),
                ("IN_TRIGGER_RISING_EDGE", PORT2_IN_TRIGGER_RISING_EDGE),
                ("IN_TRIGGER_FALLING_EDGE", PORT2_IN_TRIGGER_FALLING_EDGE),
            ],
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn default_mode(&self) -> &'static str {
        self.modes[0].0
    }

    pub fn mode_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modes.iter().map(|&(name, _)| name)
    }

    pub fn bits(&self, mode: &str) -> Option<u32> {
        self.modes
            .iter()
            .find(|&&(name, _)| name == mode)
            .map(|&(_, bits)| bits)
    }

    /// Reverse lookup. Several names share a pattern on this hardware
    /// (coupling is ignored for some modes); the first listed name wins.
    pub fn mode(&self, bits: u32) -> Option<&'static str> {
        self.modes
            .iter()
            .find(|&&(_, b)| b == bits)
            .map(|&(name, _)| name)
    }
}

pub fn frequency_range() -> Range {
    Range::new(MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_rounds_up_to_next_supported_rate() {
        let table = DecimationTable::bb60c();
        // 2.5 MS/s is the smallest rate >= 2 MS/s
        assert_eq!(table.select(2.0e6), 16);
        assert_eq!(table.select(2.5e6), 16);
        assert_eq!(table.select(2.5e6 + 1.0), 8);
    }

    #[test]
    fn select_falls_back_to_max_rate() {
        let table = DecimationTable::bb60c();
        assert_eq!(table.select(40e6), 1);
        assert_eq!(table.select(80e6), 1);
    }

    #[test]
    fn select_tiny_rate_uses_largest_decimation() {
        let table = DecimationTable::bb60c();
        assert_eq!(table.select(0.0), 8192);
        assert_eq!(table.select(1.0), 8192);
    }

    #[test]
    fn select_has_minimal_overshoot_for_every_rate() {
        let table = DecimationTable::bb60c();
        let mut requested = 1_000.0;
        while requested < 50e6 {
            let chosen = table.select(requested);
            let rate = table.sample_rate(chosen);
            assert!(table.contains(chosen));
            if requested <= MASTER_CLOCK_HZ {
                assert!(rate >= requested, "{rate} < {requested}");
                let better = table
                    .sample_rates()
                    .into_iter()
                    .filter(|&r| r >= requested)
                    .any(|r| r < rate);
                assert!(!better, "overshoot not minimal for {requested}");
            } else {
                assert_eq!(chosen, 1);
            }
            requested *= 1.37;
        }
    }

    #[test]
    fn rates_and_bandwidths_are_descending() {
        let table = DecimationTable::bb60c();
        let rates = table.sample_rates();
        assert_eq!(rates.len(), 14);
        assert_eq!(rates[0], 40e6);
        assert!(rates.windows(2).all(|w| w[0] > w[1]));
        let bws = table.bandwidths();
        assert_eq!(bws[0], 27e6);
        assert!(bws.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn bandwidth_lookup_is_exact() {
        let table = DecimationTable::bb60c();
        assert_eq!(table.bandwidth(16), Some(2e6));
        assert_eq!(table.bandwidth(3), None);
    }

    #[test]
    fn port_reverse_lookup_prefers_first_name() {
        let port1 = PortTable::port1();
        assert_eq!(port1.mode(0), Some("DEFAULT"));
        assert_eq!(port1.bits("EXT_REF_IN_DC"), Some(0x0C));
        assert_eq!(port1.mode(0x0C), Some("EXT_REF_IN_DC"));
        assert_eq!(port1.mode(0xFF), None);
        assert_eq!(port1.bits("BOGUS"), None);
    }

    #[test]
    fn port2_modes_match_schema() {
        let names: Vec<_> = PortTable::port2().mode_names().collect();
        assert_eq!(
            names,
            [
                "DEFAULT",
                "OUT_LOGIC_LOW_DC",
                "OUT_LOGIC_HIGH_DC",
                "IN_TRIGGER_RISING_EDGE",
                "IN_TRIGGER_FALLING_EDGE"
            ]
        );
    }
}
