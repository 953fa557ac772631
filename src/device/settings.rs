//! Auxiliary port settings (`port1`, `port2`)

use crate::domain::{ArgInfo, ArgKind, Bb60Error, Bb60Result, PortTable};

use super::Bb60Device;

/// Reported when the stored bit pattern has no name in the table
pub const UNKNOWN_MODE: &str = "UNKNOWN";

impl Bb60Device {
    fn port_tables(&self) -> [&PortTable; 2] {
        [&self.port1_table, &self.port2_table]
    }

    fn port_slot(&mut self, key: &str) -> Option<(&PortTable, &mut u32)> {
        match key {
            "port1" => Some((&self.port1_table, &mut self.state.port1)),
            "port2" => Some((&self.port2_table, &mut self.state.port2)),
            _ => None,
        }
    }

    /// Settings schema, in the order construction args are applied
    pub fn setting_info(&self) -> Vec<ArgInfo> {
        self.port_tables()
            .into_iter()
            .map(|table| ArgInfo {
                key: table.key().to_string(),
                value: table.default_mode().to_string(),
                name: table.name().to_string(),
                description: table.description().to_string(),
                units: String::new(),
                kind: ArgKind::String,
                options: table.mode_names().map(String::from).collect(),
            })
            .collect()
    }

    /// Set an auxiliary port mode and push the I/O configuration.
    ///
    /// Unknown mode names, and any change while streaming, are refused with
    /// a warning and leave the state untouched. Unknown keys are an error.
    pub fn write_setting(&mut self, key: &str, value: &str) -> Bb60Result<()> {
        let streaming = self.state.stream_active;
        let (table, slot) = self
            .port_slot(key)
            .ok_or_else(|| Bb60Error::UnknownSetting(key.to_string()))?;

        let Some(bits) = table.bits(value) else {
            log::warn!("Invalid setting '{key}'=='{value}'");
            return Ok(());
        };
        if streaming {
            log::warn!("Can't configure {key} while streaming");
            return Ok(());
        }

        *slot = bits;
        self.configure_io()
    }

    pub fn read_setting(&self, key: &str) -> Bb60Result<String> {
        let (table, bits) = match key {
            "port1" => (&self.port1_table, self.state.port1),
            "port2" => (&self.port2_table, self.state.port2),
            _ => return Err(Bb60Error::UnknownSetting(key.to_string())),
        };
        Ok(table.mode(bits).unwrap_or(UNKNOWN_MODE).to_string())
    }

    fn configure_io(&mut self) -> Bb60Result<()> {
        let (port1, port2) = (self.state.port1, self.state.port2);
        let result = self.hw.configure_io(port1, port2);
        if result.is_ok() {
            log::info!("ConfigureIO: {port1} {port2}");
        }
        self.check("ConfigureIO", result)
    }
}
