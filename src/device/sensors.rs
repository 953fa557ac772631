//! Diagnostic sensors (read live, no state)

use std::str::FromStr;

use crate::domain::{ArgInfo, ArgKind, Bb60Error, Bb60Result};

use super::Bb60Device;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    Temperature,
    Voltage,
    Current,
}

impl Sensor {
    pub const ALL: [Sensor; 3] = [Sensor::Temperature, Sensor::Voltage, Sensor::Current];

    pub fn key(&self) -> &'static str {
        match self {
            Sensor::Temperature => "TEMP",
            Sensor::Voltage => "VOLT",
            Sensor::Current => "CURR",
        }
    }

    pub fn info(&self) -> ArgInfo {
        let (name, description, units) = match self {
            Sensor::Temperature => ("Temperature", "FPGA temperature", "C"),
            Sensor::Voltage => ("Voltage", "Input voltage", "V"),
            Sensor::Current => ("Current", "Input current draw", "mA"),
        };
        ArgInfo {
            key: self.key().to_string(),
            value: "0".to_string(),
            name: name.to_string(),
            description: description.to_string(),
            units: units.to_string(),
            kind: ArgKind::Float,
            options: Vec::new(),
        }
    }
}

impl FromStr for Sensor {
    type Err = Bb60Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sensor::ALL
            .into_iter()
            .find(|sensor| sensor.key() == s)
            .ok_or_else(|| Bb60Error::UnknownSensor(s.to_string()))
    }
}

impl Bb60Device {
    pub fn list_sensors(&self) -> Vec<&'static str> {
        Sensor::ALL.iter().map(Sensor::key).collect()
    }

    pub fn sensor_info(&self, key: &str) -> Bb60Result<ArgInfo> {
        Ok(key.parse::<Sensor>()?.info())
    }

    pub fn read_sensor(&self, key: &str) -> Bb60Result<f64> {
        let sensor: Sensor = key.parse()?;
        let diag = self.hw.diagnostics()?;
        let value = match sensor {
            Sensor::Temperature => diag.temperature_c,
            Sensor::Voltage => diag.voltage_v,
            Sensor::Current => diag.current_ma,
        };
        Ok(value as f64)
    }
}
