//! Core domain types
//!
//! Pure types with no I/O dependencies. These describe what the driver
//! exposes to an SDR host: descriptors, stream formats, gain controls,
//! sample buffers and the metadata used for discovery.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use super::error::Bb60Error;

/// String-keyed argument map (construction args, descriptors, hardware info)
pub type Kwargs = BTreeMap<String, String>;

/// Stream direction. The BB60C is receive-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Rx,
    Tx,
}

/// Sample encodings the device can deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamFormat {
    /// Complex 32-bit float, full scale 1.0
    Cf32,
    /// Complex signed 16-bit integer
    Cs16,
}

impl StreamFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamFormat::Cf32 => "CF32",
            StreamFormat::Cs16 => "CS16",
        }
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamFormat {
    type Err = Bb60Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CF32" => Ok(StreamFormat::Cf32),
            "CS16" => Ok(StreamFormat::Cs16),
            other => Err(Bb60Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Which gain strategy is in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GainMode {
    /// RF gain index and attenuator set explicitly
    Manual,
    /// Device manages its stages around a reference level
    ReferenceLevel,
}

/// Named gain controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GainControl {
    /// Manual RF gain index
    #[serde(rename = "RF")]
    Rf,
    /// Manual attenuation in dB (non-positive)
    #[serde(rename = "ATT")]
    Att,
    /// Reference level in dBm
    #[serde(rename = "REF")]
    Ref,
}

impl GainControl {
    pub const ALL: [GainControl; 3] = [GainControl::Rf, GainControl::Att, GainControl::Ref];

    pub fn name(&self) -> &'static str {
        match self {
            GainControl::Rf => "RF",
            GainControl::Att => "ATT",
            GainControl::Ref => "REF",
        }
    }

    /// The gain mode that becomes active when this control is set
    pub fn mode(&self) -> GainMode {
        match self {
            GainControl::Rf | GainControl::Att => GainMode::Manual,
            GainControl::Ref => GainMode::ReferenceLevel,
        }
    }
}

impl FromStr for GainControl {
    type Err = Bb60Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GainControl::ALL
            .into_iter()
            .find(|g| g.name() == s)
            .ok_or_else(|| Bb60Error::UnsupportedGain(s.to_string()))
    }
}

/// Closed numeric interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub minimum: f64,
    pub maximum: f64,
}

impl Range {
    pub fn new(minimum: f64, maximum: f64) -> Self {
        Self { minimum, maximum }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.minimum && value <= self.maximum
    }
}

/// Value type of a discoverable argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgKind {
    String,
    Float,
}

/// Discovery metadata for a setting or sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgInfo {
    pub key: String,
    pub value: String,
    pub name: String,
    pub description: String,
    pub units: String,
    pub kind: ArgKind,
    pub options: Vec<String>,
}

/// One physical unit found during enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub device_id: String,
    pub label: String,
    pub serial: String,
}

impl DeviceDescriptor {
    pub fn new(index: usize, serial: u32) -> Self {
        Self {
            device_id: index.to_string(),
            label: format!("BB60C [{serial}]"),
            serial: serial.to_string(),
        }
    }

    pub fn to_kwargs(&self) -> Kwargs {
        let mut args = Kwargs::new();
        args.insert("device_id".into(), self.device_id.clone());
        args.insert("label".into(), self.label.clone());
        args.insert("serial".into(), self.serial.clone());
        args
    }
}

/// Live diagnostics readback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub temperature_c: f32,
    pub voltage_v: f32,
    pub current_ma: f32,
}

/// Hardware identification and health, queried on demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareInfo {
    pub device_id: usize,
    pub serial: u32,
    pub api_version: String,
    pub firmware: Option<i32>,
    pub diagnostics: Option<Diagnostics>,
}

impl HardwareInfo {
    pub fn to_kwargs(&self) -> Kwargs {
        let mut args = Kwargs::new();
        args.insert("device_id".into(), self.device_id.to_string());
        args.insert("serial".into(), self.serial.to_string());
        args.insert("api_version".into(), self.api_version.clone());
        if let Some(firmware) = self.firmware {
            args.insert("firmware".into(), firmware.to_string());
        }
        if let Some(d) = self.diagnostics {
            args.insert("temperature".into(), format!("{:.6}", d.temperature_c));
            args.insert("voltage".into(), format!("{:.6}", d.voltage_v));
            args.insert("current".into(), format!("{:.6}", d.current_ma));
        }
        args
    }
}

/// Destination for one read. The variant selects the sample encoding.
pub enum SampleBuffer<'a> {
    Cf32(&'a mut [Complex<f32>]),
    Cs16(&'a mut [Complex<i16>]),
}

impl SampleBuffer<'_> {
    pub fn len(&self) -> usize {
        match self {
            SampleBuffer::Cf32(buf) => buf.len(),
            SampleBuffer::Cs16(buf) => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn format(&self) -> StreamFormat {
        match self {
            SampleBuffer::Cf32(_) => StreamFormat::Cf32,
            SampleBuffer::Cs16(_) => StreamFormat::Cs16,
        }
    }
}

/// Result of one hardware IQ fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IqPacket {
    /// Samples written into the buffer
    pub count: usize,
    /// The device dropped samples before this packet
    pub sample_loss: bool,
}

/// How hardware command failures after open are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ApplyPolicy {
    /// Log the SDK error and keep going with the requested state
    #[default]
    BestEffort,
    /// Log the SDK error, keep the requested state, and return the error
    Strict,
}
