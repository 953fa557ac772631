//! Domain error types

use thiserror::Error;

/// Failure reported by the vendor SDK, carrying its own status text.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} (status {code})")]
pub struct HardwareError {
    pub code: i32,
    pub message: String,
}

impl HardwareError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Result type alias for SDK calls
pub type HwResult<T> = Result<T, HardwareError>;

/// Errors that can occur while driving a BB60C
#[derive(Error, Debug)]
pub enum Bb60Error {
    // Construction-time failures
    #[error("No BB60 devices found")]
    NoDevicesPresent,

    #[error("Failed to retrieve list of BB60 devices: {0}")]
    Enumeration(String),

    #[error("BB60 device with S/N {0} not found")]
    DeviceNotFound(u32),

    #[error("BB60 device_id {index} out of range [0 .. {}]", .count.saturating_sub(1))]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Malformed argument {key}='{value}': {reason}")]
    MalformedArgument {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unable to open BB60 device: {0}")]
    DeviceOpenFailed(String),

    // Caller misuse
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Unsupported gain: {0}")]
    UnsupportedGain(String),

    #[error("Unknown sensor: {0}")]
    UnknownSensor(String),

    #[error("Invalid channel selection: {0}")]
    InvalidChannel(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Unsupported stream format '{0}', only CF32 and CS16 are supported")]
    UnsupportedFormat(String),

    #[error("Stream is not active")]
    StreamNotActive,

    // Hardware command failures surfaced under the strict apply policy
    #[error("Hardware command failed: {0}")]
    Hardware(#[from] HardwareError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Device state corrupted")]
    StateCorrupted,
}

/// Result type alias for BB60C operations
pub type Bb60Result<T> = Result<T, Bb60Error>;
