//! Unit selection and the open sequence

use crate::domain::{Bb60Error, Bb60Result, Kwargs};
use crate::ports::HardwareSdk;

use super::Bb60Device;

/// Which attached unit to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceSelector {
    /// First unit enumerated
    #[default]
    First,
    /// Position in the SDK's enumeration order
    Index(usize),
    /// Unit serial number
    Serial(u32),
}

fn parse_arg<T: std::str::FromStr>(args: &Kwargs, key: &str) -> Bb60Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    args.get(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| Bb60Error::MalformedArgument {
                    key: key.to_string(),
                    value: value.clone(),
                    reason: e.to_string(),
                })
        })
        .transpose()
}

impl DeviceSelector {
    /// Read `serial` or `device_id` from construction args.
    /// `serial` takes precedence when both are present.
    pub fn from_kwargs(args: &Kwargs) -> Bb60Result<Self> {
        if let Some(serial) = parse_arg::<u32>(args, "serial")? {
            if args.contains_key("device_id") {
                log::debug!("Both serial and device_id given, using serial {serial}");
            }
            return Ok(DeviceSelector::Serial(serial));
        }
        Ok(parse_arg::<usize>(args, "device_id")?
            .map(DeviceSelector::Index)
            .unwrap_or_default())
    }

    /// Map to (index, serial) against an enumeration result
    pub fn resolve(&self, serials: &[u32]) -> Bb60Result<(usize, u32)> {
        if serials.is_empty() {
            return Err(Bb60Error::NoDevicesPresent);
        }
        match *self {
            DeviceSelector::First => Ok((0, serials[0])),
            DeviceSelector::Index(index) => serials
                .get(index)
                .map(|&serial| (index, serial))
                .ok_or(Bb60Error::IndexOutOfRange {
                    index,
                    count: serials.len(),
                }),
            DeviceSelector::Serial(serial) => serials
                .iter()
                .position(|&s| s == serial)
                .map(|index| (index, serial))
                .ok_or(Bb60Error::DeviceNotFound(serial)),
        }
    }
}

impl Bb60Device {
    /// Select, open and initialize a unit.
    ///
    /// After the handle is open the default decimation, bandwidth and
    /// frequency are pushed, then any declared setting present in `args`
    /// is applied through [`write_setting`](Self::write_setting) in schema
    /// order.
    pub fn open<S: HardwareSdk + ?Sized>(sdk: &S, args: &Kwargs) -> Bb60Result<Self> {
        let selector = DeviceSelector::from_kwargs(args)?;

        let serials = sdk
            .list_serials()
            .map_err(|e| Bb60Error::Enumeration(e.to_string()))?;
        let (device_id, serial) = selector.resolve(&serials)?;

        let hw = sdk.open(serial).map_err(|e| {
            Bb60Error::DeviceOpenFailed(format!("{device_id} with S/N {serial}: {e}"))
        })?;
        log::info!("Opened BB60 {device_id} (S/N {serial})");

        let mut device = Bb60Device::from_hardware(hw, device_id, serial);
        device.push_defaults()?;

        for info in device.setting_info() {
            if let Some(value) = args.get(&info.key) {
                device.write_setting(&info.key, value)?;
            }
        }

        Ok(device)
    }

    fn push_defaults(&mut self) -> Bb60Result<()> {
        let decimation = self.state.decimation;
        let bandwidth = self.state.bandwidth_hz;
        let result = self.hw.configure_iq(decimation, bandwidth);
        self.check("ConfigureIQ", result)?;

        let result = self.hw.configure_center(self.state.center_frequency_hz);
        self.check("ConfigureIQCenter", result)
    }
}
