//! Discovery and factory entry points for SDR host registries
//!
//! A host registers the driver under [`DRIVER_KEY`], calls [`probe`] to list
//! attached units and [`construct`] with one of the returned argument maps
//! (or user-supplied ones) to open a device.

use crate::device::Bb60Device;
use crate::domain::{Bb60Error, Bb60Result, DeviceDescriptor, Kwargs};
use crate::ports::HardwareSdk;

/// Name the driver registers under
pub const DRIVER_KEY: &str = "bb60c";

/// List attached units. Enumeration failures are logged and yield an empty list.
pub fn probe<S: HardwareSdk + ?Sized>(sdk: &S) -> Vec<DeviceDescriptor> {
    match sdk.list_serials() {
        Ok(serials) => serials
            .iter()
            .enumerate()
            .map(|(index, &serial)| DeviceDescriptor::new(index, serial))
            .collect(),
        Err(e) => {
            log::error!("Error: {e}");
            Vec::new()
        }
    }
}

/// Open a device from construction arguments
pub fn construct<S: HardwareSdk + ?Sized>(sdk: &S, args: &Kwargs) -> Bb60Result<Bb60Device> {
    log::debug!("Constructing {DRIVER_KEY} device with {}", format_kwargs(args));
    Bb60Device::open(sdk, args)
}

/// Parse `key=value` pairs separated by commas, e.g. `serial=123, port1=DC`.
///
/// Whitespace around keys and values is trimmed and empty entries are
/// skipped. A later duplicate key replaces an earlier one.
pub fn parse_kwargs(s: &str) -> Bb60Result<Kwargs> {
    let mut args = Kwargs::new();
    for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| Bb60Error::MalformedArgument {
                key: entry.to_string(),
                value: String::new(),
                reason: "expected key=value".into(),
            })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Bb60Error::MalformedArgument {
                key: String::new(),
                value: value.trim().to_string(),
                reason: "empty key".into(),
            });
        }
        args.insert(key.to_string(), value.trim().to_string());
    }
    Ok(args)
}

/// Inverse of [`parse_kwargs`], keys in sorted order
pub fn format_kwargs(args: &Kwargs) -> String {
    args.iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HardwareError, HwResult};
    use crate::ports::HardwareDevice;

    struct FailingSdk;

    impl HardwareSdk for FailingSdk {
        fn list_serials(&self) -> HwResult<Vec<u32>> {
            Err(HardwareError::new(-1, "USB error"))
        }

        fn open(&self, _serial: u32) -> HwResult<Box<dyn HardwareDevice>> {
            Err(HardwareError::new(-1, "USB error"))
        }
    }

    #[test]
    fn probe_swallows_enumeration_failure() {
        assert!(probe(&FailingSdk).is_empty());
    }

    #[test]
    fn probe_describes_each_unit() {
        let sdk = crate::adapters::SimulatedSdk::new(vec![111, 222]);
        let found = probe(&sdk);
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].device_id, "1");
        assert_eq!(found[1].label, "BB60C [222]");
        assert_eq!(found[1].serial, "222");
    }

    #[test]
    fn construct_reports_enumeration_failure() {
        let err = construct(&FailingSdk, &Kwargs::new()).err().unwrap();
        assert!(matches!(err, Bb60Error::Enumeration(_)));
    }

    #[test]
    fn parse_kwargs_trims_and_skips_empty() {
        let args = parse_kwargs(" serial = 123 ,, port1=DC ").unwrap();
        assert_eq!(args.get("serial").map(String::as_str), Some("123"));
        assert_eq!(args.get("port1").map(String::as_str), Some("DC"));
        assert_eq!(args.len(), 2);
        assert!(parse_kwargs("").unwrap().is_empty());
    }

    #[test]
    fn parse_kwargs_rejects_bare_words() {
        assert!(matches!(
            parse_kwargs("serial"),
            Err(Bb60Error::MalformedArgument { .. })
        ));
        assert!(parse_kwargs("=5").is_err());
    }

    #[test]
    fn format_kwargs_round_trips() {
        let args = parse_kwargs("b=2, a=1").unwrap();
        assert_eq!(format_kwargs(&args), "a=1, b=2");
        assert_eq!(parse_kwargs(&format_kwargs(&args)).unwrap(), args);
    }
}
