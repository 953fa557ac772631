//! End-to-end tests against the simulated BB60C
//!
//! These go through the registry entry points and a real producer thread, so
//! they exercise the same path the probe binary takes without hardware.

use std::time::Duration;

use bb60c_lib::adapters::SimulatedSdk;
use bb60c_lib::domain::{
    Bb60Error, DeviceProfile, Direction, GainMode, ProfileStore, SampleBuffer,
};
use bb60c_lib::registry::{self, parse_kwargs};
use bb60c_lib::state::SharedDevice;
use num_complex::Complex;

const TIMEOUT: Duration = Duration::from_secs(2);

#[test]
fn probe_and_construct_by_serial() {
    let sdk = SimulatedSdk::new(vec![1001, 1002]);
    let found = registry::probe(&sdk);
    assert_eq!(found.len(), 2);

    let args = parse_kwargs(&format!("serial={}", found[1].serial)).unwrap();
    let device = registry::construct(&sdk, &args).unwrap();
    assert_eq!(device.device_id(), 1);
    assert_eq!(device.serial(), 1002);

    let info = device.hardware_info().to_kwargs();
    assert_eq!(info.get("serial").map(String::as_str), Some("1002"));
    assert!(info.contains_key("temperature"));
}

#[test]
fn construct_rejects_unknown_serial() {
    let sdk = SimulatedSdk::default();
    let args = parse_kwargs("serial=42").unwrap();
    assert!(matches!(
        registry::construct(&sdk, &args),
        Err(Bb60Error::DeviceNotFound(42))
    ));
}

#[test]
fn streams_cf32_tone() {
    let sdk = SimulatedSdk::default();
    let mut device = registry::construct(&sdk, &Default::default()).unwrap();
    device.set_sample_rate(1e6);
    assert_eq!(device.state().decimation, 32);

    let stream = device.setup_stream(Direction::Rx, "CF32", &[0]).unwrap();
    device.activate_stream(&stream, 0, 2048).unwrap();
    assert!(device.is_streaming());

    let mut buf = vec![Complex::<f32>::default(); 2048];
    for _ in 0..3 {
        let n = device
            .read_stream(&stream, SampleBuffer::Cf32(&mut buf), TIMEOUT)
            .unwrap();
        assert_eq!(n, buf.len());
        assert!(buf.iter().all(|s| s.norm() > 0.1));
    }

    device.deactivate_stream(&stream, 0).unwrap();
    assert!(matches!(
        device.read_stream(&stream, SampleBuffer::Cf32(&mut buf), TIMEOUT),
        Err(Bb60Error::StreamNotActive)
    ));
}

#[test]
fn streams_cs16_after_retune() {
    let sdk = SimulatedSdk::default();
    let mut device = registry::construct(&sdk, &Default::default()).unwrap();
    device.set_sample_rate(500e3);

    let stream = device.setup_stream(Direction::Rx, "CS16", &[]).unwrap();
    device.activate_stream(&stream, 0, 0).unwrap();

    // retune while streaming restarts the producer
    device.set_frequency(433.92e6).unwrap();
    assert!(device.is_streaming());

    let mut buf = vec![Complex::<i16>::default(); 1024];
    let n = device
        .read_stream(&stream, SampleBuffer::Cs16(&mut buf), TIMEOUT)
        .unwrap();
    assert_eq!(n, 1024);
    assert!(buf.iter().any(|s| s.re != 0 || s.im != 0));

    device.close_stream(stream);
    assert!(!device.is_streaming());
}

#[test]
fn out_of_range_frequency_is_logged_not_raised() {
    let sdk = SimulatedSdk::default();
    let mut device = registry::construct(&sdk, &Default::default()).unwrap();

    device.set_frequency(10e9).unwrap();
    assert_eq!(device.frequency(), 10e9);
}

#[test]
fn sensors_report_diagnostics() {
    let sdk = SimulatedSdk::default();
    let device = registry::construct(&sdk, &Default::default()).unwrap();
    for key in device.list_sensors() {
        assert!(device.read_sensor(key).unwrap() > 0.0);
    }
}

#[test]
fn saved_profile_applies_to_device() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProfileStore::open(dir.path()).unwrap();
    let profile = DeviceProfile {
        name: "ISM".to_string(),
        frequency_hz: 915e6,
        sample_rate_hz: Some(2e6),
        gain_mode: GainMode::Manual,
        rf_gain: 1,
        attenuation_db: -20.0,
        port1: "EXT_REF_IN_AC".to_string(),
        ..DeviceProfile::default()
    };
    store.save(&profile).unwrap();

    let sdk = SimulatedSdk::default();
    let mut device = registry::construct(&sdk, &Default::default()).unwrap();
    device.apply_profile(&store.load("ISM").unwrap()).unwrap();

    assert_eq!(device.frequency(), 915e6);
    assert_eq!(device.sample_rate(), 2.5e6);
    assert_eq!(device.gain(Some("ATT")).unwrap(), -20.0);
    assert_eq!(device.read_setting("port1").unwrap(), "EXT_REF_IN_AC");
}

#[test]
fn shared_device_reader_thread() {
    let sdk = SimulatedSdk::default();
    let mut device = registry::construct(&sdk, &Default::default()).unwrap();
    device.set_sample_rate(1e6);
    let stream = device.setup_stream(Direction::Rx, "CF32", &[0]).unwrap();
    device.activate_stream(&stream, 0, 0).unwrap();

    let shared = SharedDevice::new(device);
    let reader = {
        let shared = shared.clone();
        std::thread::spawn(move || {
            let mut buf = vec![Complex::<f32>::default(); 512];
            let mut total = 0;
            for _ in 0..4 {
                total += shared.with_device(|d| {
                    d.read_stream(&stream, SampleBuffer::Cf32(&mut buf), TIMEOUT)
                })?;
            }
            Ok::<_, Bb60Error>(total)
        })
    };

    assert_eq!(reader.join().unwrap().unwrap(), 2048);
    assert!(shared.with_device(|d| Ok(d.is_streaming())).unwrap());
}
