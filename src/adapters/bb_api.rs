//! Signal Hound BB API adapter: implements the hardware ports over `libbb_api`.
//!
//! Only built with the `bb-api` feature; the vendor library must be on the
//! linker search path.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};
use std::ptr;
use std::time::Duration;

use crate::domain::{Diagnostics, HardwareError, HwResult, IqPacket, SampleBuffer, StreamFormat};
use crate::ports::{HardwareDevice, HardwareSdk};

// ---------------------------------------------------------------------------
// FFI types and constants
// ---------------------------------------------------------------------------

type BbStatus = c_int;
const BB_NO_ERROR: BbStatus = 0;
const BB_TRUE: c_int = 1;

const BB_MAX_DEVICES: usize = 8;

const BB_STREAMING: u32 = 0x4;
const BB_STREAM_IQ: u32 = 0x0;

const BB_DATA_TYPE_32FC: c_int = 0;
const BB_DATA_TYPE_16SC: c_int = 1;

#[repr(C)]
struct BbIqPacket {
    iq_data: *mut c_void,
    iq_count: c_int,
    triggers: *mut c_int,
    trigger_count: c_int,
    purge: c_int,
    data_remaining: c_int,
    sample_loss: c_int,
    sec: c_int,
    nano: c_int,
}

#[link(name = "bb_api")]
extern "C" {
    fn bbGetSerialNumberList(serial_numbers: *mut c_int, device_count: *mut c_int) -> BbStatus;
    fn bbOpenDeviceBySerialNumber(device: *mut c_int, serial_number: c_int) -> BbStatus;
    fn bbCloseDevice(device: c_int) -> BbStatus;
    fn bbConfigureIQCenter(device: c_int, center_freq: f64) -> BbStatus;
    fn bbConfigureIQ(device: c_int, downsample_factor: c_int, bandwidth: f64) -> BbStatus;
    fn bbConfigureIQDataType(device: c_int, data_type: c_int) -> BbStatus;
    fn bbConfigureGain(device: c_int, gain: c_int) -> BbStatus;
    fn bbConfigureLevel(device: c_int, ref_level: f64, atten: f64) -> BbStatus;
    fn bbConfigureIO(device: c_int, port1: u32, port2: u32) -> BbStatus;
    fn bbInitiate(device: c_int, mode: u32, flag: u32) -> BbStatus;
    fn bbAbort(device: c_int) -> BbStatus;
    fn bbGetIQ(device: c_int, pkt: *mut BbIqPacket) -> BbStatus;
    fn bbGetFirmwareVersion(device: c_int, version: *mut c_int) -> BbStatus;
    fn bbGetDeviceDiagnostics(
        device: c_int,
        temperature: *mut f32,
        usb_voltage: *mut f32,
        usb_current: *mut f32,
    ) -> BbStatus;
    fn bbGetAPIVersion() -> *const c_char;
    fn bbGetErrorString(status: BbStatus) -> *const c_char;
}

/// Owned copy of a static C string returned by the API
fn c_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    // SAFETY: the API returns pointers to static NUL-terminated strings
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

fn status(code: BbStatus) -> HwResult<()> {
    if code == BB_NO_ERROR {
        return Ok(());
    }
    // SAFETY: bbGetErrorString accepts any status value
    let message = c_string(unsafe { bbGetErrorString(code) });
    Err(HardwareError::new(code, message))
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Process-level entry point of `libbb_api`
#[derive(Debug, Default)]
pub struct BbApi;

impl HardwareSdk for BbApi {
    fn list_serials(&self) -> HwResult<Vec<u32>> {
        let mut serials = [0 as c_int; BB_MAX_DEVICES];
        let mut count: c_int = 0;
        // SAFETY: the array holds BB_MAX_DEVICES entries, the documented maximum
        status(unsafe { bbGetSerialNumberList(serials.as_mut_ptr(), &mut count) })?;
        let count = usize::try_from(count).unwrap_or(0).min(BB_MAX_DEVICES);
        Ok(serials[..count].iter().map(|&s| s as u32).collect())
    }

    fn open(&self, serial: u32) -> HwResult<Box<dyn HardwareDevice>> {
        let mut id: c_int = -1;
        // SAFETY: id is a valid out pointer
        status(unsafe { bbOpenDeviceBySerialNumber(&mut id, serial as c_int) })?;
        log::debug!("bbOpenDeviceBySerialNumber({serial}) → handle {id}");
        Ok(Box::new(BbDevice { id }))
    }
}

/// An open handle from `bbOpenDeviceBySerialNumber`
pub struct BbDevice {
    id: c_int,
}

impl HardwareDevice for BbDevice {
    fn configure_iq(&mut self, decimation: u32, bandwidth_hz: f64) -> HwResult<()> {
        // SAFETY: plain value arguments on an open handle
        status(unsafe { bbConfigureIQ(self.id, decimation as c_int, bandwidth_hz) })
    }

    fn configure_center(&mut self, frequency_hz: f64) -> HwResult<()> {
        // SAFETY: plain value arguments on an open handle
        status(unsafe { bbConfigureIQCenter(self.id, frequency_hz) })
    }

    fn configure_gain(&mut self, gain: i32) -> HwResult<()> {
        // SAFETY: plain value arguments on an open handle
        status(unsafe { bbConfigureGain(self.id, gain) })
    }

    fn configure_level(&mut self, reference_db: f64, attenuation_db: f64) -> HwResult<()> {
        // SAFETY: plain value arguments on an open handle
        status(unsafe { bbConfigureLevel(self.id, reference_db, attenuation_db) })
    }

    fn configure_io(&mut self, port1: u32, port2: u32) -> HwResult<()> {
        // SAFETY: plain value arguments on an open handle
        status(unsafe { bbConfigureIO(self.id, port1, port2) })
    }

    fn configure_data_type(&mut self, format: StreamFormat) -> HwResult<()> {
        let data_type = match format {
            StreamFormat::Cf32 => BB_DATA_TYPE_32FC,
            StreamFormat::Cs16 => BB_DATA_TYPE_16SC,
        };
        // SAFETY: plain value arguments on an open handle
        status(unsafe { bbConfigureIQDataType(self.id, data_type) })
    }

    fn initiate_iq(&mut self) -> HwResult<()> {
        // SAFETY: plain value arguments on an open handle
        status(unsafe { bbInitiate(self.id, BB_STREAMING, BB_STREAM_IQ) })
    }

    fn abort(&mut self) -> HwResult<()> {
        // SAFETY: plain value arguments on an open handle
        status(unsafe { bbAbort(self.id) })
    }

    /// The API blocks until the buffer is full; `timeout` is not used.
    fn get_iq(&mut self, buffer: SampleBuffer<'_>, _timeout: Duration) -> HwResult<IqPacket> {
        let requested = buffer.len();
        let iq_data = match buffer {
            SampleBuffer::Cf32(buf) => buf.as_mut_ptr() as *mut c_void,
            SampleBuffer::Cs16(buf) => buf.as_mut_ptr() as *mut c_void,
        };
        let mut pkt = BbIqPacket {
            iq_data,
            iq_count: c_int::try_from(requested).unwrap_or(c_int::MAX),
            triggers: ptr::null_mut(),
            trigger_count: 0,
            purge: 0,
            data_remaining: 0,
            sample_loss: 0,
            sec: 0,
            nano: 0,
        };
        // SAFETY: iq_data points at `requested` samples of the configured
        // data type; the controller rejects buffers of the other format
        status(unsafe { bbGetIQ(self.id, &mut pkt) })?;
        Ok(IqPacket {
            count: usize::try_from(pkt.iq_count).unwrap_or(0).min(requested),
            sample_loss: pkt.sample_loss == BB_TRUE,
        })
    }

    fn firmware_version(&self) -> HwResult<i32> {
        let mut version: c_int = 0;
        // SAFETY: version is a valid out pointer
        status(unsafe { bbGetFirmwareVersion(self.id, &mut version) })?;
        Ok(version)
    }

    fn diagnostics(&self) -> HwResult<Diagnostics> {
        let (mut temperature_c, mut voltage_v, mut current_ma) = (0.0f32, 0.0f32, 0.0f32);
        // SAFETY: all three are valid out pointers
        status(unsafe {
            bbGetDeviceDiagnostics(self.id, &mut temperature_c, &mut voltage_v, &mut current_ma)
        })?;
        Ok(Diagnostics {
            temperature_c,
            voltage_v,
            current_ma,
        })
    }

    fn api_version(&self) -> String {
        // SAFETY: returns a static string
        c_string(unsafe { bbGetAPIVersion() })
    }

    fn close(&mut self) -> HwResult<()> {
        // SAFETY: plain value arguments on an open handle
        status(unsafe { bbCloseDevice(self.id) })
    }
}
