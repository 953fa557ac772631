//! Simulated BB60C for development and testing without hardware.
//!
//! Run the probe against it with:
//!
//!   RUST_LOG=bb60c_lib=info cargo run --bin bb60c-probe -- --stream 4
//!
//! Every command is logged at INFO level with a `[SIM BB60]` prefix so you can
//! see exactly what the controller would send to a real unit. While streaming,
//! a producer thread synthesizes a complex tone at the configured rate and
//! hands blocks to `get_iq` over a bounded channel. If the reader falls behind
//! and the channel fills, the next block that does get through is flagged with
//! sample loss, the way the hardware reports dropped USB transfers.

use std::collections::VecDeque;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, TrySendError};
use num_complex::Complex;

use crate::domain::tables::{MASTER_CLOCK_HZ, MAX_FREQUENCY_HZ, MIN_FREQUENCY_HZ};
use crate::domain::{
    Diagnostics, HardwareError, HwResult, IqPacket, SampleBuffer, StreamFormat,
};
use crate::ports::{HardwareDevice, HardwareSdk};

/// Serial reported by `SimulatedSdk::default()`
pub const DEFAULT_SERIAL: u32 = 11_223_344;

const INVALID_PARAMETER: i32 = -4;
const DEVICE_NOT_FOUND: i32 = -8;
const NOT_STREAMING: i32 = -9;
const DEVICE_CLOSED: i32 = -10;

const FIRMWARE_VERSION: i32 = 7;
const API_VERSION: &str = "simulated";

/// Samples per producer block
const BLOCK_LEN: usize = 4096;
/// Blocks buffered between producer and reader
const CHANNEL_DEPTH: usize = 8;
/// Tone amplitude relative to full scale
const TONE_AMPLITUDE: f32 = 0.5;

/// In-process stand-in for the vendor SDK
pub struct SimulatedSdk {
    serials: Vec<u32>,
}

impl SimulatedSdk {
    pub fn new(serials: Vec<u32>) -> Self {
        Self { serials }
    }
}

impl Default for SimulatedSdk {
    fn default() -> Self {
        Self::new(vec![DEFAULT_SERIAL])
    }
}

impl HardwareSdk for SimulatedSdk {
    fn list_serials(&self) -> HwResult<Vec<u32>> {
        log::info!("[SIM BB60] GetSerialNumberList → {:?}", self.serials);
        Ok(self.serials.clone())
    }

    fn open(&self, serial: u32) -> HwResult<Box<dyn HardwareDevice>> {
        if !self.serials.contains(&serial) {
            return Err(HardwareError::new(
                DEVICE_NOT_FOUND,
                format!("No simulated device with serial {serial}"),
            ));
        }
        log::info!("[SIM BB60] OpenDeviceBySerialNumber {serial}");
        Ok(Box::new(SimulatedDevice::new(serial)))
    }
}

/// One block of synthesized samples
struct Block {
    samples: Vec<Complex<f32>>,
    sample_loss: bool,
}

/// Tone generator thread feeding a bounded channel
struct Producer {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
    rx: Receiver<Block>,
}

impl Producer {
    fn spawn(sample_rate: f64, tone_hz: f64) -> Self {
        let (tx, rx) = bounded::<Block>(CHANNEL_DEPTH);
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();

        let handle = thread::spawn(move || {
            let period = Duration::from_secs_f64(BLOCK_LEN as f64 / sample_rate);
            let increment = 2.0 * PI * tone_hz / sample_rate;
            let mut phase = 0.0f64;
            let mut lost = false;
            let mut next = Instant::now();

            while flag.load(Ordering::Relaxed) {
                let samples = (0..BLOCK_LEN)
                    .map(|_| {
                        let s = Complex::new(phase.cos() as f32, phase.sin() as f32);
                        phase = (phase + increment) % (2.0 * PI);
                        s * TONE_AMPLITUDE
                    })
                    .collect();

                match tx.try_send(Block {
                    samples,
                    sample_loss: lost,
                }) {
                    Ok(()) => lost = false,
                    Err(TrySendError::Full(_)) => lost = true,
                    Err(TrySendError::Disconnected(_)) => break,
                }

                next += period;
                let now = Instant::now();
                if next > now {
                    thread::sleep(next - now);
                } else {
                    next = now;
                }
            }
        });

        Self {
            running,
            handle,
            rx,
        }
    }

    fn stop(self) {
        self.running.store(false, Ordering::Relaxed);
        drop(self.rx);
        if self.handle.join().is_err() {
            log::error!("[SIM BB60] producer thread panicked");
        }
    }
}

/// Simulated handle; see the module docs
pub struct SimulatedDevice {
    serial: u32,
    decimation: u32,
    bandwidth_hz: f64,
    center_hz: f64,
    format: StreamFormat,
    producer: Option<Producer>,
    /// Samples received but not yet handed out
    pending: VecDeque<Complex<f32>>,
    pending_loss: bool,
    closed: bool,
}

impl SimulatedDevice {
    pub fn new(serial: u32) -> Self {
        Self {
            serial,
            decimation: 1,
            bandwidth_hz: 27.0e6,
            center_hz: 100.0e6,
            format: StreamFormat::Cf32,
            producer: None,
            pending: VecDeque::new(),
            pending_loss: false,
            closed: false,
        }
    }

    fn ensure_open(&self) -> HwResult<()> {
        if self.closed {
            return Err(HardwareError::new(DEVICE_CLOSED, "Device not open"));
        }
        Ok(())
    }

    fn stop_producer(&mut self) {
        if let Some(producer) = self.producer.take() {
            producer.stop();
        }
        self.pending.clear();
        self.pending_loss = false;
    }

    /// Pull blocks until `want` samples are pending or `deadline` passes.
    fn fill_pending(&mut self, want: usize, deadline: Instant) {
        let Some(producer) = &self.producer else {
            return;
        };
        while self.pending.len() < want {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match producer.rx.recv_timeout(remaining) {
                Ok(block) => {
                    self.pending_loss |= block.sample_loss;
                    self.pending.extend(block.samples);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}

impl HardwareDevice for SimulatedDevice {
    fn configure_iq(&mut self, decimation: u32, bandwidth_hz: f64) -> HwResult<()> {
        self.ensure_open()?;
        if !decimation.is_power_of_two() || decimation > 8192 {
            return Err(HardwareError::new(
                INVALID_PARAMETER,
                format!("Invalid decimation {decimation}"),
            ));
        }
        log::info!("[SIM BB60] ConfigureIQ decimation={decimation} bandwidth={bandwidth_hz}");
        self.decimation = decimation;
        self.bandwidth_hz = bandwidth_hz;
        Ok(())
    }

    fn configure_center(&mut self, frequency_hz: f64) -> HwResult<()> {
        self.ensure_open()?;
        if !(MIN_FREQUENCY_HZ..=MAX_FREQUENCY_HZ).contains(&frequency_hz) {
            return Err(HardwareError::new(
                INVALID_PARAMETER,
                format!("Center frequency {frequency_hz} out of range"),
            ));
        }
        log::info!("[SIM BB60] ConfigureIQCenter {:.6} MHz", frequency_hz / 1e6);
        self.center_hz = frequency_hz;
        Ok(())
    }

    fn configure_gain(&mut self, gain: i32) -> HwResult<()> {
        self.ensure_open()?;
        log::info!("[SIM BB60] ConfigureGain {gain}");
        Ok(())
    }

    fn configure_level(&mut self, reference_db: f64, attenuation_db: f64) -> HwResult<()> {
        self.ensure_open()?;
        log::info!("[SIM BB60] ConfigureLevel ref={reference_db} atten={attenuation_db}");
        Ok(())
    }

    fn configure_io(&mut self, port1: u32, port2: u32) -> HwResult<()> {
        self.ensure_open()?;
        log::info!("[SIM BB60] ConfigureIO port1={port1:#04x} port2={port2:#04x}");
        Ok(())
    }

    fn configure_data_type(&mut self, format: StreamFormat) -> HwResult<()> {
        self.ensure_open()?;
        log::info!("[SIM BB60] ConfigureIQDataType {format}");
        self.format = format;
        Ok(())
    }

    fn initiate_iq(&mut self) -> HwResult<()> {
        self.ensure_open()?;
        self.stop_producer();
        let rate = MASTER_CLOCK_HZ / f64::from(self.decimation);
        log::info!(
            "[SIM BB60] Initiate IQ at {:.3} MHz, {rate} S/s",
            self.center_hz / 1e6
        );
        self.producer = Some(Producer::spawn(rate, rate / 16.0));
        Ok(())
    }

    fn abort(&mut self) -> HwResult<()> {
        self.ensure_open()?;
        if self.producer.is_some() {
            log::info!("[SIM BB60] Abort");
        }
        self.stop_producer();
        Ok(())
    }

    fn get_iq(&mut self, buffer: SampleBuffer<'_>, timeout: Duration) -> HwResult<IqPacket> {
        self.ensure_open()?;
        if self.producer.is_none() {
            return Err(HardwareError::new(
                NOT_STREAMING,
                "Device not configured for streaming",
            ));
        }

        self.fill_pending(buffer.len(), Instant::now() + timeout);
        let count = buffer.len().min(self.pending.len());
        let samples = self.pending.drain(..count);
        match buffer {
            SampleBuffer::Cf32(out) => {
                for (dst, src) in out.iter_mut().zip(samples) {
                    *dst = src;
                }
            }
            SampleBuffer::Cs16(out) => {
                for (dst, src) in out.iter_mut().zip(samples) {
                    *dst = to_cs16(src);
                }
            }
        }

        let sample_loss = std::mem::take(&mut self.pending_loss);
        Ok(IqPacket { count, sample_loss })
    }

    fn firmware_version(&self) -> HwResult<i32> {
        self.ensure_open()?;
        Ok(FIRMWARE_VERSION)
    }

    fn diagnostics(&self) -> HwResult<Diagnostics> {
        self.ensure_open()?;
        Ok(Diagnostics {
            temperature_c: 42.5,
            voltage_v: 5.05,
            current_ma: 1150.0,
        })
    }

    fn api_version(&self) -> String {
        API_VERSION.to_string()
    }

    fn close(&mut self) -> HwResult<()> {
        self.ensure_open()?;
        self.stop_producer();
        self.closed = true;
        log::info!("[SIM BB60] CloseDevice {}", self.serial);
        Ok(())
    }
}

impl Drop for SimulatedDevice {
    fn drop(&mut self) {
        self.stop_producer();
    }
}

fn to_cs16(sample: Complex<f32>) -> Complex<i16> {
    let scale = |v: f32| (v.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
    Complex::new(scale(sample.re), scale(sample.im))
}
