//! Receive stream lifecycle
//!
//! ```text
//!   Idle ──activate──▶ Configuring ──initiate ok──▶ Streaming
//!    ▲                     │                          │  ▲
//!    │                initiate failed                 │  │ frequency / gain
//!    │◀────────────────────┘                          │  │ change re-initiates
//!    │◀──────────────────deactivate / close───────────┘──┘
//! ```
//!
//! Sample rate and bandwidth are pushed on the way through Configuring, so
//! changes to them take effect at the next activation.

use std::time::Duration;

use crate::domain::{Bb60Error, Bb60Result, Direction, SampleBuffer, StreamFormat};

use super::Bb60Device;

/// Handle returned by [`Bb60Device::setup_stream`]
#[derive(Debug, PartialEq, Eq)]
pub struct RxStream {
    format: StreamFormat,
}

impl RxStream {
    pub fn format(&self) -> StreamFormat {
        self.format
    }
}

impl Bb60Device {
    pub fn stream_formats(&self, direction: Direction) -> Vec<StreamFormat> {
        match direction {
            Direction::Rx => vec![StreamFormat::Cf32, StreamFormat::Cs16],
            Direction::Tx => Vec::new(),
        }
    }

    /// Native encoding and its full-scale value
    pub fn native_stream_format(&self) -> (StreamFormat, f64) {
        (StreamFormat::Cf32, 1.0)
    }

    pub fn is_streaming(&self) -> bool {
        self.state.stream_active
    }

    /// Packets that arrived flagged with sample loss since open
    pub fn overruns(&self) -> u64 {
        self.state.overruns
    }

    /// Validate a stream request and select the IQ data type.
    ///
    /// Only channel 0 in the receive direction exists; an empty channel
    /// list means channel 0.
    pub fn setup_stream(
        &mut self,
        direction: Direction,
        format: &str,
        channels: &[usize],
    ) -> Bb60Result<RxStream> {
        if direction == Direction::Tx {
            return Err(Bb60Error::InvalidChannel(
                "BB60C has no transmit channels".into(),
            ));
        }
        if channels.len() > 1 || channels.first().is_some_and(|&c| c != 0) {
            return Err(Bb60Error::InvalidChannel(format!(
                "setupStream invalid channel selection {channels:?}"
            )));
        }
        let format: StreamFormat = format.parse()?;

        log::info!("Using format {format}");
        let result = self.hw.configure_data_type(format);
        self.check("ConfigureIQDataType", result)?;

        Ok(RxStream { format })
    }

    /// Stop the stream. The device stays open.
    pub fn close_stream(&mut self, stream: RxStream) {
        log::debug!("Closing {} stream", stream.format);
        self.abort();
    }

    /// Push decimation and effective bandwidth, then start streaming.
    ///
    /// All or nothing: if the initiate command fails the device stays idle
    /// and `NotSupported` is returned.
    pub fn activate_stream(
        &mut self,
        _stream: &RxStream,
        flags: u32,
        num_elems: usize,
    ) -> Bb60Result<()> {
        if flags != 0 {
            return Err(Bb60Error::NotSupported(format!(
                "activateStream flags {flags:#x}"
            )));
        }
        log::debug!("Activating stream (num_elems={num_elems})");

        let decimation = self.state.decimation;
        let bandwidth = self.bandwidth();
        let result = self.hw.configure_iq(decimation, bandwidth);
        self.check("ConfigureIQ", result)?;

        self.state.stream_active = true;
        if let Err(e) = self.hw.initiate_iq() {
            log::error!("Initiate: {e}");
            self.state.stream_active = false;
            return Err(Bb60Error::NotSupported(format!("stream initiate failed: {e}")));
        }
        Ok(())
    }

    /// Abort unconditionally, even when already idle
    pub fn deactivate_stream(&mut self, _stream: &RxStream, flags: u32) -> Bb60Result<()> {
        if flags != 0 {
            return Err(Bb60Error::NotSupported(format!(
                "deactivateStream flags {flags:#x}"
            )));
        }
        self.abort();
        Ok(())
    }

    /// Fill `buffer` with up to `buffer.len()` samples.
    ///
    /// A hardware error yields zero samples rather than an error; callers
    /// are expected to keep reading. Sample loss is logged and counted.
    pub fn read_stream(
        &mut self,
        stream: &RxStream,
        buffer: SampleBuffer<'_>,
        timeout: Duration,
    ) -> Bb60Result<usize> {
        if !self.state.stream_active {
            return Err(Bb60Error::StreamNotActive);
        }
        if buffer.format() != stream.format {
            return Err(Bb60Error::NotSupported(format!(
                "{} buffer on a {} stream",
                buffer.format(),
                stream.format
            )));
        }

        let requested = buffer.len();
        match self.hw.get_iq(buffer, timeout) {
            Ok(packet) => {
                if packet.sample_loss {
                    self.state.overruns += 1;
                    log::warn!("Sample Overrun");
                }
                Ok(packet.count.min(requested))
            }
            Err(e) => {
                log::error!("GetIQ: {e}");
                Ok(0)
            }
        }
    }

    /// Re-issue the initiate command if streaming, so configuration pushed
    /// since activation takes effect.
    pub(super) fn update_stream(&mut self) -> Bb60Result<()> {
        if !self.state.stream_active {
            return Ok(());
        }
        let result = self.hw.initiate_iq();
        self.check("Initiate", result)
    }

    fn abort(&mut self) {
        if let Err(e) = self.hw.abort() {
            log::error!("Abort: {e}");
        }
        self.state.stream_active = false;
    }
}
