// bb60c-probe: command-line tool for exercising the BB60C driver against the
// simulated SDK or, when built with `--features bb-api`, real hardware.
//
// Usage:
//   bb60c-probe list
//   bb60c-probe --args "serial=11223344" info
//   bb60c-probe stream --frequency 2.44e9 --rate 2e6 --buffers 8
//   bb60c-probe stream --profile "ISM survey" --format CS16
//   bb60c-probe profile save "ISM survey" --frequency 2.44e9 --gain-mode manual --rf-gain 2
//   bb60c-probe profile list
//
// Logging goes through env_logger; set RUST_LOG=bb60c_lib=debug for the
// full command trace.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use num_complex::Complex;

use bb60c_lib::adapters::SimulatedSdk;
use bb60c_lib::device::Bb60Device;
use bb60c_lib::domain::{
    ApplyPolicy, DeviceProfile, Direction, GainMode, ProfileStore, SampleBuffer, StreamFormat,
};
use bb60c_lib::ports::HardwareSdk;
use bb60c_lib::registry;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Probe, configure and stream from Signal Hound BB60C receivers.
#[derive(Parser)]
#[command(name = "bb60c-probe", version, about)]
struct Cli {
    /// Construction arguments, e.g. "serial=11223344, port1=EXT_REF_IN_AC"
    #[arg(long, default_value = "")]
    args: String,

    /// Use the vendor API instead of the simulator
    #[cfg(feature = "bb-api")]
    #[arg(long)]
    hardware: bool,

    /// Serial numbers the simulator reports
    #[arg(long, value_delimiter = ',', default_value = "11223344")]
    sim_serials: Vec<u32>,

    /// Directory holding saved profiles
    #[arg(long, default_value = "profiles")]
    profile_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List attached devices.
    List,

    /// Print hardware info, sensors, and capabilities.
    Info,

    /// Configure the device and read a number of buffers.
    Stream {
        #[command(flatten)]
        tune: TuneArgs,

        /// Apply a saved profile before the flags above
        #[arg(long)]
        profile: Option<String>,

        #[arg(long, value_enum, default_value_t = FormatArg::Cf32)]
        format: FormatArg,

        /// Number of buffers to read
        #[arg(long, default_value_t = 4)]
        buffers: usize,

        /// Samples per buffer
        #[arg(long, default_value_t = 16384)]
        samples: usize,

        /// Per-read timeout in milliseconds
        #[arg(long, default_value_t = 1000)]
        timeout_ms: u64,
    },

    /// Profile operations.
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// List saved profiles.
    List,
    /// Print a saved profile as JSON.
    Show { name: String },
    /// Save a profile built from the default settings and the given flags.
    Save {
        name: String,
        #[command(flatten)]
        tune: TuneArgs,
        /// Surface hardware command failures when the profile is applied
        #[arg(long)]
        strict: bool,
    },
    /// Delete a saved profile.
    Delete { name: String },
}

#[derive(Args, Default)]
struct TuneArgs {
    /// Center frequency in Hz
    #[arg(long)]
    frequency: Option<f64>,
    /// Sample rate in S/s (rounded up to the next achievable rate)
    #[arg(long)]
    rate: Option<f64>,
    /// IQ bandwidth ceiling in Hz
    #[arg(long)]
    bandwidth: Option<f64>,
    #[arg(long, value_enum)]
    gain_mode: Option<GainModeArg>,
    /// RF gain index 0-3 (manual mode)
    #[arg(long)]
    rf_gain: Option<i32>,
    /// Attenuation in dB, 0-30 (manual mode)
    #[arg(long)]
    atten: Option<f64>,
    /// Reference level in dBm (reference-level mode)
    #[arg(long)]
    ref_level: Option<f64>,
    #[arg(long)]
    port1: Option<String>,
    #[arg(long)]
    port2: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum GainModeArg {
    Manual,
    Ref,
}

impl From<GainModeArg> for GainMode {
    fn from(arg: GainModeArg) -> Self {
        match arg {
            GainModeArg::Manual => GainMode::Manual,
            GainModeArg::Ref => GainMode::ReferenceLevel,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    #[value(name = "CF32")]
    Cf32,
    #[value(name = "CS16")]
    Cs16,
}

impl From<FormatArg> for StreamFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Cf32 => StreamFormat::Cf32,
            FormatArg::Cs16 => StreamFormat::Cs16,
        }
    }
}

impl TuneArgs {
    /// Overlay the given flags onto a profile
    fn apply_to(&self, profile: &mut DeviceProfile) {
        if let Some(hz) = self.frequency {
            profile.frequency_hz = hz;
        }
        if self.rate.is_some() {
            profile.sample_rate_hz = self.rate;
        }
        if self.bandwidth.is_some() {
            profile.bandwidth_hz = self.bandwidth;
        }
        if let Some(mode) = self.gain_mode {
            profile.gain_mode = mode.into();
        }
        if let Some(gain) = self.rf_gain {
            profile.rf_gain = gain;
        }
        if let Some(atten) = self.atten {
            profile.attenuation_db = atten;
        }
        if let Some(level) = self.ref_level {
            profile.reference_level_db = level;
        }
        if let Some(port) = &self.port1 {
            profile.port1 = port.clone();
        }
        if let Some(port) = &self.port2 {
            profile.port2 = port.clone();
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let sdk = make_sdk(&cli);

    match &cli.command {
        Command::List => cmd_list(sdk.as_ref()),
        Command::Info => cmd_info(sdk.as_ref(), &cli),
        Command::Stream {
            tune,
            profile,
            format,
            buffers,
            samples,
            timeout_ms,
        } => {
            let mut device = open(sdk.as_ref(), &cli)?;
            configure(&mut device, &cli, tune, profile.as_deref())?;
            cmd_stream(
                &mut device,
                (*format).into(),
                *buffers,
                *samples,
                Duration::from_millis(*timeout_ms),
            )
        }
        Command::Profile { action } => cmd_profile(&cli, action),
    }
}

#[cfg(feature = "bb-api")]
fn make_sdk(cli: &Cli) -> Box<dyn HardwareSdk> {
    if cli.hardware {
        return Box::new(bb60c_lib::adapters::BbApi);
    }
    Box::new(SimulatedSdk::new(cli.sim_serials.clone()))
}

#[cfg(not(feature = "bb-api"))]
fn make_sdk(cli: &Cli) -> Box<dyn HardwareSdk> {
    Box::new(SimulatedSdk::new(cli.sim_serials.clone()))
}

fn open(sdk: &dyn HardwareSdk, cli: &Cli) -> Result<Bb60Device> {
    let args = registry::parse_kwargs(&cli.args)?;
    let device = registry::construct(sdk, &args).context("failed to open device")?;
    Ok(device)
}

fn cmd_list(sdk: &dyn HardwareSdk) -> Result<()> {
    let devices = registry::probe(sdk);
    if devices.is_empty() {
        println!("No {} devices found", registry::DRIVER_KEY);
    }
    for device in devices {
        println!("{}", registry::format_kwargs(&device.to_kwargs()));
    }
    Ok(())
}

fn cmd_info(sdk: &dyn HardwareSdk, cli: &Cli) -> Result<()> {
    let device = open(sdk, cli)?;

    println!("Driver:   {}", device.driver_key());
    println!("Hardware: {}", device.hardware_key());
    for (key, value) in device.hardware_info().to_kwargs() {
        println!("  {key:<13} {value}");
    }

    println!("Sensors:");
    for key in device.list_sensors() {
        let info = device.sensor_info(key)?;
        match device.read_sensor(key) {
            Ok(value) => println!("  {key:<6} {value:>8.2} {}", info.units),
            Err(e) => println!("  {key:<6} unavailable ({e})"),
        }
    }

    println!("Channels: {} RX", device.num_channels(Direction::Rx));
    let range = device.frequency_range();
    println!(
        "Frequency: {:.3} MHz - {:.3} MHz",
        range.minimum / 1e6,
        range.maximum / 1e6
    );
    println!("Gains:");
    for name in device.list_gains() {
        let range = device.gain_range(name)?;
        println!("  {name:<4} {} .. {}", range.minimum, range.maximum);
    }
    let rates: Vec<String> = device
        .list_sample_rates()
        .iter()
        .map(|r| format!("{r}"))
        .collect();
    println!("Sample rates: {}", rates.join(", "));
    let formats: Vec<&str> = device
        .stream_formats(Direction::Rx)
        .iter()
        .map(|f| f.as_str())
        .collect();
    println!("Formats: {}", formats.join(", "));

    println!("Settings:");
    for info in device.setting_info() {
        println!("  {} ({}): {}", info.key, info.name, info.options.join(" | "));
    }
    Ok(())
}

fn configure(
    device: &mut Bb60Device,
    cli: &Cli,
    tune: &TuneArgs,
    profile: Option<&str>,
) -> Result<()> {
    let mut settings = match profile {
        Some(name) => ProfileStore::open(&cli.profile_dir)?.load(name)?,
        None => device.to_profile("command line"),
    };
    tune.apply_to(&mut settings);
    device.apply_profile(&settings)?;

    let state = device.state();
    println!(
        "Tuned {:.6} MHz, {} S/s (decimation {}), bandwidth {:.0} Hz",
        state.center_frequency_hz / 1e6,
        device.sample_rate(),
        state.decimation,
        device.bandwidth()
    );
    Ok(())
}

fn cmd_stream(
    device: &mut Bb60Device,
    format: StreamFormat,
    buffers: usize,
    samples: usize,
    timeout: Duration,
) -> Result<()> {
    let stream = device.setup_stream(Direction::Rx, format.as_str(), &[0])?;
    device.activate_stream(&stream, 0, samples)?;

    let mut cf32 = vec![Complex::<f32>::default(); samples];
    let mut cs16 = vec![Complex::<i16>::default(); samples];
    let mut total = 0usize;

    for i in 0..buffers {
        let buffer = match format {
            StreamFormat::Cf32 => SampleBuffer::Cf32(&mut cf32),
            StreamFormat::Cs16 => SampleBuffer::Cs16(&mut cs16),
        };
        let count = device.read_stream(&stream, buffer, timeout)?;
        total += count;

        let peak = match format {
            StreamFormat::Cf32 => cf32[..count].iter().map(|s| s.norm()).fold(0.0, f32::max),
            StreamFormat::Cs16 => cs16[..count]
                .iter()
                .map(|s| (f32::from(s.re).hypot(f32::from(s.im))) / f32::from(i16::MAX))
                .fold(0.0, f32::max),
        };
        println!("buffer {i:>3}: {count:>6} samples, peak {peak:.3}");
    }

    device.deactivate_stream(&stream, 0)?;
    device.close_stream(stream);
    println!(
        "Read {total} samples in {buffers} buffers, {} overruns",
        device.overruns()
    );
    Ok(())
}

fn cmd_profile(cli: &Cli, action: &ProfileAction) -> Result<()> {
    let store = ProfileStore::open(&cli.profile_dir)?;
    match action {
        ProfileAction::List => {
            for name in store.list()? {
                println!("{name}");
            }
        }
        ProfileAction::Show { name } => {
            let profile = store.load(name)?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        ProfileAction::Save { name, tune, strict } => {
            let mut profile = DeviceProfile {
                name: name.clone(),
                ..DeviceProfile::default()
            };
            tune.apply_to(&mut profile);
            if *strict {
                profile.policy = ApplyPolicy::Strict;
            }
            store.save(&profile)?;
            println!("Saved '{name}' to {}", cli.profile_dir.display());
        }
        ProfileAction::Delete { name } => {
            store.delete(name)?;
            println!("Deleted '{name}'");
        }
    }
    Ok(())
}
