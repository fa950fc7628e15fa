//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hound::WavReader;
use log::info;

use crate::config::PinchConfig;
use crate::control::ControlLoop;
use crate::engine::io::{TakeEncoder, WavEncoder};
use crate::engine::AudioGraphController;
use crate::error::{PinchError, Result};
use crate::session::{payload_digest, OfflineReport, OfflineSession, RecordWindow};
use crate::sim::{scripted_hand, GestureScript};

/// Options for [`render`]
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub input: PathBuf,
    pub script: Option<PathBuf>,
    pub take: Option<PathBuf>,
    pub monitor: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub record_from_ms: u64,
    pub record_to_ms: Option<u64>,
}

/// Load and validate a config file, or fall back to defaults
pub fn load_config(path: Option<&Path>) -> Result<PinchConfig> {
    let config = match path {
        Some(path) => PinchConfig::load(path)?,
        None => PinchConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Run a scripted performance over an audio file offline
pub fn render(opts: &RenderOptions) -> Result<OfflineReport> {
    let config = load_config(opts.config.as_deref())?;
    let script = match &opts.script {
        Some(path) => GestureScript::load(path)?,
        None => GestureScript::demo(),
    };
    let duration = script.duration();

    info!("Loading audio: {}", opts.input.display());
    let bytes = fs::read(&opts.input)?;
    let mut controller = AudioGraphController::new(&config.audio);
    controller.initialize_from_bytes(&bytes)?;

    let to_ms = opts.record_to_ms.unwrap_or(duration.as_millis() as u64);
    let window = if opts.take.is_some() {
        Some(RecordWindow::new(
            Duration::from_millis(opts.record_from_ms),
            Duration::from_millis(to_ms),
        )?)
    } else {
        None
    };

    let (camera, landmarks) = scripted_hand(script);
    let control = ControlLoop::start(Box::new(camera), Box::new(landmarks), &config, Duration::ZERO)?;
    let report = OfflineSession::new(&mut controller, control, config.control.tick_interval()).run(duration, window)?;
    controller.teardown();

    if let Some(path) = &opts.monitor {
        let payload = WavEncoder::new(config.audio.take_bit_depth).encode(&report.monitor)?;
        fs::write(path, payload)?;
        println!("Monitor output: {}", path.display());
    }

    match (&opts.take, &report.take) {
        (Some(path), Some(take)) => {
            take.write_to(path)?;
            println!("Take {} ({:.2}s): {}", take.id, take.duration_secs(), path.display());
            println!("SHA-256: {}", take.sha256);
        }
        (Some(_), None) => println!("Record window produced no take"),
        _ => {}
    }

    let final_mode = report
        .signals
        .last()
        .map(|(_, s)| s.mode.to_string())
        .unwrap_or_else(|| "pitch".to_string());
    println!(
        "Rendered {:.2}s with {} gesture ticks, final mode: {}",
        report.monitor.duration_secs(),
        report.signals.len(),
        final_mode
    );

    Ok(report)
}

/// Print the default configuration.
pub fn default_config() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&PinchConfig::default())?);
    Ok(())
}

/// Print the demo gesture script.
pub fn demo_script() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&GestureScript::demo())?);
    Ok(())
}

/// Summary of a take file
#[derive(Debug, Clone, PartialEq)]
pub struct TakeInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub frames: u32,
    pub sha256: String,
}

impl TakeInfo {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }
}

/// Read the header and digest of a take without decoding its samples
pub fn read_take_info(path: &Path) -> Result<TakeInfo> {
    let bytes = fs::read(path)?;
    let reader = WavReader::new(bytes.as_slice())
        .map_err(|e| PinchError::decode(format!("{} is not a WAV file", path.display()), e))?;
    let spec = reader.spec();
    Ok(TakeInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        frames: reader.duration(),
        sha256: payload_digest(&bytes),
    })
}

/// Show a take's format, duration and digest.
pub fn inspect_take(path: &Path) -> Result<()> {
    info!("Inspecting take: {}", path.display());
    let take = read_take_info(path)?;

    println!("Take: {}", path.display());
    println!("{:-<60}", "");
    println!("Duration:    {:.3}s", take.duration_secs());
    println!("Channels:    {}", take.channels);
    println!("Sample rate: {} Hz", take.sample_rate);
    println!("Bit depth:   {}", take.bits_per_sample);
    println!("SHA-256:     {}", take.sha256);

    Ok(())
}
