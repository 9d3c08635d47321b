//! Command-line parsing and conversion into a validated configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use threshcorder_core::{AudioFormat, DetectionMethod, RecorderConfiguration, RecorderError, TriggerConfig};

/// Record a WAV file every time an audio input gets loud.
#[derive(Debug, Parser, Clone)]
#[command(name = "threshcorder", version, allow_negative_numbers = true)]
pub struct Args {
    /// Capture device name (`default` for the host default), a raw S16LE PCM
    /// file or FIFO, or `-` for raw PCM on stdin
    pub device: String,

    /// Directory receiving one WAV file per trigger episode
    pub output_dir: PathBuf,

    /// Level above which a recording starts
    pub trigger_threshold: f32,

    /// Level above which a running recording is kept alive [default: trigger threshold]
    pub keepalive_threshold: Option<f32>,

    /// Loudness detector: RMS or Peak
    #[arg(default_value = "RMS")]
    pub detection_method: DetectionMethod,

    /// Seconds below the keepalive level before a recording is closed
    #[arg(long, default_value_t = 5.0)]
    pub cooldown: f64,

    /// Capture sample rate in Hz
    #[arg(long, default_value_t = 44_100)]
    pub sample_rate: u32,

    /// Capture channel count
    #[arg(long, default_value_t = 1)]
    pub channels: u16,

    /// Frames per analysed buffer [default: a quarter second]
    #[arg(long)]
    pub buffer_frames: Option<usize>,

    /// Replace existing files instead of picking a new name
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    /// Print one JSON line per recording event on stdout
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl Args {
    pub fn to_configuration(&self) -> Result<RecorderConfiguration, RecorderError> {
        let format = AudioFormat::pcm16(self.sample_rate, self.channels)?;

        let cooldown = Duration::try_from_secs_f64(self.cooldown).map_err(|e| {
            RecorderError::ConfigurationFailed(format!(
                "cooldown must be a non-negative number of seconds, got {}: {}",
                self.cooldown, e
            ))
        })?;

        let trigger = TriggerConfig::new(self.trigger_threshold)
            .with_keepalive(self.keepalive_threshold.unwrap_or(self.trigger_threshold))
            .with_cooldown(cooldown)
            .with_detection(self.detection_method);

        let config = RecorderConfiguration {
            format,
            trigger,
            output_directory: self.output_dir.clone(),
            frames_per_buffer: self
                .buffer_frames
                .unwrap_or((self.sample_rate / 4).max(1) as usize),
            overwrite: self.overwrite,
        };
        config.validate().map_err(RecorderError::ConfigurationFailed)?;
        Ok(config)
    }
}
