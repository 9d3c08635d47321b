use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::audio_models::AudioFormat;
use crate::processing::level::DetectionMethod;

/// Default time an episode may stay below the keepalive level before it is closed.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5);

/// Thresholds driving the trigger state machine.
///
/// `keepalive_level` may differ from `trigger_level` to give hysteresis: the
/// level needed to keep an episode alive is independent of the level needed
/// to start one. Both comparisons are strictly greater-than.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub trigger_level: f32,
    pub keepalive_level: f32,
    pub cooldown: Duration,
    pub detection: DetectionMethod,
}

impl TriggerConfig {
    /// Keepalive equal to the trigger level, 5 s cooldown, RMS detection.
    pub fn new(trigger_level: f32) -> Self {
        Self {
            trigger_level,
            keepalive_level: trigger_level,
            cooldown: DEFAULT_COOLDOWN,
            detection: DetectionMethod::default(),
        }
    }

    pub fn with_keepalive(mut self, keepalive_level: f32) -> Self {
        self.keepalive_level = keepalive_level;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_detection(mut self, detection: DetectionMethod) -> Self {
        self.detection = detection;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.trigger_level.is_finite() {
            return Err(format!("trigger level must be finite, got {}", self.trigger_level));
        }
        if !self.keepalive_level.is_finite() {
            return Err(format!("keepalive level must be finite, got {}", self.keepalive_level));
        }
        Ok(())
    }
}

/// Full configuration for a recorder run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfiguration {
    /// Capture format; also the format declared in every WAV file.
    pub format: AudioFormat,

    pub trigger: TriggerConfig,

    /// Directory where one WAV file per episode is created.
    pub output_directory: PathBuf,

    /// Frames per capture buffer; the level is evaluated once per buffer.
    pub frames_per_buffer: usize,

    /// Replace an existing file instead of failing the episode.
    pub overwrite: bool,
}

impl RecorderConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        self.format.validate()?;
        self.trigger.validate()?;
        if self.format.bits_per_sample != 16 {
            return Err(format!(
                "unsupported bit depth: {} (capture produces 16-bit samples)",
                self.format.bits_per_sample
            ));
        }
        if self.frames_per_buffer == 0 {
            return Err("frames per buffer must be positive".into());
        }
        Ok(())
    }

    /// Buffer length as wall-clock time.
    pub fn buffer_duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames_per_buffer as f64 / f64::from(self.format.sample_rate))
    }
}

impl Default for RecorderConfiguration {
    fn default() -> Self {
        let format = AudioFormat::default();
        Self {
            format,
            trigger: TriggerConfig::new(0.0),
            output_directory: PathBuf::from("."),
            frames_per_buffer: (format.sample_rate / 4) as usize,
            overwrite: false,
        }
    }
}
