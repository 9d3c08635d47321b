use std::collections::HashSet;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Local};

use crate::models::audio_models::AudioFormat;
use crate::models::config::{RecorderConfiguration, TriggerConfig};
use crate::models::error::RecorderError;
use crate::models::recording_result::{EpisodeEnd, RecordingResult};
use crate::models::state::TriggerState;
use crate::storage::checksum;
use crate::storage::wav_writer::{self, WavWriter};
use crate::traits::recorder_delegate::RecorderDelegate;

/// `strftime` pattern for episode file stems.
pub const FILENAME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Suffixed names tried after the timestamp name is taken.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Opens the destination for a new episode: `(path, overwrite) -> sink`.
pub type SinkOpener<W> = Box<dyn FnMut(&Path, bool) -> Result<W, RecorderError>>;

/// One open recording: exists only while the machine is recording.
struct Episode<W: Write + Seek> {
    writer: WavWriter<W>,
    last_active: Instant,
    created_at: DateTime<Local>,
}

/// Outcome of feeding one buffer to the recorder.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Idle before and after; nothing written.
    Idle,
    /// A new episode was opened and the triggering buffer written to it.
    Started(PathBuf),
    /// The buffer was appended to the open episode.
    Continued,
    /// The cooldown expired; the episode was finalized without this buffer.
    Finished(RecordingResult),
}

/// Threshold-triggered recording state machine.
///
/// Feed it one buffer at a time with the time it was captured:
/// ```text
/// idle      ── level > trigger ─────────────────▶ open file, append, recording
/// idle      ── otherwise ───────────────────────▶ idle
/// recording ── level <= keepalive and
///              now - last_active > cooldown ─────▶ close file, idle
/// recording ── otherwise ───────────────────────▶ append
///                                                 (level > keepalive: last_active = now)
/// ```
/// A failed append finalizes what was written and drops back to idle; the
/// error is returned so the caller can decide how fatal it is.
///
/// `overwrite` only applies to files that were not created by this recorder:
/// an episode never replaces the file of an earlier episode, even when both
/// start within the same second.
pub struct TriggerRecorder<W: Write + Seek = File> {
    config: TriggerConfig,
    format: AudioFormat,
    output_directory: PathBuf,
    overwrite: bool,
    open_sink: SinkOpener<W>,
    issued: HashSet<PathBuf>,
    episode: Option<Episode<W>>,
    delegate: Option<Box<dyn RecorderDelegate>>,
    last_level: f32,
}

impl TriggerRecorder<File> {
    /// Recorder writing one file per episode into the configured directory.
    pub fn new(config: &RecorderConfiguration) -> Result<Self, RecorderError> {
        Self::with_sink_opener(config, Box::new(wav_writer::open_output_file))
    }
}

impl<W: Write + Seek> TriggerRecorder<W> {
    /// Recorder whose episode destinations come from `open_sink`.
    pub fn with_sink_opener(config: &RecorderConfiguration, open_sink: SinkOpener<W>) -> Result<Self, RecorderError> {
        config.validate().map_err(RecorderError::ConfigurationFailed)?;

        Ok(Self {
            config: config.trigger,
            format: config.format,
            output_directory: config.output_directory.clone(),
            overwrite: config.overwrite,
            open_sink,
            issued: HashSet::new(),
            episode: None,
            delegate: None,
            last_level: 0.0,
        })
    }

    pub fn set_delegate(&mut self, delegate: Box<dyn RecorderDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Level computed for the most recent buffer.
    pub fn last_level(&self) -> f32 {
        self.last_level
    }

    pub fn state(&self) -> TriggerState {
        match &self.episode {
            None => TriggerState::Idle,
            Some(episode) => TriggerState::Recording {
                file_path: episode.writer.path().to_path_buf(),
                duration_secs: episode.writer.duration_secs(),
            },
        }
    }

    /// Measure `samples` with the configured detector and advance the machine.
    pub fn process_frame(&mut self, samples: &[i16], now: Instant) -> Result<Transition, RecorderError> {
        let level = self.config.detection.compute_level(samples);
        self.step(samples, level, now)
    }

    /// Advance the machine with a precomputed level.
    pub fn step(&mut self, samples: &[i16], level: f32, now: Instant) -> Result<Transition, RecorderError> {
        self.last_level = level;
        match self.episode.take() {
            None => self.step_idle(samples, level, now),
            Some(episode) => self.step_recording(episode, samples, level, now),
        }
    }

    /// Close the open episode, if any. Call on shutdown.
    pub fn finish(&mut self) -> Result<Option<RecordingResult>, RecorderError> {
        match self.episode.take() {
            Some(episode) => self.close_episode(episode, EpisodeEnd::Shutdown).map(Some),
            None => Ok(None),
        }
    }

    // --- Internal helpers ---

    fn step_idle(&mut self, samples: &[i16], level: f32, now: Instant) -> Result<Transition, RecorderError> {
        log::debug!("Level: {}", level);

        // An empty buffer measures 0.0 but carries no signal to react to.
        if samples.is_empty() || !(level > self.config.trigger_level) {
            return Ok(Transition::Idle);
        }

        let created_at = Local::now();
        let writer = self.open_writer(&created_at).map_err(|e| self.report(e))?;
        let file_path = writer.path().to_path_buf();

        log::info!(
            "Triggered at level {} (> {}), recording to {}",
            level,
            self.config.trigger_level,
            file_path.display()
        );

        let mut episode = Episode {
            writer,
            last_active: now,
            created_at,
        };
        if let Err(e) = episode.writer.append(samples) {
            return Err(self.abandon(episode, e));
        }

        self.episode = Some(episode);
        if let Some(ref delegate) = self.delegate {
            delegate.on_triggered(&file_path, level);
        }
        Ok(Transition::Started(file_path))
    }

    fn step_recording(
        &mut self,
        mut episode: Episode<W>,
        samples: &[i16],
        level: f32,
        now: Instant,
    ) -> Result<Transition, RecorderError> {
        let keeps_alive = level > self.config.keepalive_level;
        let quiet_for = now.saturating_duration_since(episode.last_active);

        if !keeps_alive && quiet_for > self.config.cooldown {
            let result = self.close_episode(episode, EpisodeEnd::Cooldown)?;
            return Ok(Transition::Finished(result));
        }

        if let Err(e) = episode.writer.append(samples) {
            return Err(self.abandon(episode, e));
        }
        if keeps_alive {
            episode.last_active = now;
        }

        log::trace!(
            "Recording {}: level {}, quiet for {:.2}s",
            episode.writer.path().display(),
            level,
            quiet_for.as_secs_f64()
        );

        self.episode = Some(episode);
        Ok(Transition::Continued)
    }

    /// Create a writer named after `created_at`, adding `_N` suffixes while
    /// the name is taken on disk or was already used by this recorder.
    fn open_writer(&mut self, created_at: &DateTime<Local>) -> Result<WavWriter<W>, RecorderError> {
        let stem = created_at.format(FILENAME_FORMAT).to_string();
        let mut taken = PathBuf::new();

        for attempt in 0..=MAX_NAME_ATTEMPTS {
            let path = self.output_directory.join(episode_file_name(&stem, attempt));

            if self.issued.contains(&path) {
                log::debug!("{} was written earlier in this run, trying another name", path.display());
                taken = path;
                continue;
            }

            match (self.open_sink)(&path, self.overwrite) {
                Ok(sink) => {
                    let writer = WavWriter::from_sink(path.clone(), sink, self.format)?;
                    self.issued.insert(path);
                    return Ok(writer);
                }
                Err(RecorderError::AlreadyExists(path)) => {
                    log::debug!("{} already exists, trying another name", path.display());
                    taken = path;
                }
                Err(e) => return Err(e),
            }
        }

        Err(RecorderError::AlreadyExists(taken))
    }

    fn close_episode(&self, episode: Episode<W>, end: EpisodeEnd) -> Result<RecordingResult, RecorderError> {
        let Episode {
            mut writer,
            created_at,
            ..
        } = episode;

        writer.close().map_err(|e| self.report(e))?;

        let file_path = writer.path().to_path_buf();
        let checksum = match checksum::sha256_file(&file_path) {
            Ok(checksum) => Some(checksum),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        };

        let result = RecordingResult {
            file_path,
            created_at: created_at.to_rfc3339(),
            duration_secs: writer.duration_secs(),
            frames: writer.frames_written(),
            data_bytes: writer.data_bytes(),
            checksum,
            end,
        };

        log::info!(
            "Closed {} after {:.2}s of audio ({:?})",
            result.file_path.display(),
            result.duration_secs,
            end
        );

        if let Some(ref delegate) = self.delegate {
            delegate.on_episode_finished(&result);
        }
        Ok(result)
    }

    /// Finalize a failing episode and hand back the error that ended it.
    fn abandon(&self, episode: Episode<W>, error: RecorderError) -> RecorderError {
        log::error!("Abandoning episode {}: {}", episode.writer.path().display(), error);
        // A close failure is already reported; the append error is the one to surface.
        let _ = self.close_episode(episode, EpisodeEnd::WriteFailed);
        self.report(error)
    }

    fn report(&self, error: RecorderError) -> RecorderError {
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(&error);
        }
        error
    }
}

/// `<stem>.wav` for the first attempt, then `<stem>_<attempt>.wav`.
fn episode_file_name(stem: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{stem}.wav")
    } else {
        format!("{stem}_{attempt}.wav")
    }
}
