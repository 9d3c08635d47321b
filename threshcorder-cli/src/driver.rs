//! Polling loop tying an audio source to the trigger recorder.
//!
//! Single-threaded: each iteration blocks on one buffer from the source, then
//! runs level detection and the state machine synchronously. Shutdown is
//! cooperative; the flag is checked between buffers, so a blocked read has
//! to complete (or fail) before the loop notices it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use threshcorder_core::{AudioSource, FrameBuffer, RecorderError, Transition, TriggerRecorder};

/// Counters reported when the loop exits cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub buffers: u64,
    pub episodes: u64,
    pub failed_episodes: u64,
}

pub struct Driver {
    source: Box<dyn AudioSource>,
    recorder: TriggerRecorder,
    frame: FrameBuffer,
    shutdown: Arc<AtomicBool>,
}

impl Driver {
    pub fn new(
        source: Box<dyn AudioSource>,
        recorder: TriggerRecorder,
        frames_per_buffer: usize,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        let frame = FrameBuffer::new(frames_per_buffer, source.format().channels);
        Self {
            source,
            recorder,
            frame,
            shutdown,
        }
    }

    /// Run until shutdown is requested or the source ends.
    ///
    /// Episode-level (file) errors are logged and the loop continues; any
    /// other error closes the open episode and is returned.
    pub fn run(&mut self) -> Result<RunSummary, RecorderError> {
        let mut summary = RunSummary::default();
        let started = Instant::now();
        let sample_rate = f64::from(self.source.format().sample_rate);
        let mut frames_read: u64 = 0;

        log::info!("Listening on {}", self.source.device_name());

        while !self.shutdown.load(Ordering::SeqCst) {
            match self.source.read_frame(&mut self.frame) {
                Ok(()) => {}
                Err(RecorderError::EndOfStream) => {
                    log::info!("Input stream ended");
                    break;
                }
                Err(e) => {
                    log::error!("Read from audio source failed: {}", e);
                    self.finish(&mut summary);
                    return Err(e);
                }
            }

            summary.buffers += 1;
            frames_read += self.frame.frame_capacity() as u64;

            let now = if self.source.is_realtime() {
                Instant::now()
            } else {
                started + Duration::from_secs_f64(frames_read as f64 / sample_rate)
            };

            match self.recorder.process_frame(self.frame.samples(), now) {
                Ok(Transition::Finished(_)) => summary.episodes += 1,
                Ok(_) => {}
                Err(e) if e.is_episode_fatal() => {
                    log::warn!("Recording abandoned: {}", e);
                    summary.failed_episodes += 1;
                }
                Err(e) => {
                    self.finish(&mut summary);
                    return Err(e);
                }
            }
        }

        self.finish(&mut summary);
        Ok(summary)
    }

    fn finish(&mut self, summary: &mut RunSummary) {
        match self.recorder.finish() {
            Ok(Some(_)) => summary.episodes += 1,
            Ok(None) => {}
            Err(e) => {
                log::error!("Failed to finalize recording: {}", e);
                summary.failed_episodes += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::fs;
    use std::path::{Path, PathBuf};

    use threshcorder_core::{AudioFormat, RecorderConfiguration, TriggerConfig, WavHeader};

    use super::*;

    const RATE: u32 = 100;
    const BUFFER: usize = 50; // half a second

    /// Replays scripted buffers; each entry is either a constant level or a failure.
    struct Scripted {
        buffers: VecDeque<Result<i16, RecorderError>>,
    }

    impl Scripted {
        fn new(buffers: impl IntoIterator<Item = Result<i16, RecorderError>>) -> Box<Self> {
            Box::new(Self {
                buffers: buffers.into_iter().collect(),
            })
        }
    }

    impl AudioSource for Scripted {
        fn format(&self) -> AudioFormat {
            AudioFormat::pcm16(RATE, 1).unwrap()
        }

        fn device_name(&self) -> String {
            "scripted".into()
        }

        fn read_into(&mut self, buf: &mut [i16]) -> Result<usize, RecorderError> {
            match self.buffers.pop_front() {
                Some(Ok(value)) => {
                    buf.fill(value);
                    Ok(buf.len())
                }
                Some(Err(e)) => Err(e),
                None => Err(RecorderError::EndOfStream),
            }
        }

        fn is_realtime(&self) -> bool {
            false
        }
    }

    struct Fixture {
        dir: PathBuf,
    }

    impl Fixture {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("threshcorder_driver_{}_{}", std::process::id(), name));
            let _ = fs::remove_dir_all(&dir);
            fs::create_dir_all(&dir).unwrap();
            Self { dir }
        }

        fn driver(&self, source: Box<dyn AudioSource>, shutdown: Arc<AtomicBool>) -> Driver {
            let config = RecorderConfiguration {
                format: AudioFormat::pcm16(RATE, 1).unwrap(),
                trigger: TriggerConfig::new(100.0),
                output_directory: self.dir.clone(),
                frames_per_buffer: BUFFER,
                overwrite: false,
            };
            let recorder = TriggerRecorder::new(&config).unwrap();
            Driver::new(source, recorder, BUFFER, shutdown)
        }

        fn wav_files(&self) -> Vec<PathBuf> {
            fs::read_dir(&self.dir).unwrap().map(|e| e.unwrap().path()).collect()
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.dir);
        }
    }

    fn data_size(path: &Path) -> u32 {
        WavHeader::parse(&fs::read(path).unwrap()).unwrap().data_size
    }

    #[test]
    fn records_one_episode_from_stream_time() {
        let fixture = Fixture::new("episode");
        // quiet, loud, then 12 quiet half-second buffers (6 s).
        let script = [Ok(0), Ok(500)].into_iter().chain((0..12).map(|_| Ok(0)));
        let mut driver = fixture.driver(Scripted::new(script), Arc::new(AtomicBool::new(false)));

        let summary = driver.run().unwrap();
        assert_eq!(
            summary,
            RunSummary {
                buffers: 14,
                episodes: 1,
                failed_episodes: 0
            }
        );

        let files = fixture.wav_files();
        assert_eq!(files.len(), 1);
        // Trigger buffer plus ten quiet buffers inside the 5 s cooldown.
        assert_eq!(data_size(&files[0]), 11 * BUFFER as u32 * 2);
    }

    #[test]
    fn end_of_stream_finalizes_open_episode() {
        let fixture = Fixture::new("eos");
        let mut driver = fixture.driver(Scripted::new([Ok(500), Ok(0), Ok(0)]), Arc::new(AtomicBool::new(false)));

        let summary = driver.run().unwrap();
        assert_eq!(summary.episodes, 1);
        assert_eq!(data_size(&fixture.wav_files()[0]), 3 * BUFFER as u32 * 2);
    }

    #[test]
    fn device_failure_is_fatal_but_file_is_finalized() {
        let fixture = Fixture::new("short_read");
        let script = [
            Ok(500),
            Ok(0),
            Err(RecorderError::ShortRead {
                expected: BUFFER,
                actual: 10,
            }),
            Ok(500),
        ];
        let mut driver = fixture.driver(Scripted::new(script), Arc::new(AtomicBool::new(false)));

        let err = driver.run().unwrap_err();
        assert!(matches!(err, RecorderError::ShortRead { .. }));
        assert_eq!(data_size(&fixture.wav_files()[0]), 2 * BUFFER as u32 * 2);
    }

    #[test]
    fn shutdown_flag_stops_before_reading() {
        let fixture = Fixture::new("shutdown");
        let mut driver = fixture.driver(Scripted::new([Ok(500)]), Arc::new(AtomicBool::new(true)));

        assert_eq!(driver.run().unwrap(), RunSummary::default());
        assert!(fixture.wav_files().is_empty());
    }

    #[test]
    fn unwritable_output_is_not_fatal() {
        let fixture = Fixture::new("unwritable");
        let config = RecorderConfiguration {
            format: AudioFormat::pcm16(RATE, 1).unwrap(),
            trigger: TriggerConfig::new(100.0),
            output_directory: fixture.dir.join("missing"),
            frames_per_buffer: BUFFER,
            overwrite: false,
        };
        let recorder = TriggerRecorder::new(&config).unwrap();
        let source = Scripted::new([Ok(500), Ok(500), Ok(0)]);
        let mut driver = Driver::new(source, recorder, BUFFER, Arc::new(AtomicBool::new(false)));

        let summary = driver.run().unwrap();
        assert_eq!(summary.buffers, 3);
        assert_eq!(summary.episodes, 0);
        assert_eq!(summary.failed_episodes, 2);
    }
}
