use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::models::audio_models::AudioFormat;
use crate::models::error::RecorderError;
use crate::processing::wav_format::{self, DATA_SIZE_OFFSET, MAX_DATA_SIZE, RIFF_SIZE_OFFSET};

/// Append-only streaming WAV writer.
///
/// ## File Format
///
/// ```text
/// [44-byte WAV header, sizes zeroed until close]
/// [interleaved little-endian PCM frames...]
/// ```
///
/// The header is written as soon as the writer exists. The RIFF and data
/// size fields cannot be known up front, so `close` seeks back and patches
/// them from the count of bytes that were durably appended. Dropping an open
/// writer closes it, so every exit path that returns control to the owner
/// leaves a consistent file behind.
///
/// A writer owns its destination exclusively. It is not `Clone`; moving it
/// transfers the obligation to finalize.
pub struct WavWriter<W: Write + Seek = File> {
    path: PathBuf,
    format: AudioFormat,
    sink: Option<W>,
    data_bytes: u32,
    scratch: Vec<u8>,
}

impl WavWriter<File> {
    /// Create `path` and write the provisional header.
    ///
    /// Fails with `AlreadyExists` (before touching the file) when `path`
    /// exists and `overwrite` is false.
    pub fn create(path: impl Into<PathBuf>, format: AudioFormat, overwrite: bool) -> Result<Self, RecorderError> {
        let path = path.into();
        format.validate().map_err(RecorderError::ConfigurationFailed)?;
        let file = open_output_file(&path, overwrite)?;
        Self::from_sink(path, file, format)
    }
}

/// Open `path` for a new recording. Without `overwrite` an existing file is
/// never opened, let alone truncated.
pub fn open_output_file(path: &Path, overwrite: bool) -> Result<File, RecorderError> {
    if !overwrite && path.exists() {
        return Err(RecorderError::AlreadyExists(path.to_path_buf()));
    }

    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    options.open(path).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => RecorderError::AlreadyExists(path.to_path_buf()),
        _ => RecorderError::Io(format!("could not open file {}: {}", path.display(), e)),
    })
}

impl<W: Write + Seek> WavWriter<W> {
    /// Wrap an already-open seekable sink. `path` is only used for reporting.
    pub fn from_sink(path: impl Into<PathBuf>, mut sink: W, format: AudioFormat) -> Result<Self, RecorderError> {
        let path = path.into();
        format.validate().map_err(RecorderError::ConfigurationFailed)?;

        let header = wav_format::generate_wav_header(&format, 0);
        sink.write_all(&header)
            .map_err(|e| RecorderError::Io(format!("failed to write header to {}: {}", path.display(), e)))?;

        log::debug!("Opened {} ({:?})", path.display(), format);

        Ok(Self {
            path,
            format,
            sink: Some(sink),
            data_bytes: 0,
            scratch: Vec::new(),
        })
    }

    /// Append interleaved 16-bit samples. Returns the number of frames written.
    ///
    /// On failure nothing is counted, so the header patched at close covers
    /// only data that was fully handed to the sink.
    pub fn append(&mut self, samples: &[i16]) -> Result<usize, RecorderError> {
        if self.sink.is_none() {
            return Err(RecorderError::WriterClosed);
        }
        if self.format.bits_per_sample != 16 {
            return Err(RecorderError::ConfigurationFailed(format!(
                "cannot append 16-bit samples to a {}-bit file",
                self.format.bits_per_sample
            )));
        }
        if samples.len() % usize::from(self.format.channels) != 0 {
            return Err(RecorderError::ShortWrite(format!(
                "{} samples is not a whole number of {}-channel frames",
                samples.len(),
                self.format.channels
            )));
        }

        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        scratch.reserve(samples.len() * 2);
        for sample in samples {
            scratch.extend_from_slice(&sample.to_le_bytes());
        }
        let result = self.write_frames(&scratch);
        self.scratch = scratch;
        result
    }

    /// Append already-encoded frames. `data` must hold whole frames.
    pub fn append_bytes(&mut self, data: &[u8]) -> Result<usize, RecorderError> {
        if self.sink.is_none() {
            return Err(RecorderError::WriterClosed);
        }
        if data.len() % self.format.frame_size() != 0 {
            return Err(RecorderError::ShortWrite(format!(
                "{} bytes is not a whole number of {}-byte frames",
                data.len(),
                self.format.frame_size()
            )));
        }
        self.write_frames(data)
    }

    fn write_frames(&mut self, data: &[u8]) -> Result<usize, RecorderError> {
        let len = u32::try_from(data.len())
            .ok()
            .filter(|&len| len <= MAX_DATA_SIZE - self.data_bytes)
            .ok_or_else(|| {
                RecorderError::Io(format!(
                    "appending {} bytes to {} would exceed the 4 GiB WAV limit",
                    data.len(),
                    self.path.display()
                ))
            })?;

        let sink = self.sink.as_mut().ok_or(RecorderError::WriterClosed)?;
        sink.write_all(data).map_err(|e| {
            RecorderError::ShortWrite(format!(
                "failed to append {} bytes to {}: {}",
                data.len(),
                self.path.display(),
                e
            ))
        })?;

        self.data_bytes += len;
        Ok(data.len() / self.format.frame_size())
    }

    /// Patch the header size fields and release the destination.
    ///
    /// Idempotent: later calls are no-ops. The destination is released even
    /// when patching fails.
    pub fn close(&mut self) -> Result<(), RecorderError> {
        let Some(mut sink) = self.sink.take() else {
            return Ok(());
        };

        finalize(&mut sink, self.data_bytes)
            .map_err(|e| RecorderError::Io(format!("failed to finalize {}: {}", self.path.display(), e)))?;

        log::debug!("Closed {} ({} data bytes)", self.path.display(), self.data_bytes);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.sink.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Bytes of sample data successfully appended so far.
    pub fn data_bytes(&self) -> u32 {
        self.data_bytes
    }

    pub fn frames_written(&self) -> u64 {
        u64::from(self.data_bytes) / self.format.frame_size() as u64
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames_written() as f64 / f64::from(self.format.sample_rate)
    }
}

impl<W: Write + Seek> Drop for WavWriter<W> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("{}", e);
        }
    }
}

fn finalize<W: Write + Seek>(sink: &mut W, data_size: u32) -> io::Result<()> {
    sink.seek(SeekFrom::Start(RIFF_SIZE_OFFSET))?;
    sink.write_all(&wav_format::riff_chunk_size(data_size).to_le_bytes())?;
    sink.seek(SeekFrom::Start(DATA_SIZE_OFFSET))?;
    sink.write_all(&data_size.to_le_bytes())?;
    sink.seek(SeekFrom::End(0))?;
    sink.flush()
}
