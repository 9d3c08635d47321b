//! Concrete audio sources and the device-argument dispatch between them.

#[cfg(feature = "cpal")]
pub mod cpal_capture;
pub mod raw_pcm;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use threshcorder_core::{AudioFormat, AudioSource, RecorderError};

#[cfg(feature = "cpal")]
pub use cpal_capture::CpalSource;
pub use raw_pcm::RawPcmSource;

/// Device argument selecting raw PCM on stdin.
pub const STDIN_DEVICE: &str = "-";

/// Open the source named by `device`:
/// - `-` reads raw S16LE PCM from stdin
/// - an existing path (file, FIFO, character device) is read as raw S16LE PCM
/// - anything else names a live capture device
pub fn open_source(device: &str, format: AudioFormat) -> Result<Box<dyn AudioSource>, RecorderError> {
    if device == STDIN_DEVICE {
        log::info!("Reading raw PCM from stdin");
        return Ok(Box::new(RawPcmSource::new(io::stdin().lock(), format, "stdin")));
    }

    let path = Path::new(device);
    if path.exists() {
        let file = File::open(path)
            .map_err(|e| RecorderError::DeviceNotAvailable(format!("cannot open {}: {}", path.display(), e)))?;
        log::info!("Reading raw PCM from {}", path.display());
        return Ok(Box::new(RawPcmSource::new(BufReader::new(file), format, device)));
    }

    open_capture_device(device, format)
}

#[cfg(feature = "cpal")]
fn open_capture_device(device: &str, format: AudioFormat) -> Result<Box<dyn AudioSource>, RecorderError> {
    Ok(Box::new(CpalSource::open(device, format)?))
}

#[cfg(not(feature = "cpal"))]
fn open_capture_device(device: &str, _format: AudioFormat) -> Result<Box<dyn AudioSource>, RecorderError> {
    Err(RecorderError::ConfigurationFailed(format!(
        "'{device}' is not a file, and live capture devices need the `cpal` feature; \
         pass `-` to read raw PCM from stdin"
    )))
}
