//! Live capture through CPAL.
//!
//! The device is opened for interleaved signed 16-bit samples at the requested
//! rate and channel count, matching the format declared in the WAV files.
//! CPAL delivers audio on its own callback thread; buffers are handed over a
//! bounded channel and reassembled into fixed-size frames on the caller's side.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Receiver, TrySendError};
use threshcorder_core::{AudioFormat, AudioSource, RecorderError};

/// Callback buffers held before the reader falls behind and data is dropped.
const CHANNEL_CAPACITY: usize = 256;

pub struct CpalSource {
    // Capture stops when the stream is dropped.
    _stream: cpal::Stream,
    receiver: Receiver<Vec<i16>>,
    pending: Vec<i16>,
    pending_pos: usize,
    format: AudioFormat,
    name: String,
}

impl CpalSource {
    /// Open `device` (`default` for the host default input) for capture.
    pub fn open(device: &str, format: AudioFormat) -> Result<Self, RecorderError> {
        let host = cpal::default_host();
        let input = if device == "default" {
            host.default_input_device()
                .ok_or_else(|| RecorderError::DeviceNotAvailable("no default input device".into()))?
        } else {
            let mut devices = host
                .input_devices()
                .map_err(|e| RecorderError::DeviceNotAvailable(format!("cannot list input devices: {e}")))?;
            devices
                .find(|d| d.name().map(|n| n == device).unwrap_or(false))
                .ok_or_else(|| RecorderError::DeviceNotAvailable(format!("input device '{device}' not found")))?
        };
        let name = input.name().unwrap_or_else(|_| device.to_string());

        let config = cpal::StreamConfig {
            channels: format.channels,
            sample_rate: cpal::SampleRate(format.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let (sender, receiver) = bounded::<Vec<i16>>(CHANNEL_CAPACITY);
        let err_fn = |err| log::error!("Audio stream error: {}", err);

        let stream = input
            .build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| match sender.try_send(data.to_vec()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => log::warn!("Capture overrun, dropped {} samples", data.len()),
                    Err(TrySendError::Disconnected(_)) => {}
                },
                err_fn,
                None,
            )
            .map_err(|e| {
                RecorderError::DeviceNotAvailable(format!(
                    "cannot configure '{name}' for {} Hz, {} channel(s), S16: {e}",
                    format.sample_rate, format.channels
                ))
            })?;

        stream
            .play()
            .map_err(|e| RecorderError::DeviceNotAvailable(format!("cannot start capture on '{name}': {e}")))?;

        log::info!(
            "Capturing from '{}' at {} Hz, {} channel(s)",
            name,
            format.sample_rate,
            format.channels
        );

        Ok(Self {
            _stream: stream,
            receiver,
            pending: Vec::new(),
            pending_pos: 0,
            format,
            name,
        })
    }
}

impl AudioSource for CpalSource {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn device_name(&self) -> String {
        self.name.clone()
    }

    fn read_into(&mut self, buf: &mut [i16]) -> Result<usize, RecorderError> {
        let mut filled = 0;
        while filled < buf.len() {
            if self.pending_pos == self.pending.len() {
                self.pending = self
                    .receiver
                    .recv()
                    .map_err(|_| RecorderError::DeviceNotAvailable(format!("capture stream on '{}' closed", self.name)))?;
                self.pending_pos = 0;
            }
            let n = (buf.len() - filled).min(self.pending.len() - self.pending_pos);
            buf[filled..filled + n].copy_from_slice(&self.pending[self.pending_pos..self.pending_pos + n]);
            filled += n;
            self.pending_pos += n;
        }
        Ok(filled)
    }
}
