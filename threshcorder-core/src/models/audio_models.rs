use serde::{Deserialize, Serialize};

use super::error::RecorderError;

/// Linear PCM layout shared by the capture source and the WAV writer.
///
/// Immutable once a writer has been created from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl AudioFormat {
    /// Validated constructor. Bits per sample must be a non-zero multiple of 8.
    pub fn new(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Result<Self, RecorderError> {
        let format = Self {
            sample_rate,
            channels,
            bits_per_sample,
        };
        format.validate().map_err(RecorderError::ConfigurationFailed)?;
        Ok(format)
    }

    /// Signed 16-bit PCM, the only sample type the capture path produces.
    pub fn pcm16(sample_rate: u32, channels: u16) -> Result<Self, RecorderError> {
        Self::new(sample_rate, channels, 16)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.channels == 0 {
            return Err("channel count must be positive".into());
        }
        if self.bits_per_sample == 0 || self.bits_per_sample % 8 != 0 {
            return Err(format!(
                "bits per sample must be a non-zero multiple of 8, got {}",
                self.bits_per_sample
            ));
        }
        let block_align = self.channels.checked_mul(self.bits_per_sample / 8).ok_or_else(|| {
            format!(
                "{} channels of {}-bit samples do not fit a WAV block",
                self.channels, self.bits_per_sample
            )
        })?;
        if self.sample_rate.checked_mul(u32::from(block_align)).is_none() {
            return Err(format!(
                "byte rate of {} Hz x {} bytes per frame does not fit 32 bits",
                self.sample_rate, block_align
            ));
        }
        Ok(())
    }

    /// Bytes per single-channel sample.
    pub fn sample_size(&self) -> usize {
        usize::from(self.bits_per_sample / 8)
    }

    /// Bytes per interleaved frame (one sample per channel).
    pub fn frame_size(&self) -> usize {
        self.sample_size() * usize::from(self.channels)
    }

    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.block_align())
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 1,
            bits_per_sample: 16,
        }
    }
}

/// Fixed-capacity buffer of interleaved 16-bit samples filled by an audio source.
///
/// `len` is the number of valid samples; a completed read always fills the buffer.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    samples: Vec<i16>,
    len: usize,
    channels: u16,
}

impl FrameBuffer {
    pub fn new(frames: usize, channels: u16) -> Self {
        Self {
            samples: vec![0; frames * usize::from(channels)],
            len: 0,
            channels,
        }
    }

    /// Capacity in samples (frames × channels).
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    pub fn frame_capacity(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.samples.len()
    }

    /// Valid samples only.
    pub fn samples(&self) -> &[i16] {
        &self.samples[..self.len]
    }

    /// Whole backing storage, for sources to fill.
    pub fn storage_mut(&mut self) -> &mut [i16] {
        &mut self.samples
    }

    pub fn set_len(&mut self, len: usize) {
        self.len = len.min(self.samples.len());
    }
}
