//! Raw interleaved S16LE PCM read from stdin, a file, or a FIFO.
//!
//! Lets the recorder sit at the end of a pipeline such as
//! `arecord -t raw -f S16_LE -r 44100 -c 1 | threshcorder - out 800`.

use std::io::{self, Read};

use threshcorder_core::{AudioFormat, AudioSource, RecorderError};

pub struct RawPcmSource<R: Read> {
    reader: R,
    format: AudioFormat,
    name: String,
    bytes: Vec<u8>,
}

impl<R: Read> RawPcmSource<R> {
    pub fn new(reader: R, format: AudioFormat, name: impl Into<String>) -> Self {
        Self {
            reader,
            format,
            name: name.into(),
            bytes: Vec::new(),
        }
    }
}

impl<R: Read> AudioSource for RawPcmSource<R> {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn device_name(&self) -> String {
        self.name.clone()
    }

    /// Reads until `buf` is full or the stream ends. A stream that ends on a
    /// buffer boundary reports `EndOfStream`; one that ends mid-buffer yields
    /// a short count.
    fn read_into(&mut self, buf: &mut [i16]) -> Result<usize, RecorderError> {
        let wanted = buf.len() * 2;
        self.bytes.resize(wanted, 0);

        let mut filled = 0;
        while filled < wanted {
            match self.reader.read(&mut self.bytes[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(RecorderError::DeviceNotAvailable(format!(
                        "read from {} failed: {}",
                        self.name, e
                    )))
                }
            }
        }

        if filled == 0 && wanted > 0 {
            return Err(RecorderError::EndOfStream);
        }

        let samples = filled / 2;
        for (dst, pair) in buf.iter_mut().zip(self.bytes[..samples * 2].chunks_exact(2)) {
            *dst = i16::from_le_bytes([pair[0], pair[1]]);
        }
        Ok(samples)
    }

    /// Replayed streams are timed by their sample position, not the wall clock.
    fn is_realtime(&self) -> bool {
        false
    }
}
