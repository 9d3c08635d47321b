use crate::models::audio_models::{AudioFormat, FrameBuffer};
use crate::models::error::RecorderError;

/// Blocking provider of interleaved signed 16-bit PCM frames.
///
/// Implemented by:
/// - `RawPcmSource` (stdin, files, FIFOs)
/// - `CpalSource` (live capture devices, behind the `cpal` feature)
pub trait AudioSource {
    /// Format the source was configured with. Must match the WAV files written.
    fn format(&self) -> AudioFormat;

    /// Human-readable name of the backing device or stream.
    fn device_name(&self) -> String;

    /// Block until `buf` is filled or the source fails, returning the number
    /// of samples delivered.
    fn read_into(&mut self, buf: &mut [i16]) -> Result<usize, RecorderError>;

    /// Whether frames arrive in real time. Sources that replay recorded data
    /// return false so buffers are timed by stream position instead.
    fn is_realtime(&self) -> bool {
        true
    }

    /// Fill `frame` completely. Anything short of a full buffer is an error,
    /// never a partial result.
    fn read_frame(&mut self, frame: &mut FrameBuffer) -> Result<(), RecorderError> {
        let expected = frame.capacity();
        let actual = self.read_into(frame.storage_mut())?;
        frame.set_len(actual);
        if actual != expected {
            return Err(RecorderError::ShortRead { expected, actual });
        }
        Ok(())
    }
}
