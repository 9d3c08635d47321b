//! # threshcorder-core
//!
//! Platform-agnostic core of a threshold-triggered audio recorder.
//!
//! Each captured buffer is reduced to a loudness level; when the level rises
//! above a trigger threshold a new WAV file is opened and buffers are streamed
//! into it until the signal has stayed at or below a keepalive threshold for a
//! cooldown interval. Capture backends implement `AudioSource` and are driven
//! by the binary crate.
//!
//! ## Architecture
//!
//! ```text
//! threshcorder-core (this crate)
//! ├── traits/       ← AudioSource, RecorderDelegate
//! ├── models/       ← RecorderError, AudioFormat, FrameBuffer, configs, TriggerState, RecordingResult
//! ├── processing/   ← level detection, WAV header generation
//! ├── session/      ← TriggerRecorder (trigger/cooldown state machine)
//! └── storage/      ← WavWriter, checksums
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod test_support;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{AudioFormat, FrameBuffer};
pub use models::config::{RecorderConfiguration, TriggerConfig, DEFAULT_COOLDOWN};
pub use models::error::{ErrorKind, RecorderError};
pub use models::recording_result::{EpisodeEnd, RecordingResult};
pub use models::state::TriggerState;
pub use processing::level::{peak_level, rms_level, DetectionMethod};
pub use processing::wav_format::WavHeader;
pub use session::trigger::{SinkOpener, Transition, TriggerRecorder};
pub use storage::wav_writer::WavWriter;
pub use traits::audio_source::AudioSource;
pub use traits::recorder_delegate::RecorderDelegate;
