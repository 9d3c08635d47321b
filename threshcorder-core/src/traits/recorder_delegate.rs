use std::path::Path;

use crate::models::error::RecorderError;
use crate::models::recording_result::RecordingResult;

/// Event delegate for trigger episode notifications.
///
/// All methods are called synchronously from the recording loop; keep them cheap.
pub trait RecorderDelegate {
    /// A new episode started writing to `file_path`.
    fn on_triggered(&self, file_path: &Path, level: f32);

    /// An episode was closed and its file finalized.
    fn on_episode_finished(&self, result: &RecordingResult);

    /// An episode-level error occurred; the recorder is back to idle.
    fn on_error(&self, error: &RecorderError);
}
