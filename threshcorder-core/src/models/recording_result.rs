use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Why an episode was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeEnd {
    /// The level stayed at or below keepalive for longer than the cooldown.
    Cooldown,
    /// The recorder was shut down while recording.
    Shutdown,
    /// An append failed; the file holds everything written before the failure.
    WriteFailed,
}

/// Summary of one finalized trigger episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingResult {
    pub file_path: PathBuf,
    /// RFC 3339 wall-clock time the episode was triggered.
    pub created_at: String,
    /// Duration of recorded audio.
    pub duration_secs: f64,
    pub frames: u64,
    /// Size of the WAV data chunk as patched into the header.
    pub data_bytes: u32,
    /// SHA-256 of the finalized file, when it could be read back.
    pub checksum: Option<String>,
    pub end: EpisodeEnd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_end_reason_in_snake_case() {
        let result = RecordingResult {
            file_path: PathBuf::from("a.wav"),
            created_at: "2024-01-01T00:00:00+00:00".into(),
            duration_secs: 0.5,
            frames: 22_050,
            data_bytes: 44_100,
            checksum: None,
            end: EpisodeEnd::WriteFailed,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"end\":\"write_failed\""));
        assert!(json.contains("\"data_bytes\":44100"));
    }
}
