use std::path::PathBuf;

/// Externally visible state of the trigger state machine.
///
/// State transitions:
/// ```text
/// idle ──level > trigger──▶ recording
///  ▲                           │
///  └── cooldown expired / write failure / shutdown
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerState {
    Idle,
    Recording {
        file_path: PathBuf,
        duration_secs: f64,
    },
}

impl TriggerState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }

    /// Path of the file being written, if recording.
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Self::Recording { file_path, .. } => Some(file_path),
            Self::Idle => None,
        }
    }

    /// Audio recorded so far in the current episode.
    pub fn duration(&self) -> Option<f64> {
        match self {
            Self::Recording { duration_secs, .. } => Some(*duration_secs),
            Self::Idle => None,
        }
    }
}
