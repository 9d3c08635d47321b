use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring, capturing, or writing a recording.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    #[error("short read from audio device: expected {expected} samples, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("audio stream ended")]
    EndOfStream,

    #[error("file {} exists and overwriting is disallowed", .0.display())]
    AlreadyExists(PathBuf),

    #[error("i/o error: {0}")]
    Io(String),

    #[error("short write: {0}")]
    ShortWrite(String),

    #[error("writer is closed")]
    WriterClosed,
}

/// Coarse error families used by the driver to pick a recovery policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Device,
    File,
}

impl RecorderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigurationFailed(_) => ErrorKind::Config,
            Self::DeviceNotAvailable(_) | Self::ShortRead { .. } | Self::EndOfStream => {
                ErrorKind::Device
            }
            Self::AlreadyExists(_) | Self::Io(_) | Self::ShortWrite(_) | Self::WriterClosed => {
                ErrorKind::File
            }
        }
    }

    /// File errors abandon the current episode but leave the process running.
    pub fn is_episode_fatal(&self) -> bool {
        self.kind() == ErrorKind::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_errors_are_episode_fatal() {
        assert!(RecorderError::AlreadyExists(PathBuf::from("a.wav")).is_episode_fatal());
        assert!(RecorderError::ShortWrite("disk full".into()).is_episode_fatal());
        assert!(RecorderError::WriterClosed.is_episode_fatal());
    }

    #[test]
    fn device_and_config_errors_are_not_episode_fatal() {
        let short = RecorderError::ShortRead { expected: 4, actual: 2 };
        assert_eq!(short.kind(), ErrorKind::Device);
        assert!(!short.is_episode_fatal());
        assert!(!RecorderError::ConfigurationFailed("bad".into()).is_episode_fatal());
    }

    #[test]
    fn already_exists_message_names_the_path() {
        let err = RecorderError::AlreadyExists(PathBuf::from("/tmp/x.wav"));
        assert_eq!(err.to_string(), "file /tmp/x.wav exists and overwriting is disallowed");
    }
}
