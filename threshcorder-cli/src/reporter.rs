//! Machine-readable episode events, one JSON object per line.

use std::cell::RefCell;
use std::io::{self, Write};
use std::path::Path;

use serde_json::json;
use threshcorder_core::{RecorderDelegate, RecorderError, RecordingResult};

pub struct JsonReporter<W: Write> {
    out: RefCell<W>,
}

impl JsonReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out: RefCell::new(out) }
    }

    fn emit(&self, event: serde_json::Value) {
        let mut out = self.out.borrow_mut();
        if let Err(e) = writeln!(out, "{}", event).and_then(|_| out.flush()) {
            log::warn!("Failed to write event: {}", e);
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> RecorderDelegate for JsonReporter<W> {
    fn on_triggered(&self, file_path: &Path, level: f32) {
        self.emit(json!({
            "event": "triggered",
            "file_path": file_path,
            "level": level,
        }));
    }

    fn on_episode_finished(&self, result: &RecordingResult) {
        match serde_json::to_value(result) {
            Ok(mut value) => {
                value["event"] = json!("finished");
                self.emit(value);
            }
            Err(e) => log::warn!("Failed to serialize recording result: {}", e),
        }
    }

    fn on_error(&self, error: &RecorderError) {
        self.emit(json!({
            "event": "error",
            "kind": format!("{:?}", error.kind()),
            "message": error.to_string(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::Value;
    use threshcorder_core::EpisodeEnd;

    use super::*;

    fn lines(reporter: JsonReporter<Vec<u8>>) -> Vec<Value> {
        String::from_utf8(reporter.into_inner())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn writes_one_line_per_event() {
        let reporter = JsonReporter::new(Vec::new());
        reporter.on_triggered(Path::new("out/2024-05-01_12-00-00.wav"), 812.5);
        reporter.on_episode_finished(&RecordingResult {
            file_path: PathBuf::from("out/2024-05-01_12-00-00.wav"),
            created_at: "2024-05-01T12:00:00+00:00".into(),
            duration_secs: 6.25,
            frames: 275_625,
            data_bytes: 551_250,
            checksum: Some("ab".repeat(32)),
            end: EpisodeEnd::Cooldown,
        });
        reporter.on_error(&RecorderError::Io("disk full".into()));

        let events = lines(reporter);
        assert_eq!(events.len(), 3);

        assert_eq!(events[0]["event"], "triggered");
        assert_eq!(events[0]["file_path"], "out/2024-05-01_12-00-00.wav");
        assert_eq!(events[0]["level"], 812.5);

        assert_eq!(events[1]["event"], "finished");
        assert_eq!(events[1]["end"], "cooldown");
        assert_eq!(events[1]["data_bytes"], 551_250);

        assert_eq!(events[2]["event"], "error");
        assert_eq!(events[2]["kind"], "File");
    }
}
