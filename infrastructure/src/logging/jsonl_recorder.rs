//! JSONL file writer for run log entries.
//!
//! Each [`RunLogEntry`] is serialized as a single JSON line. The entry already
//! carries its `type` and `timestamp`; the recorder adds the `document` it
//! belongs to, so one file can hold a whole batch.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use udc_application::RunRecorder;
use udc_domain::RunLogEntry;

/// JSONL run recorder that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlRunRecorder {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlRunRecorder {
    /// Create a new recorder writing to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create run log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create run log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RunRecorder for JsonlRunRecorder {
    fn record(&self, document: &str, entry: &RunLogEntry) {
        let record = match serde_json::to_value(entry) {
            Ok(serde_json::Value::Object(mut map)) => {
                map.insert(
                    "document".to_string(),
                    serde_json::Value::String(document.to_string()),
                );
                serde_json::Value::Object(map)
            }
            Ok(other) => serde_json::json!({
                "document": document,
                "type": entry.kind(),
                "timestamp": entry.timestamp,
                "data": other,
            }),
            Err(e) => {
                warn!(document, "Could not serialize run log entry: {}", e);
                return;
            }
        };

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            // JSONL is append-only; flush each line so a crash loses at most one
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlRunRecorder {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use udc_domain::{AgentCallResult, AgentId, GateKind, PipelineState, RunLogEvent};

    #[test]
    fn test_recorder_writes_valid_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.jsonl");
        let recorder = JsonlRunRecorder::new(&path).unwrap();

        recorder.record(
            "input.csv",
            &RunLogEntry::now(RunLogEvent::Transition {
                state: PipelineState::Verifying,
            }),
        );
        recorder.record(
            "input.csv",
            &RunLogEntry::now(RunLogEvent::AgentCall {
                gate: Some(GateKind::Verification),
                attempt: None,
                call: AgentCallResult::success(
                    AgentId::new("verify-0"),
                    "<isvalid>true</isvalid>",
                    Duration::from_millis(42),
                ),
            }),
        );

        drop(recorder);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.trim().lines().collect();
        assert_eq!(lines.len(), 2);

        for line in &lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value.get("type").is_some());
            assert!(value.get("timestamp").is_some());
            assert_eq!(value["document"], "input.csv");
        }

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "transition");
        assert_eq!(first["state"], "verifying");

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["type"], "agent_call");
        assert_eq!(second["gate"], "verification");
        assert_eq!(second["agent"], "verify-0");
        assert_eq!(second["latency_ms"], 42);
    }

    #[test]
    fn test_recorder_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("logs").join("run.jsonl");
        let recorder = JsonlRunRecorder::new(&path).unwrap();
        assert_eq!(recorder.path(), path.as_path());
        assert!(path.exists());
    }
}
