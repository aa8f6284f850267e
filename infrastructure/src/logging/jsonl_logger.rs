//! JSONL file writer for evaluation events.
//!
//! Each [`EvaluationEvent`] is serialized as a single JSON line with a
//! `type` field and `timestamp`, appended to the file via a buffered writer.

use stagegate_application::ports::evaluation_logger::{EvaluationEvent, EvaluationLogger};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL evaluation logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Appends to an existing file so
/// successive runs build one transcript. Flushes on `Drop`.
pub struct JsonlEvaluationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlEvaluationLogger {
    /// Open (or create) the log file and its parent directories.
    ///
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create evaluation log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open evaluation log {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EvaluationLogger for JsonlEvaluationLogger {
    fn log(&self, event: EvaluationEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        // Payload fields sit next to type + timestamp
        let record = match event.payload {
            serde_json::Value::Object(mut map) => {
                map.insert(
                    "type".to_string(),
                    serde_json::Value::String(event.event_type.to_string()),
                );
                map.insert("timestamp".to_string(), serde_json::Value::String(timestamp));
                serde_json::Value::Object(map)
            }
            other => serde_json::json!({
                "type": event.event_type,
                "timestamp": timestamp,
                "data": other,
            }),
        };

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlEvaluationLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("evaluations.jsonl");
        let logger = JsonlEvaluationLogger::new(&path).unwrap();

        logger.log(EvaluationEvent::new(
            "backend_response",
            serde_json::json!({"model_id": "gpt", "confidence": 0.8}),
        ));
        logger.log(EvaluationEvent::new(
            "quality_gate",
            serde_json::json!({"stage": "idea_refinement", "gate_status": "BLOCK"}),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert!(line.get("timestamp").is_some());
        }
        assert_eq!(lines[0]["type"], "backend_response");
        assert_eq!(lines[0]["model_id"], "gpt");
        assert_eq!(lines[1]["type"], "quality_gate");
        assert_eq!(lines[1]["gate_status"], "BLOCK");
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evaluations.jsonl");
        let logger = JsonlEvaluationLogger::new(&path).unwrap();

        logger.log(EvaluationEvent::new("note", serde_json::json!([1, 2])));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "note");
        assert_eq!(lines[0]["data"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_appends_across_loggers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evaluations.jsonl");

        for _ in 0..2 {
            let logger = JsonlEvaluationLogger::new(&path).unwrap();
            logger.log(EvaluationEvent::new("stage_readiness", serde_json::json!({})));
        }

        assert_eq!(read_lines(&path).len(), 2);
    }
}
