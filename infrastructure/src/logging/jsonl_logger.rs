//! JSONL file writer for audit events.
//!
//! Each [`AuditEvent`] is serialized as a single JSON line with a `type`
//! field and `timestamp`, appended to the file via a buffered writer.

use mpic_application::{AuditEvent, AuditLogger};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL audit logger that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every event and
/// on `Drop`.
pub struct JsonlAuditLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlAuditLogger {
    /// Open (or create) the audit log at `path` for appending.
    ///
    /// Creates parent directories as needed. Returns `None` if the file
    /// cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create audit log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open audit log {}: {}", path.display(), e);
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

impl AuditLogger for JsonlAuditLogger {
    fn log(&self, event: AuditEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let record = match event.payload {
            serde_json::Value::Object(mut map) => {
                map.insert("type".to_string(), event.event_type.into());
                map.insert("timestamp".to_string(), timestamp.into());
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

impl Drop for JsonlAuditLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
