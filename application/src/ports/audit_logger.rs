//! Port for the structured audit trail.
//!
//! Defines the [`AuditLogger`] trait for recording one event per
//! corroboration outcome or rejected request.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures verdicts in a
//! machine-readable format (JSONL).

use serde_json::Value;

/// A structured audit event.
pub struct AuditEvent {
    /// Event type identifier (e.g., "corroboration_complete", "request_rejected").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for writing audit events.
///
/// `log` is synchronous and infallible; a failed write must not change a
/// verdict that has already been reached.
pub trait AuditLogger: Send + Sync {
    fn log(&self, event: AuditEvent);
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoAuditLogger;

impl AuditLogger for NoAuditLogger {
    fn log(&self, _event: AuditEvent) {}
}
