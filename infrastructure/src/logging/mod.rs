//! Logging infrastructure: the structured audit trail.
//!
//! Provides [`JsonlAuditLogger`], a JSONL file writer that implements
//! the [`AuditLogger`](mpic_application::AuditLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlAuditLogger;
