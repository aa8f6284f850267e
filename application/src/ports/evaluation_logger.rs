//! Port for structured evaluation logging.
//!
//! Defines the [`EvaluationLogger`] trait for recording backend responses,
//! technical evaluations, gate decisions and stage transitions to a
//! machine-readable log (JSONL).
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, this port captures the evaluation record.

use serde_json::Value;

/// A structured evaluation event.
pub struct EvaluationEvent {
    /// Event type identifier (e.g., "backend_response", "quality_gate").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl EvaluationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging evaluation events.
///
/// `log` is synchronous and non-fallible; implementations drop events they
/// cannot write.
pub trait EvaluationLogger: Send + Sync {
    fn log(&self, event: EvaluationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoEvaluationLog;

impl EvaluationLogger for NoEvaluationLog {
    fn log(&self, _event: EvaluationEvent) {}
}
