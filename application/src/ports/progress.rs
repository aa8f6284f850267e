//! Progress notification port
//!
//! Defines the interface for reporting progress during a model fan-out.

/// Callback for progress updates during a fan-out
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, JSON, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called once before any backend is invoked
    fn on_fan_out_start(&self, total_backends: usize);

    /// Called as each backend settles, in completion order
    fn on_backend_complete(&self, backend_id: &str, success: bool);

    /// Called after every backend has settled
    fn on_fan_out_complete(&self);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_fan_out_start(&self, _total_backends: usize) {}
    fn on_backend_complete(&self, _backend_id: &str, _success: bool) {}
    fn on_fan_out_complete(&self) {}
}
