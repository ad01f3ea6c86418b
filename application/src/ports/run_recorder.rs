//! Port for structured run recording.
//!
//! Receives every [`RunLogEntry`] as it is appended to a run's log. This is
//! separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures the machine-readable
//! run record (e.g. JSONL).

use udc_domain::RunLogEntry;

/// Port for recording run log entries as they happen.
///
/// `record` is synchronous and non-fallible so that a broken log sink never
/// disrupts a conversion; implementations swallow their own write failures.
pub trait RunRecorder: Send + Sync {
    /// Record one entry of the run for `document`.
    fn record(&self, document: &str, entry: &RunLogEntry);
}

/// No-op implementation for tests and when recording is disabled.
pub struct NoRunRecorder;

impl RunRecorder for NoRunRecorder {
    fn record(&self, _document: &str, _entry: &RunLogEntry) {}
}
