//! Logging infrastructure: structured run recording.
//!
//! Provides [`JsonlRunRecorder`], a JSONL file writer that implements
//! the [`RunRecorder`](udc_application::RunRecorder) port.

mod jsonl_recorder;

pub use jsonl_recorder::JsonlRunRecorder;
