//! Conversion pipeline records
//!
//! Per-call results, the terminal [`ConversionResult`], the controller's
//! [`PipelineState`] and the append-only [`RunLog`].

pub mod call;
pub mod result;
pub mod run_log;

pub use call::{AgentCallResult, CallErrorKind};
pub use result::{ConversionResult, FailureReason, PipelineState};
pub use run_log::{RunLog, RunLogEntry, RunLogEvent};
