//! Progress notification port
//!
//! Defines the interface for reporting progress during a conversion run.

use udc_domain::{AgentId, ConversionResult, GateKind, GateVerdict};

/// Callback for progress updates during a conversion run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a gate starts evaluating
    fn on_gate_start(&self, gate: GateKind, panel_size: usize);

    /// Called when an agent call completes; `gate` is `None` for the conversion agent
    fn on_agent_complete(&self, gate: Option<GateKind>, agent: &AgentId, success: bool);

    /// Called when a gate reaches its verdict
    fn on_gate_complete(&self, verdict: &GateVerdict);

    /// Called when a conversion attempt starts (1-based)
    fn on_attempt_start(&self, _attempt: usize, _max_attempts: usize) {}

    /// Called once the run reaches a terminal state
    fn on_run_complete(&self, _result: &ConversionResult) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_gate_start(&self, _gate: GateKind, _panel_size: usize) {}
    fn on_agent_complete(&self, _gate: Option<GateKind>, _agent: &AgentId, _success: bool) {}
    fn on_gate_complete(&self, _verdict: &GateVerdict) {}
}
