//! Append-only run log
//!
//! One [`RunLog`] covers one document conversion. Entries are never edited or
//! removed once appended; the final [`ConversionResult`] is attached last.

use super::call::AgentCallResult;
use super::result::{ConversionResult, PipelineState};
use crate::agent::entities::AgentId;
use crate::quorum::{GateKind, GateVerdict};
use serde::Serialize;

/// What happened at one point in a run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunLogEvent {
    /// The controller moved to a new state
    Transition { state: PipelineState },
    /// A conversion attempt began (1-based)
    AttemptStarted { attempt: usize },
    /// One agent call completed
    AgentCall {
        #[serde(skip_serializing_if = "Option::is_none")]
        gate: Option<GateKind>,
        #[serde(skip_serializing_if = "Option::is_none")]
        attempt: Option<usize>,
        #[serde(flatten)]
        call: AgentCallResult,
    },
    /// A gate evaluation finished
    Gate {
        #[serde(skip_serializing_if = "Option::is_none")]
        attempt: Option<usize>,
        #[serde(flatten)]
        verdict: GateVerdict,
    },
    /// The conversion agent's reply had no output region
    MissingOutput { attempt: usize, agent: AgentId },
    /// The run reached a terminal state
    Finished {
        #[serde(flatten)]
        result: ConversionResult,
    },
    /// The run was cancelled before reaching a terminal state
    Cancelled,
}

/// A timestamped event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunLogEntry {
    /// RFC 3339, millisecond precision, UTC
    pub timestamp: String,
    #[serde(flatten)]
    pub event: RunLogEvent,
}

impl RunLogEntry {
    pub fn now(event: RunLogEvent) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            event,
        }
    }

    /// Type tag of the event, as written to JSONL
    pub fn kind(&self) -> &'static str {
        match self.event {
            RunLogEvent::Transition { .. } => "transition",
            RunLogEvent::AttemptStarted { .. } => "attempt_started",
            RunLogEvent::AgentCall { .. } => "agent_call",
            RunLogEvent::Gate { .. } => "gate",
            RunLogEvent::MissingOutput { .. } => "missing_output",
            RunLogEvent::Finished { .. } => "finished",
            RunLogEvent::Cancelled => "cancelled",
        }
    }
}

/// Ordered record of one document conversion
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunLog {
    entries: Vec<RunLogEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<ConversionResult>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `event`, stamped with the current time
    pub fn push(&mut self, event: RunLogEvent) -> &RunLogEntry {
        self.push_entry(RunLogEntry::now(event))
    }

    pub fn push_entry(&mut self, entry: RunLogEntry) -> &RunLogEntry {
        if let RunLogEvent::Finished { result } = &entry.event {
            self.result = Some(result.clone());
        }
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[RunLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn result(&self) -> Option<&ConversionResult> {
        self.result.as_ref()
    }

    /// Every gate verdict, in evaluation order
    pub fn verdicts(&self) -> impl Iterator<Item = &GateVerdict> {
        self.entries.iter().filter_map(|e| match &e.event {
            RunLogEvent::Gate { verdict, .. } => Some(verdict),
            _ => None,
        })
    }

    /// Every agent call, in recording order
    pub fn calls(&self) -> impl Iterator<Item = &AgentCallResult> {
        self.entries.iter().filter_map(|e| match &e.event {
            RunLogEvent::AgentCall { call, .. } => Some(call),
            _ => None,
        })
    }

    /// Calls made outside any gate (the conversion agent)
    pub fn conversion_calls(&self) -> impl Iterator<Item = &AgentCallResult> {
        self.entries.iter().filter_map(|e| match &e.event {
            RunLogEvent::AgentCall {
                gate: None, call, ..
            } => Some(call),
            _ => None,
        })
    }

    pub fn states(&self) -> impl Iterator<Item = PipelineState> + '_ {
        self.entries.iter().filter_map(|e| match e.event {
            RunLogEvent::Transition { state } => Some(state),
            _ => None,
        })
    }
}
