//! Result of one dispatched agent call

use crate::agent::entities::AgentId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Why an agent call produced no usable text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallErrorKind {
    /// Timeout, connection failure or error status after adapter retries
    Unreachable,
    /// The provider answered but its response envelope could not be read
    UnparseableResponse,
}

impl std::fmt::Display for CallErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallErrorKind::Unreachable => write!(f, "unreachable"),
            CallErrorKind::UnparseableResponse => write!(f, "unparseable response"),
        }
    }
}

/// Immutable record of one agent call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCallResult {
    pub agent: AgentId,
    /// Reply text; empty when the call failed
    pub raw_response: String,
    #[serde(rename = "latency_ms", with = "duration_ms")]
    pub latency: Duration,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<CallErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl AgentCallResult {
    pub fn success(agent: AgentId, raw_response: impl Into<String>, latency: Duration) -> Self {
        Self {
            agent,
            raw_response: raw_response.into(),
            latency,
            success: true,
            error_kind: None,
            error_message: None,
        }
    }

    pub fn failure(
        agent: AgentId,
        kind: CallErrorKind,
        message: impl Into<String>,
        latency: Duration,
    ) -> Self {
        Self {
            agent,
            raw_response: String::new(),
            latency,
            success: false,
            error_kind: Some(kind),
            error_message: Some(message.into()),
        }
    }

    /// Text describing the failure, used as a rejection vote's message
    pub fn failure_message(&self) -> String {
        match (&self.error_kind, &self.error_message) {
            (Some(kind), Some(message)) => format!("{kind}: {message}"),
            (Some(kind), None) => kind.to_string(),
            (None, Some(message)) => message.clone(),
            (None, None) => "agent call failed".to_string(),
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
