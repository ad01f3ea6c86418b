//! Agent gateway port
//!
//! Defines the interface for dispatching one agent call to its provider.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use udc_domain::{AgentCallResult, AgentSpec, CallErrorKind, Message};

/// Transport failures inside a gateway implementation
///
/// These never leave the gateway: [`AgentGateway::send`] folds them into the
/// returned [`AgentCallResult`] via [`GatewayError::kind`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("provider returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed response envelope: {0}")]
    MalformedEnvelope(String),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

impl GatewayError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Timeout(_) | GatewayError::Connection(_) => true,
            GatewayError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            GatewayError::MalformedEnvelope(_) | GatewayError::UnknownProvider(_) => false,
        }
    }

    /// Per-call error kind recorded on the call result
    pub fn kind(&self) -> CallErrorKind {
        match self {
            GatewayError::MalformedEnvelope(_) => CallErrorKind::UnparseableResponse,
            _ => CallErrorKind::Unreachable,
        }
    }
}

/// Gateway for agent calls
///
/// Implementations (adapters) live in the infrastructure layer. A call never
/// fails with an error: every outcome, including transport failure after the
/// adapter's own retries, is an [`AgentCallResult`].
#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Send `messages` on behalf of `agent` to the provider it references
    async fn send(&self, agent: &AgentSpec, messages: &[Message]) -> AgentCallResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(GatewayError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(GatewayError::Connection("refused".into()).is_transient());
        assert!(
            GatewayError::HttpStatus {
                status: 503,
                body: String::new()
            }
            .is_transient()
        );
        assert!(
            GatewayError::HttpStatus {
                status: 429,
                body: String::new()
            }
            .is_transient()
        );
        assert!(
            !GatewayError::HttpStatus {
                status: 401,
                body: "bad key".into()
            }
            .is_transient()
        );
        assert!(!GatewayError::MalformedEnvelope("no choices".into()).is_transient());
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            GatewayError::MalformedEnvelope("x".into()).kind(),
            CallErrorKind::UnparseableResponse
        );
        assert_eq!(
            GatewayError::Timeout(Duration::from_secs(600)).kind(),
            CallErrorKind::Unreachable
        );
    }
}
