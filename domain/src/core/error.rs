//! Domain error types
//!
//! Only load-time and credential failures are errors in this system. Everything
//! that can go wrong during a single agent call is absorbed into vote or attempt
//! outcomes and never surfaces here.

use crate::quorum::consensus::GateKind;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("{gate} panel has no agents")]
    EmptyPanel { gate: GateKind },

    #[error("{gate} panel has {size} agents; an odd panel size is required for majority voting")]
    EvenPanel { gate: GateKind, size: usize },

    #[error("agent '{agent}' references unknown provider '{provider}'")]
    UnknownProvider { agent: String, provider: String },

    #[error("agent '{agent}' references prompt key '{key}' which is not in the prompt set")]
    UnknownPromptKey { agent: String, key: String },

    #[error("prompt set is missing required key '{0}'")]
    MissingPrompt(String),

    #[error("prompt '{key}' contains placeholder {placeholder} which cannot be rendered there")]
    UnrenderablePlaceholder { key: String, placeholder: String },

    #[error("agent '{agent}' has invalid temperature {temperature}")]
    InvalidTemperature { agent: String, temperature: f64 },

    #[error("agent '{agent}' has role {actual} but is configured as a {expected} agent")]
    RoleMismatch {
        agent: String,
        expected: String,
        actual: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("no credential for provider '{provider}': environment variable {variable} is not set")]
    CredentialMissing { provider: String, variable: String },
}

impl DomainError {
    /// Check if this error is a credential failure rather than a configuration mistake
    pub fn is_credential_missing(&self) -> bool {
        matches!(self, DomainError::CredentialMissing { .. })
    }
}
