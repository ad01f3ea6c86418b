//! Domain layer for udc
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Gates
//!
//! A document passes two consensus checkpoints:
//!
//! - **Verification**: a panel decides whether the input can be converted at all
//! - **Validation**: a panel decides whether a conversion output matches its input
//!
//! Each panel has an odd number of agents and decides by strict majority,
//! stopping as soon as the remaining votes cannot change the outcome.
//!
//! ## Attempts
//!
//! One Converting→Validating cycle. A rejected validation feeds its rejection
//! messages back to the conversion agent on the next attempt.

pub mod agent;
pub mod conversion;
pub mod core;
pub mod prompt;
pub mod providers;
pub mod quorum;
pub mod session;

// Re-export commonly used types
pub use agent::{AgentId, AgentRole, AgentRoster, AgentSpec};
pub use conversion::{
    AgentCallResult, CallErrorKind, ConversionResult, FailureReason, PipelineState, RunLog,
    RunLogEntry, RunLogEvent,
};
pub use core::error::DomainError;
pub use prompt::{Placeholder, PromptContext, PromptSet};
pub use providers::{ApiKey, ProviderSpec, RequestFormat};
pub use session::{Message, Role};

// Re-export quorum types
pub use quorum::{
    ConsensusOutcome, ExtractedVerdict, GateKind, GateVerdict, PanelRule, Vote, extract_output,
    extract_verdict,
};
