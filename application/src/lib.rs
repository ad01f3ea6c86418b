//! Application layer for udc
//!
//! This crate contains use cases, port definitions, and run settings.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{CallSettings, Settings};
pub use ports::{
    agent_gateway::{AgentGateway, GatewayError},
    progress::{NoProgress, ProgressNotifier},
    run_recorder::{NoRunRecorder, RunRecorder},
};
pub use use_cases::evaluate_gate::{
    EvaluateGateInput, EvaluateGateUseCase, GateEvaluation, vote_from_call,
};
pub use use_cases::run_batch::{BatchDocument, BatchItem, RunBatchInput, RunBatchUseCase};
pub use use_cases::run_conversion::{
    RunConversionError, RunConversionInput, RunConversionOutput, RunConversionUseCase,
    validate_configuration,
};
