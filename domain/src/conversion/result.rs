//! Terminal conversion result and controller states

use serde::{Deserialize, Serialize};

/// Why a run ended without a validated output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The verification panel rejected the input; never retried
    InputRejected,
    /// Every attempt was rejected by the validation panel
    ValidationExhausted,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::InputRejected => {
                write!(f, "input rejected by the verification panel")
            }
            FailureReason::ValidationExhausted => {
                write!(f, "validation rejected every conversion attempt")
            }
        }
    }
}

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Verifying,
    Converting,
    Validating,
    Retrying,
    Succeeded,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Succeeded | PipelineState::Failed)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Verifying => "Verifying",
            PipelineState::Converting => "Converting",
            PipelineState::Validating => "Validating",
            PipelineState::Retrying => "Retrying",
            PipelineState::Succeeded => "Succeeded",
            PipelineState::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Terminal value of one document conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub succeeded: bool,
    /// Validated output; the last attempt's payload on exhaustion, empty on input rejection
    pub output: String,
    /// Converting→Validating cycles executed
    pub attempts_used: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<FailureReason>,
}

impl ConversionResult {
    pub fn succeeded(output: impl Into<String>, attempts_used: usize) -> Self {
        Self {
            succeeded: true,
            output: output.into(),
            attempts_used,
            failure_reason: None,
        }
    }

    pub fn input_rejected() -> Self {
        Self {
            succeeded: false,
            output: String::new(),
            attempts_used: 0,
            failure_reason: Some(FailureReason::InputRejected),
        }
    }

    pub fn validation_exhausted(last_output: impl Into<String>, attempts_used: usize) -> Self {
        Self {
            succeeded: false,
            output: last_output.into(),
            attempts_used,
            failure_reason: Some(FailureReason::ValidationExhausted),
        }
    }

    /// Human-readable failure text, if the run failed
    pub fn failure_text(&self) -> Option<String> {
        self.failure_reason.map(|r| r.to_string())
    }
}
