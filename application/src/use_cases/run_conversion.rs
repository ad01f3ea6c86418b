//! Run Conversion use case
//!
//! Drives one document through the pipeline:
//!
//! ```text
//! Verifying ──rejected──▶ Failed (InputRejected)
//!     │approved
//!     ▼
//! Converting ──▶ Validating ──approved──▶ Succeeded
//!     ▲              │rejected
//!     │              ├──attempts left──▶ Retrying ──┐
//!     │              └──exhausted──▶ Failed (ValidationExhausted)
//!     └─────────────────────────────────────────────┘
//! ```
//!
//! Per-call failures never abort the run: a failed panel call is a rejection
//! vote, and a failed conversion call is an attempt with an empty payload.
//! Only configuration problems and cancellation are errors.

use crate::config::Settings;
use crate::ports::agent_gateway::AgentGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::run_recorder::{NoRunRecorder, RunRecorder};
use crate::use_cases::evaluate_gate::{EvaluateGateInput, EvaluateGateUseCase};
use crate::use_cases::run_log_writer::RunLogWriter;
use crate::use_cases::shared::{cancellable, check_cancelled, render_messages};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use udc_domain::{
    AgentRoster, ConversionResult, DomainError, GateKind, GateVerdict, PipelineState,
    PromptContext, PromptSet, RunLog, RunLogEvent, extract_output,
};

/// Errors that can occur during a conversion run
#[derive(Error, Debug)]
pub enum RunConversionError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] DomainError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl RunConversionError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunConversionError::Cancelled)
    }
}

/// Input for the RunConversion use case
#[derive(Debug, Clone, Copy)]
pub struct RunConversionInput<'a> {
    /// Label used in logs and run records (e.g. the source file name)
    pub document: &'a str,
    /// The input document text
    pub input: &'a str,
    pub prompts: &'a PromptSet,
    pub roster: &'a AgentRoster,
    pub settings: &'a Settings,
}

/// Terminal result plus the full record of how it was reached
#[derive(Debug, Clone)]
pub struct RunConversionOutput {
    pub result: ConversionResult,
    pub log: RunLog,
}

/// Check a prompt set and roster before anything is dispatched
pub fn validate_configuration(prompts: &PromptSet, roster: &AgentRoster) -> Result<(), DomainError> {
    prompts.validate()?;
    roster.validate(prompts)
}

struct RunContext<'a> {
    input: RunConversionInput<'a>,
    writer: &'a RunLogWriter,
    progress: &'a dyn ProgressNotifier,
}

/// Use case for converting one document
pub struct RunConversionUseCase<G: AgentGateway + 'static> {
    gateway: Arc<G>,
    recorder: Arc<dyn RunRecorder>,
    cancellation_token: Option<CancellationToken>,
}

impl<G: AgentGateway + 'static> RunConversionUseCase<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            recorder: Arc::new(NoRunRecorder),
            cancellation_token: None,
        }
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn RunRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunConversionInput<'_>,
    ) -> Result<RunConversionOutput, RunConversionError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunConversionInput<'_>,
        progress: &dyn ProgressNotifier,
    ) -> Result<RunConversionOutput, RunConversionError> {
        validate_configuration(input.prompts, input.roster)?;
        check_cancelled(&self.cancellation_token)?;

        let writer = RunLogWriter::new(input.document, Arc::clone(&self.recorder));
        let run = RunContext {
            input,
            writer: &writer,
            progress,
        };
        let result = match self.drive(&run).await {
            Ok(result) => result,
            Err(e) => {
                // the recorder has already streamed this run's earlier entries
                if e.is_cancelled() {
                    writer.append(RunLogEvent::Cancelled);
                }
                return Err(e);
            }
        };
        progress.on_run_complete(&result);

        Ok(RunConversionOutput {
            result,
            log: writer.into_log(),
        })
    }

    async fn drive(&self, run: &RunContext<'_>) -> Result<ConversionResult, RunConversionError> {
        let input = run.input;
        info!(document = input.document, "Starting conversion");

        run.writer.append(RunLogEvent::Transition {
            state: PipelineState::Verifying,
        });
        let verification = self
            .gate(run, GateKind::Verification, PromptContext::verification(input.input), None)
            .await?;
        if !verification.final_approved {
            warn!(document = input.document, "Input rejected by verification panel");
            return Ok(self.finish(run, PipelineState::Failed, ConversionResult::input_rejected()));
        }

        let max_attempts = input.settings.effective_max_attempts();
        let mut notes = String::new();
        let mut last_output = String::new();

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                info!(document = input.document, attempt, "Retrying conversion");
                run.writer.append(RunLogEvent::Transition {
                    state: PipelineState::Retrying,
                });
            }
            run.progress.on_attempt_start(attempt, max_attempts);
            run.writer.append_all([
                RunLogEvent::AttemptStarted { attempt },
                RunLogEvent::Transition {
                    state: PipelineState::Converting,
                },
            ]);

            let payload = self.convert(run, attempt, &notes).await?;

            run.writer.append(RunLogEvent::Transition {
                state: PipelineState::Validating,
            });
            let validation = self
                .gate(
                    run,
                    GateKind::Validation,
                    PromptContext::validation(input.input, &payload),
                    Some(attempt),
                )
                .await?;

            if validation.final_approved {
                info!(document = input.document, attempt, "Conversion validated");
                return Ok(self.finish(
                    run,
                    PipelineState::Succeeded,
                    ConversionResult::succeeded(payload, attempt),
                ));
            }

            warn!(
                document = input.document,
                attempt,
                max_attempts,
                "Validation rejected attempt {} ({}/{} approved)",
                attempt,
                validation.approve_count,
                validation.panel_size
            );
            notes = validation.rejection_feedback();
            last_output = payload;
        }

        Ok(self.finish(
            run,
            PipelineState::Failed,
            ConversionResult::validation_exhausted(last_output, max_attempts),
        ))
    }

    /// Evaluate one gate and record its calls and verdict as one group
    async fn gate(
        &self,
        run: &RunContext<'_>,
        gate: GateKind,
        context: PromptContext<'_>,
        attempt: Option<usize>,
    ) -> Result<GateVerdict, RunConversionError> {
        let use_case = EvaluateGateUseCase::new(Arc::clone(&self.gateway));
        let evaluation = cancellable(
            &self.cancellation_token,
            use_case.execute_with_progress(
                EvaluateGateInput {
                    gate,
                    panel: run.input.roster.panel(gate),
                    prompts: run.input.prompts,
                    context,
                    settings: run.input.settings,
                },
                run.progress,
            ),
        )
        .await??;

        let verdict = evaluation.verdict.clone();
        run.writer.append_all(
            evaluation
                .calls
                .into_iter()
                .map(|call| RunLogEvent::AgentCall {
                    gate: Some(gate),
                    attempt,
                    call,
                })
                .chain(std::iter::once(RunLogEvent::Gate {
                    attempt,
                    verdict: evaluation.verdict,
                })),
        );
        Ok(verdict)
    }

    /// Run the conversion agent once and return its payload (empty on failure)
    async fn convert(
        &self,
        run: &RunContext<'_>,
        attempt: usize,
        notes: &str,
    ) -> Result<String, RunConversionError> {
        let agent = &run.input.roster.conversion;
        let context = PromptContext::conversion(run.input.input, attempt - 1, notes);
        let messages = render_messages(agent, run.input.prompts, &context)?;

        let call = cancellable(&self.cancellation_token, self.gateway.send(agent, &messages)).await?;
        run.progress.on_agent_complete(None, &agent.id, call.success);

        let payload = if call.success {
            extract_output(&call.raw_response)
        } else {
            warn!(agent = %agent.id, attempt, "Conversion call failed: {}", call.failure_message());
            None
        };
        let missing_output = call.success && payload.is_none();

        let mut events = vec![RunLogEvent::AgentCall {
            gate: None,
            attempt: Some(attempt),
            call,
        }];
        if missing_output {
            warn!(agent = %agent.id, attempt, "Conversion reply has no output region");
            events.push(RunLogEvent::MissingOutput {
                attempt,
                agent: agent.id.clone(),
            });
        }
        run.writer.append_all(events);

        Ok(payload.unwrap_or_default())
    }

    fn finish(
        &self,
        run: &RunContext<'_>,
        state: PipelineState,
        result: ConversionResult,
    ) -> ConversionResult {
        run.writer.append_all([
            RunLogEvent::Transition { state },
            RunLogEvent::Finished {
                result: result.clone(),
            },
        ]);
        result
    }
}
