//! Run Batch use case
//!
//! Converts several documents through independent runs, at most
//! `max_concurrent_documents` at once. One document's failure never affects
//! its siblings, and results come back in input order.

use crate::config::Settings;
use crate::ports::agent_gateway::AgentGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::run_conversion::{
    RunConversionError, RunConversionInput, RunConversionOutput, RunConversionUseCase,
    validate_configuration,
};
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};
use udc_domain::{AgentRoster, PromptSet};

/// One input document
#[derive(Debug, Clone)]
pub struct BatchDocument {
    /// Label used in logs and run records (e.g. the source path)
    pub name: String,
    pub content: String,
}

impl BatchDocument {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Outcome for one document of a batch
#[derive(Debug)]
pub struct BatchItem {
    pub name: String,
    pub outcome: Result<RunConversionOutput, RunConversionError>,
}

/// Input for the RunBatch use case
#[derive(Debug, Clone, Copy)]
pub struct RunBatchInput<'a> {
    pub documents: &'a [BatchDocument],
    pub prompts: &'a PromptSet,
    pub roster: &'a AgentRoster,
    pub settings: &'a Settings,
}

/// Use case for converting a batch of documents
pub struct RunBatchUseCase<G: AgentGateway + 'static> {
    conversion: RunConversionUseCase<G>,
}

impl<G: AgentGateway + 'static> RunBatchUseCase<G> {
    pub fn new(conversion: RunConversionUseCase<G>) -> Self {
        Self { conversion }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunBatchInput<'_>,
    ) -> Result<Vec<BatchItem>, RunConversionError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    ///
    /// Configuration errors are reported once, before any document starts.
    pub async fn execute_with_progress(
        &self,
        input: RunBatchInput<'_>,
        progress: &dyn ProgressNotifier,
    ) -> Result<Vec<BatchItem>, RunConversionError> {
        validate_configuration(input.prompts, input.roster)?;

        let workers = input.settings.max_concurrent_documents.max(1);
        info!(
            documents = input.documents.len(),
            workers, "Starting batch conversion"
        );
        let semaphore = Semaphore::new(workers);

        let runs = input.documents.iter().map(|document| {
            let semaphore = &semaphore;
            async move {
                let outcome = match semaphore.acquire().await {
                    Ok(_permit) => {
                        self.conversion
                            .execute_with_progress(
                                RunConversionInput {
                                    document: &document.name,
                                    input: &document.content,
                                    prompts: input.prompts,
                                    roster: input.roster,
                                    settings: input.settings,
                                },
                                progress,
                            )
                            .await
                    }
                    Err(_) => Err(RunConversionError::Cancelled),
                };

                if let Err(e) = &outcome {
                    warn!(document = %document.name, "Document run ended early: {}", e);
                }
                BatchItem {
                    name: document.name.clone(),
                    outcome,
                }
            }
        });

        Ok(join_all(runs).await)
    }
}
