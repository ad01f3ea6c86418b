//! Shared utilities for use cases.
//!
//! Contains prompt rendering and cancellation helpers used by the gate,
//! conversion and batch use cases.

use crate::use_cases::run_conversion::RunConversionError;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use udc_domain::{AgentSpec, DomainError, Message, PromptContext, PromptSet};

/// Render `agent`'s system instruction and request for `context`.
pub(crate) fn render_messages(
    agent: &AgentSpec,
    prompts: &PromptSet,
    context: &PromptContext<'_>,
) -> Result<Vec<Message>, DomainError> {
    let template = |key: String| {
        prompts
            .get(&key)
            .map(|text| context.render(text))
            .ok_or(DomainError::UnknownPromptKey {
                agent: agent.id.to_string(),
                key,
            })
    };

    Ok(vec![
        Message::system(template(agent.system_key())?),
        Message::user(template(agent.request_key())?),
    ])
}

/// Check if cancellation has been requested.
///
/// Returns `Err(RunConversionError::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), RunConversionError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(RunConversionError::Cancelled);
    }
    Ok(())
}

/// Drive `future` to completion unless the token is cancelled first.
///
/// On cancellation the future is dropped, so nothing it would have produced
/// is ever observed.
pub(crate) async fn cancellable<F: Future>(
    token: &Option<CancellationToken>,
    future: F,
) -> Result<F::Output, RunConversionError> {
    check_cancelled(token)?;
    match token {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(RunConversionError::Cancelled),
            output = future => Ok(output),
        },
        None => Ok(future.await),
    }
}
