//! Evaluate Gate use case
//!
//! Runs one voting panel (verification or validation) and reduces its votes
//! to a single [`GateVerdict`].
//!
//! Members are dispatched in declaration order, in batches sized by
//! [`PanelRule::votes_until_decidable`]: no batch is larger than the number of
//! votes that could still leave the outcome open, so once a batch decides the
//! vote there is never an in-flight call left to cancel. In sequential mode
//! every batch has one member; for a 3-member panel in parallel mode the first
//! batch is the first two members and the third is dispatched only if they
//! disagree.

use crate::config::Settings;
use crate::ports::agent_gateway::AgentGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::shared::render_messages;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};
use udc_domain::{
    AgentCallResult, AgentSpec, DomainError, GateKind, GateVerdict, PanelRule, PromptContext,
    PromptSet, Vote, extract_verdict,
};

/// Input for the EvaluateGate use case
#[derive(Debug, Clone)]
pub struct EvaluateGateInput<'a> {
    pub gate: GateKind,
    /// Panel members in declaration order
    pub panel: &'a [AgentSpec],
    pub prompts: &'a PromptSet,
    pub context: PromptContext<'a>,
    pub settings: &'a Settings,
}

/// A verdict together with the calls that produced it
#[derive(Debug, Clone)]
pub struct GateEvaluation {
    pub verdict: GateVerdict,
    /// Dispatched calls in panel declaration order
    pub calls: Vec<AgentCallResult>,
}

/// Turn one call result into a vote
///
/// A failed call or an unparseable reply is a rejection, so a dead or
/// confused agent never shrinks the panel.
pub fn vote_from_call(call: &AgentCallResult) -> Vote {
    if !call.success {
        return Vote::reject(call.agent.clone(), call.failure_message());
    }
    match extract_verdict(&call.raw_response) {
        Some(verdict) => Vote::new(call.agent.clone(), verdict.approved, verdict.message),
        None => Vote::unparseable(call.agent.clone()),
    }
}

/// Use case for evaluating one gate
pub struct EvaluateGateUseCase<G: AgentGateway + 'static> {
    gateway: Arc<G>,
}

impl<G: AgentGateway + 'static> EvaluateGateUseCase<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: EvaluateGateInput<'_>) -> Result<GateEvaluation, DomainError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    ///
    /// Only configuration problems (panel size, missing prompts) are errors;
    /// they are reported before any member is dispatched.
    pub async fn execute_with_progress(
        &self,
        input: EvaluateGateInput<'_>,
        progress: &dyn ProgressNotifier,
    ) -> Result<GateEvaluation, DomainError> {
        let gate = input.gate;
        let panel = input.panel;
        let rule = PanelRule::new(gate, panel.len())?;
        let requests = panel
            .iter()
            .map(|agent| render_messages(agent, input.prompts, &input.context))
            .collect::<Result<Vec<_>, _>>()?;

        info!(gate = %gate, panel = panel.len(), "Evaluating gate ({})", rule);
        progress.on_gate_start(gate, panel.len());

        let mut votes: Vec<Vote> = Vec::with_capacity(panel.len());
        let mut calls = Vec::with_capacity(panel.len());
        let (mut approvals, mut rejections) = (0, 0);

        while votes.len() < panel.len() {
            let needed = rule.votes_until_decidable(approvals, rejections);
            if needed == 0 {
                break;
            }

            let start = votes.len();
            let end = (start + needed.min(input.settings.dispatch_width())).min(panel.len());
            debug!(gate = %gate, "Dispatching panel members {}..{}", start, end);

            let results = join_all(
                (start..end).map(|i| self.gateway.send(&panel[i], &requests[i])),
            )
            .await;

            for call in results {
                let vote = vote_from_call(&call);
                if call.success {
                    debug!(agent = %call.agent, approved = vote.approved, latency_ms = call.latency.as_millis() as u64, "Vote cast");
                } else {
                    warn!(agent = %call.agent, "Agent call failed, counted as rejection: {}", vote.message);
                }
                progress.on_agent_complete(Some(gate), &call.agent, call.success);

                if vote.approved {
                    approvals += 1;
                } else {
                    rejections += 1;
                }
                votes.push(vote);
                calls.push(call);
            }
        }

        let verdict = GateVerdict::from_votes(gate, rule, votes);
        info!(
            gate = %gate,
            approvals = verdict.approve_count,
            rejections = verdict.reject_count,
            early_exited = verdict.early_exited,
            "Gate {} {}",
            verdict.outcome(),
            verdict.vote_summary()
        );
        progress.on_gate_complete(&verdict);

        Ok(GateEvaluation { verdict, calls })
    }
}
