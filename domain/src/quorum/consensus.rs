//! Gate verdicts
//!
//! A [`GateVerdict`] is the single result of evaluating one gate (verification
//! or validation) once. It is built from the votes actually cast, in panel
//! declaration order.

use super::rule::PanelRule;
use super::vote::Vote;
use serde::{Deserialize, Serialize};

/// Which consensus checkpoint a verdict belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKind {
    /// Input document check before conversion
    Verification,
    /// Conversion output check against the input
    Validation,
}

impl GateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateKind::Verification => "verification",
            GateKind::Validation => "validation",
        }
    }
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a (possibly partial) vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsensusOutcome {
    /// A majority approved
    Approved,
    /// A majority rejected
    Rejected,
    /// Not yet decided by the votes cast so far
    Pending,
}

impl std::fmt::Display for ConsensusOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsensusOutcome::Approved => write!(f, "Approved"),
            ConsensusOutcome::Rejected => write!(f, "Rejected"),
            ConsensusOutcome::Pending => write!(f, "Pending"),
        }
    }
}

/// Result of one gate evaluation
///
/// `final_approved` is true iff `approve_count` is a strict majority of the
/// configured panel size. `early_exited` is true when some panel members were
/// never dispatched because the outcome was already decided.
///
/// # Example
///
/// ```
/// use udc_domain::quorum::{GateKind, GateVerdict, PanelRule, Vote};
/// use udc_domain::AgentId;
///
/// let rule = PanelRule::new(GateKind::Validation, 3).unwrap();
/// let verdict = GateVerdict::from_votes(
///     GateKind::Validation,
///     rule,
///     vec![
///         Vote::approve(AgentId::new("validate-0"), "ok"),
///         Vote::reject(AgentId::new("validate-1"), "totals differ"),
///         Vote::approve(AgentId::new("validate-2"), "ok"),
///     ],
/// );
/// assert!(verdict.final_approved);
/// assert!(!verdict.early_exited);
/// assert_eq!(verdict.vote_summary(), "[●○●]");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateVerdict {
    pub gate: GateKind,
    pub approve_count: usize,
    pub reject_count: usize,
    /// Configured panel size (not the number of votes cast)
    pub panel_size: usize,
    /// Votes in panel declaration order
    pub votes: Vec<Vote>,
    pub final_approved: bool,
    pub early_exited: bool,
}

impl GateVerdict {
    /// Build a verdict from the votes cast under `rule`
    pub fn from_votes(gate: GateKind, rule: PanelRule, votes: Vec<Vote>) -> Self {
        let approve_count = votes.iter().filter(|v| v.approved).count();
        let reject_count = votes.len() - approve_count;

        Self {
            gate,
            approve_count,
            reject_count,
            panel_size: rule.size(),
            final_approved: rule.is_satisfied(approve_count),
            early_exited: votes.len() < rule.size(),
            votes,
        }
    }

    pub fn outcome(&self) -> ConsensusOutcome {
        if self.final_approved {
            ConsensusOutcome::Approved
        } else {
            ConsensusOutcome::Rejected
        }
    }

    /// Number of panel members actually dispatched
    pub fn dispatched(&self) -> usize {
        self.votes.len()
    }

    /// Visual vote summary, e.g. `[●●○]`, with `·` for undispatched members
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        for vote in &self.votes {
            summary.push(if vote.approved { '●' } else { '○' });
        }
        for _ in self.votes.len()..self.panel_size {
            summary.push('·');
        }
        summary.push(']');
        summary
    }

    pub fn rejections(&self) -> impl Iterator<Item = &Vote> {
        self.votes.iter().filter(|v| !v.approved)
    }

    /// Aggregate rejection messages into a single string
    pub fn rejection_feedback(&self) -> String {
        self.rejections()
            .map(|v| format!("{}: {}", v.agent, v.message))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
