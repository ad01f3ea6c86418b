//! Vote types for gate consensus
//!
//! A [`Vote`] is one panel member's judgement. Failed calls and unparseable
//! replies are still votes (rejections) so a panel never silently shrinks.

use crate::agent::entities::AgentId;
use serde::{Deserialize, Serialize};

/// Message recorded when an agent's reply carries no usable verdict
pub const UNPARSEABLE_MESSAGE: &str = "unparseable agent response";

/// A single vote from a panel member
///
/// # Example
///
/// ```
/// use udc_domain::quorum::Vote;
/// use udc_domain::AgentId;
///
/// let approval = Vote::approve(AgentId::new("verify-0"), "Input is a well-formed CSV.");
/// assert!(approval.approved);
///
/// let rejection = Vote::reject(AgentId::new("verify-1"), "Header row is missing.");
/// assert!(!rejection.approved);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vote {
    /// Panel member that cast this vote
    pub agent: AgentId,
    /// Whether this member approved
    pub approved: bool,
    /// Reasoning, diagnostic, or call error text
    pub message: String,
}

impl Vote {
    pub fn new(agent: AgentId, approved: bool, message: impl Into<String>) -> Self {
        Self {
            agent,
            approved,
            message: message.into(),
        }
    }

    pub fn approve(agent: AgentId, message: impl Into<String>) -> Self {
        Self::new(agent, true, message)
    }

    pub fn reject(agent: AgentId, message: impl Into<String>) -> Self {
        Self::new(agent, false, message)
    }

    /// Rejection for a reply without a parseable verdict
    pub fn unparseable(agent: AgentId) -> Self {
        Self::reject(agent, UNPARSEABLE_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_creation() {
        let vote = Vote::approve(AgentId::new("validate-0"), "Looks good!");
        assert!(vote.approved);
        assert_eq!(vote.agent.as_str(), "validate-0");
        assert_eq!(vote.message, "Looks good!");
    }

    #[test]
    fn test_unparseable_is_rejection() {
        let vote = Vote::unparseable(AgentId::new("verify-2"));
        assert!(!vote.approved);
        assert_eq!(vote.message, UNPARSEABLE_MESSAGE);
    }
}
