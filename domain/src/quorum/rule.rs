//! Strict-majority rule for voting panels
//!
//! A panel of `N` members (N odd) approves when more than `N / 2` members
//! approve. The outcome is decided as soon as either side reaches that
//! threshold, because the undispatched votes can no longer overturn it.

use super::consensus::{ConsensusOutcome, GateKind};
use crate::core::error::DomainError;
use serde::Serialize;

/// Majority rule for one panel
///
/// # Example
///
/// ```
/// use udc_domain::quorum::{ConsensusOutcome, GateKind, PanelRule};
///
/// let rule = PanelRule::new(GateKind::Verification, 3).unwrap();
/// assert_eq!(rule.threshold(), 2);
/// assert_eq!(rule.outcome(2, 0), ConsensusOutcome::Approved);
/// assert_eq!(rule.outcome(1, 1), ConsensusOutcome::Pending);
/// assert_eq!(rule.outcome(0, 2), ConsensusOutcome::Rejected);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelRule {
    size: usize,
}

impl PanelRule {
    /// Create the rule for a panel of `size` members
    ///
    /// Empty and even-sized panels are configuration errors: an even panel
    /// can tie and ties are not resolved at vote time.
    pub fn new(gate: GateKind, size: usize) -> Result<Self, DomainError> {
        if size == 0 {
            return Err(DomainError::EmptyPanel { gate });
        }
        if size % 2 == 0 {
            return Err(DomainError::EvenPanel { gate, size });
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Votes one side needs to win
    pub fn threshold(&self) -> usize {
        self.size / 2 + 1
    }

    /// Whether `approvals` is a strict majority of the panel
    pub fn is_satisfied(&self, approvals: usize) -> bool {
        approvals > self.size / 2
    }

    /// Outcome given the votes cast so far
    pub fn outcome(&self, approvals: usize, rejections: usize) -> ConsensusOutcome {
        if approvals >= self.threshold() {
            ConsensusOutcome::Approved
        } else if rejections >= self.threshold() {
            ConsensusOutcome::Rejected
        } else {
            ConsensusOutcome::Pending
        }
    }

    /// Fewest further votes that could decide the outcome
    ///
    /// Zero once the outcome is decided. Dispatching more than this many
    /// members at once can waste calls; dispatching exactly this many never
    /// does, since no decision is possible before all of them have voted.
    pub fn votes_until_decidable(&self, approvals: usize, rejections: usize) -> usize {
        let threshold = self.threshold();
        if approvals >= threshold || rejections >= threshold {
            return 0;
        }
        (threshold - approvals).min(threshold - rejections)
    }
}

impl std::fmt::Display for PanelRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-of-{} majority", self.threshold(), self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(size: usize) -> PanelRule {
        PanelRule::new(GateKind::Validation, size).unwrap()
    }

    #[test]
    fn test_three_member_panel() {
        let rule = rule(3);
        assert!(!rule.is_satisfied(1));
        assert!(rule.is_satisfied(2));
        assert!(rule.is_satisfied(3));
        assert_eq!(rule.to_string(), "2-of-3 majority");
    }

    #[test]
    fn test_even_panel_rejected() {
        assert_eq!(
            PanelRule::new(GateKind::Verification, 4),
            Err(DomainError::EvenPanel {
                gate: GateKind::Verification,
                size: 4
            })
        );
    }

    #[test]
    fn test_empty_panel_rejected() {
        assert_eq!(
            PanelRule::new(GateKind::Validation, 0),
            Err(DomainError::EmptyPanel {
                gate: GateKind::Validation
            })
        );
    }

    #[test]
    fn test_single_member_panel() {
        let rule = rule(1);
        assert_eq!(rule.threshold(), 1);
        assert_eq!(rule.votes_until_decidable(0, 0), 1);
        assert_eq!(rule.outcome(1, 0), ConsensusOutcome::Approved);
        assert_eq!(rule.outcome(0, 1), ConsensusOutcome::Rejected);
    }

    #[test]
    fn test_votes_until_decidable_three() {
        let rule = rule(3);
        assert_eq!(rule.votes_until_decidable(0, 0), 2);
        assert_eq!(rule.votes_until_decidable(1, 1), 1);
        assert_eq!(rule.votes_until_decidable(2, 0), 0);
    }

    #[test]
    fn test_five_member_panel() {
        let rule = rule(5);
        assert_eq!(rule.threshold(), 3);
        assert_eq!(rule.votes_until_decidable(0, 0), 3);
        assert_eq!(rule.votes_until_decidable(2, 1), 1);
        assert_eq!(rule.votes_until_decidable(1, 1), 2);
        assert_eq!(rule.outcome(2, 2), ConsensusOutcome::Pending);
        assert_eq!(rule.outcome(1, 3), ConsensusOutcome::Rejected);
    }
}
