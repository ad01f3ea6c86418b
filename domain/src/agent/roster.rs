//! Agent roster
//!
//! The roster groups resolved agents by pipeline role. It is validated once,
//! at load time, so that the pipeline itself can assume well-formed panels.

use super::entities::{AgentRole, AgentSpec};
use crate::core::error::DomainError;
use crate::prompt::{Placeholder, PromptSet};
use crate::providers::ProviderSpec;
use crate::quorum::{GateKind, PanelRule};

const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2.0;

/// All configured agents, grouped by pipeline role
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRoster {
    /// Verification panel, in declaration order
    pub verification: Vec<AgentSpec>,
    /// The single conversion agent
    pub conversion: AgentSpec,
    /// Validation panel, in declaration order
    pub validation: Vec<AgentSpec>,
    /// Routing/composition agents; loaded and checked, never dispatched
    pub auxiliary: Vec<AgentSpec>,
}

impl AgentRoster {
    pub fn new(verification: Vec<AgentSpec>, conversion: AgentSpec, validation: Vec<AgentSpec>) -> Self {
        Self {
            verification,
            conversion,
            validation,
            auxiliary: Vec::new(),
        }
    }

    pub fn with_auxiliary(mut self, agents: Vec<AgentSpec>) -> Self {
        self.auxiliary = agents;
        self
    }

    pub fn verification_rule(&self) -> Result<PanelRule, DomainError> {
        PanelRule::new(GateKind::Verification, self.verification.len())
    }

    pub fn validation_rule(&self) -> Result<PanelRule, DomainError> {
        PanelRule::new(GateKind::Validation, self.validation.len())
    }

    /// Panel for `gate`
    pub fn panel(&self, gate: GateKind) -> &[AgentSpec] {
        match gate {
            GateKind::Verification => &self.verification,
            GateKind::Validation => &self.validation,
        }
    }

    /// Every agent in the roster
    pub fn agents(&self) -> impl Iterator<Item = &AgentSpec> {
        self.verification
            .iter()
            .chain(std::iter::once(&self.conversion))
            .chain(self.validation.iter())
            .chain(self.auxiliary.iter())
    }

    /// Validate panel sizes, roles, temperatures and prompt references
    pub fn validate(&self, prompts: &PromptSet) -> Result<(), DomainError> {
        self.verification_rule()?;
        self.validation_rule()?;

        for agent in &self.verification {
            expect_role(agent, AgentRole::Verify)?;
        }
        expect_role(&self.conversion, AgentRole::Convert)?;
        for agent in &self.validation {
            expect_role(agent, AgentRole::Validate)?;
        }

        for agent in self.agents() {
            if !agent.temperature.is_finite() || !TEMPERATURE_RANGE.contains(&agent.temperature) {
                return Err(DomainError::InvalidTemperature {
                    agent: agent.id.to_string(),
                    temperature: agent.temperature,
                });
            }
        }

        // Auxiliary agents are never rendered, so only pipeline agents need prompts
        for agent in self.pipeline_agents() {
            for key in [agent.system_key(), agent.request_key()] {
                if !prompts.contains(&key) {
                    return Err(DomainError::UnknownPromptKey {
                        agent: agent.id.to_string(),
                        key,
                    });
                }
                prompts.check_placeholders(&key, allowed_placeholders(agent.role))?;
            }
        }

        Ok(())
    }

    /// Check that every agent names a configured provider
    pub fn validate_providers(&self, providers: &[ProviderSpec]) -> Result<(), DomainError> {
        for agent in self.agents() {
            if !providers.iter().any(|p| p.name == agent.provider) {
                return Err(DomainError::UnknownProvider {
                    agent: agent.id.to_string(),
                    provider: agent.provider.clone(),
                });
            }
        }
        Ok(())
    }

    fn pipeline_agents(&self) -> impl Iterator<Item = &AgentSpec> {
        self.verification
            .iter()
            .chain(std::iter::once(&self.conversion))
            .chain(self.validation.iter())
    }
}

fn expect_role(agent: &AgentSpec, expected: AgentRole) -> Result<(), DomainError> {
    if agent.role == expected {
        Ok(())
    } else {
        Err(DomainError::RoleMismatch {
            agent: agent.id.to_string(),
            expected: expected.to_string(),
            actual: agent.role.to_string(),
        })
    }
}

/// Placeholders the pipeline supplies when rendering prompts for `role`
pub fn allowed_placeholders(role: AgentRole) -> &'static [Placeholder] {
    match role {
        AgentRole::Verify => &[Placeholder::Data, Placeholder::DateTime],
        AgentRole::Convert => &[
            Placeholder::Data,
            Placeholder::DateTime,
            Placeholder::RunIndex,
            Placeholder::PreviousConversionNotes,
        ],
        AgentRole::Validate => &[Placeholder::Data, Placeholder::DateTime, Placeholder::Output],
        AgentRole::Route | AgentRole::Compose => &[Placeholder::Data, Placeholder::DateTime],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::entities::AgentId;
    use crate::prompt::REQUIRED_KEYS;

    fn agent(role: AgentRole, index: usize) -> AgentSpec {
        AgentSpec::new(AgentId::for_role(role, index), format!("{role}-{index}"), role)
    }

    fn roster(verifiers: usize, validators: usize) -> AgentRoster {
        AgentRoster::new(
            (0..verifiers).map(|i| agent(AgentRole::Verify, i)).collect(),
            agent(AgentRole::Convert, 0),
            (0..validators).map(|i| agent(AgentRole::Validate, i)).collect(),
        )
    }

    fn prompts() -> PromptSet {
        REQUIRED_KEYS
            .iter()
            .fold(PromptSet::new(), |set, key| set.with(key, "Data: {<!--Data-->}"))
    }

    #[test]
    fn test_valid_roster() {
        let roster = roster(3, 3);
        assert!(roster.validate(&prompts()).is_ok());
        assert_eq!(roster.agents().count(), 7);
        assert_eq!(roster.verification_rule().unwrap().threshold(), 2);
    }

    #[test]
    fn test_even_validation_panel() {
        assert_eq!(
            roster(3, 2).validate(&prompts()),
            Err(DomainError::EvenPanel {
                gate: GateKind::Validation,
                size: 2
            })
        );
    }

    #[test]
    fn test_empty_verification_panel() {
        assert_eq!(
            roster(0, 3).validate(&prompts()),
            Err(DomainError::EmptyPanel {
                gate: GateKind::Verification
            })
        );
    }

    #[test]
    fn test_role_mismatch() {
        let mut roster = roster(1, 1);
        roster.validation[0] = agent(AgentRole::Verify, 5);
        assert!(matches!(
            roster.validate(&prompts()),
            Err(DomainError::RoleMismatch { .. })
        ));
    }

    #[test]
    fn test_temperature_out_of_range() {
        let mut roster = roster(1, 1);
        roster.conversion = roster.conversion.clone().with_temperature(2.5);
        assert!(matches!(
            roster.validate(&prompts()),
            Err(DomainError::InvalidTemperature { temperature, .. }) if temperature == 2.5
        ));
    }

    #[test]
    fn test_unknown_prompt_key() {
        let mut roster = roster(1, 1);
        roster.validation[0] = roster.validation[0].clone().with_prompt_key("strict");
        assert_eq!(
            roster.validate(&prompts()),
            Err(DomainError::UnknownPromptKey {
                agent: "validate-0".to_string(),
                key: "strict-system".to_string()
            })
        );
    }

    #[test]
    fn test_output_placeholder_not_allowed_in_verification() {
        let prompts = prompts().with("verification-request", "Check {<!--Output-->}");
        assert!(matches!(
            roster(1, 1).validate(&prompts),
            Err(DomainError::UnrenderablePlaceholder { ref key, .. }) if key == "verification-request"
        ));
    }

    #[test]
    fn test_notes_placeholder_allowed_in_conversion() {
        let prompts = prompts().with(
            "conversion-request",
            "Attempt {<!--RunIndex-->}: {<!--PreviousConversionNotes-->}",
        );
        assert!(roster(1, 1).validate(&prompts).is_ok());
    }

    #[test]
    fn test_unknown_provider() {
        let mut roster = roster(1, 1);
        roster.auxiliary = vec![agent(AgentRole::Route, 0).with_provider("nowhere")];
        let providers = vec![ProviderSpec::local("http://localhost:1234")];
        assert_eq!(
            roster.validate_providers(&providers),
            Err(DomainError::UnknownProvider {
                agent: "route-0".to_string(),
                provider: "nowhere".to_string()
            })
        );
    }
}
