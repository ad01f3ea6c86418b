//! Agent configuration from TOML (`[defaults]` and `[agents]` sections)

use serde::{Deserialize, Serialize};
use udc_domain::{AgentId, AgentRole, AgentRoster, AgentSpec, DomainError};

/// Fallbacks applied to every agent that leaves a field unset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDefaults {
    pub provider: String,
    pub model: String,
    pub temperature: f64,
}

impl Default for FileDefaults {
    fn default() -> Self {
        Self {
            provider: "local".to_string(),
            model: "granite-3.1-8b-instruct".to_string(),
            temperature: 1.0,
        }
    }
}

/// One agent entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub name: String,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    /// Base prompt key; `<key>-system` and `<key>-request` must exist
    pub prompt_key: Option<String>,
}

impl FileAgentConfig {
    /// Resolve every optional field against `defaults` and the role
    pub fn to_spec(&self, role: AgentRole, index: usize, defaults: &FileDefaults) -> AgentSpec {
        let id = AgentId::for_role(role, index);
        let name = if self.name.trim().is_empty() {
            id.to_string()
        } else {
            self.name.clone()
        };

        AgentSpec::new(id, name, role)
            .with_provider(self.provider.clone().unwrap_or_else(|| defaults.provider.clone()))
            .with_model(self.model.clone().unwrap_or_else(|| defaults.model.clone()))
            .with_temperature(self.temperature.unwrap_or(defaults.temperature))
            .with_prompt_key(
                self.prompt_key
                    .clone()
                    .unwrap_or_else(|| role.default_prompt_key().to_string()),
            )
    }
}

/// Raw agent roster
///
/// # Example
///
/// ```toml
/// [[agents.verification]]
/// name = "verifier-a"
///
/// [agents.conversion]
/// name = "converter"
/// model = "qwen2.5-coder-32b"
///
/// [[agents.validation]]
/// name = "validator-a"
/// provider = "anthropic"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentsConfig {
    pub verification: Vec<FileAgentConfig>,
    pub conversion: Option<FileAgentConfig>,
    pub validation: Vec<FileAgentConfig>,
    pub routing: Vec<FileAgentConfig>,
    pub composition: Vec<FileAgentConfig>,
}

impl FileAgentsConfig {
    pub fn to_roster(&self, defaults: &FileDefaults) -> Result<AgentRoster, DomainError> {
        let conversion = self.conversion.as_ref().ok_or_else(|| {
            DomainError::InvalidConfiguration(
                "missing required agent: [agents.conversion]".to_string(),
            )
        })?;

        let panel = |entries: &[FileAgentConfig], role: AgentRole| -> Vec<AgentSpec> {
            entries
                .iter()
                .enumerate()
                .map(|(i, entry)| entry.to_spec(role, i, defaults))
                .collect()
        };

        let auxiliary = panel(&self.routing, AgentRole::Route)
            .into_iter()
            .chain(panel(&self.composition, AgentRole::Compose))
            .collect();

        Ok(AgentRoster::new(
            panel(&self.verification, AgentRole::Verify),
            conversion.to_spec(AgentRole::Convert, 0, defaults),
            panel(&self.validation, AgentRole::Validate),
        )
        .with_auxiliary(auxiliary))
    }
}
