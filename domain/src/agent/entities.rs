//! Agent identity and specification
//!
//! An [`AgentSpec`] is produced once by configuration loading with every
//! fallback already applied. Downstream code reads its fields directly and
//! never asks "is this set?".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable agent identifier assigned at load time (e.g. `verify-0`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier for the `index`-th agent configured under `role`
    pub fn for_role(role: AgentRole, index: usize) -> Self {
        Self(format!("{}-{}", role.as_str(), index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an agent is used for in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    /// Verification panel member: judges whether the input is convertible
    Verify,
    /// The single conversion agent
    Convert,
    /// Validation panel member: judges the conversion output against the input
    Validate,
    /// Routing agent (configured, not dispatched by the conversion pipeline)
    Route,
    /// Composition agent (configured, not dispatched by the conversion pipeline)
    Compose,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Verify => "verify",
            AgentRole::Convert => "convert",
            AgentRole::Validate => "validate",
            AgentRole::Route => "route",
            AgentRole::Compose => "compose",
        }
    }

    /// Base prompt key used when an agent does not name its own
    pub fn default_prompt_key(&self) -> &'static str {
        match self {
            AgentRole::Verify => "verification",
            AgentRole::Convert => "conversion",
            AgentRole::Validate => "validation",
            AgentRole::Route => "routing",
            AgentRole::Compose => "composition",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verify" | "verifier" | "verification" => Ok(AgentRole::Verify),
            "convert" | "converter" | "conversion" => Ok(AgentRole::Convert),
            "validate" | "validator" | "validation" => Ok(AgentRole::Validate),
            "route" | "router" | "routing" => Ok(AgentRole::Route),
            "compose" | "composer" | "composition" => Ok(AgentRole::Compose),
            _ => Err(format!(
                "Unknown agent role: {}. Valid: verify, convert, validate, route, compose",
                s
            )),
        }
    }
}

/// Fully resolved agent configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Stable identifier assigned at load time
    pub id: AgentId,
    /// Human-readable name from configuration
    pub name: String,
    pub role: AgentRole,
    /// Name of the provider this agent calls
    pub provider: String,
    /// Model identifier sent to the provider
    pub model: String,
    pub temperature: f64,
    /// Base prompt key; the system and request templates are
    /// `<key>-system` and `<key>-request`
    pub prompt_key: String,
}

impl AgentSpec {
    /// Create a spec with role-default prompt key, `local` provider and temperature 1.0
    pub fn new(id: AgentId, name: impl Into<String>, role: AgentRole) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            provider: "local".to_string(),
            model: String::new(),
            temperature: 1.0,
            prompt_key: role.default_prompt_key().to_string(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_prompt_key(mut self, key: impl Into<String>) -> Self {
        self.prompt_key = key.into();
        self
    }

    /// Prompt set key of this agent's system instruction
    pub fn system_key(&self) -> String {
        format!("{}-system", self.prompt_key)
    }

    /// Prompt set key of this agent's request template
    pub fn request_key(&self) -> String {
        format!("{}-request", self.prompt_key)
    }
}
