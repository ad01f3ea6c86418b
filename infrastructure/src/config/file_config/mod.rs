//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! [`FileConfig::to_run_config`] resolves every fallback once, so the
//! pipeline only ever sees fully populated domain values.

mod agents;
mod providers;
mod settings;

pub use agents::{FileAgentConfig, FileAgentsConfig, FileDefaults};
pub use providers::FileProviderConfig;
pub use settings::FileSettings;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::warn;
use udc_application::Settings;
use udc_domain::{AgentRoster, DomainError, ProviderSpec};

/// Where converted documents are written (`[output]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    pub folder: PathBuf,
    pub extension: String,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("output"),
            extension: "txt".to_string(),
        }
    }
}

/// Where run logs are written (`[run_log]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRunLogConfig {
    pub folder: PathBuf,
    pub extension: String,
    /// Also stream every entry to a JSONL file while the batch runs
    pub jsonl: bool,
}

impl Default for FileRunLogConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("logs"),
            extension: "json".to_string(),
            jsonl: true,
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub settings: FileSettings,
    pub defaults: FileDefaults,
    pub providers: BTreeMap<String, FileProviderConfig>,
    pub agents: FileAgentsConfig,
    pub output: FileOutputConfig,
    pub run_log: FileRunLogConfig,
}

/// Fully resolved configuration for one process run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub settings: Settings,
    pub providers: Vec<ProviderSpec>,
    pub roster: AgentRoster,
}

impl FileConfig {
    /// Apply all defaulting and structural validation
    ///
    /// Prompt-dependent checks (template keys, placeholders) need the prompt
    /// set and happen in `validate_configuration`.
    pub fn to_run_config(&self) -> Result<RunConfig, DomainError> {
        let providers = if self.providers.is_empty() {
            warn!("No [providers] configured, using legacy single-endpoint mode");
            vec![FileProviderConfig::default().to_spec("local")?]
        } else {
            self.providers
                .iter()
                .map(|(name, provider)| provider.to_spec(name))
                .collect::<Result<Vec<_>, _>>()?
        };

        let roster = self.agents.to_roster(&self.defaults)?;
        roster.validate_providers(&providers)?;
        roster.verification_rule()?;
        roster.validation_rule()?;

        Ok(RunConfig {
            settings: self.settings.to_settings(),
            providers,
            roster,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use udc_domain::{GateKind, RequestFormat};

    const FULL: &str = r#"
[settings]
max_attempts = 2
parallel_agents = true

[defaults]
model = "granite"

[providers.local]
base_url = "http://localhost:1234"

[providers.anthropic]
base_url = "https://api.anthropic.com"
request_format = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[[agents.verification]]
name = "v1"
[[agents.verification]]
name = "v2"
[[agents.verification]]
name = "v3"

[agents.conversion]
name = "converter"
provider = "anthropic"
model = "claude-sonnet"

[[agents.validation]]
name = "a"
[[agents.validation]]
name = "b"
[[agents.validation]]
name = "c"

[output]
folder = "converted"
"#;

    #[test]
    fn test_deserialize_full_config() {
        let config: FileConfig = toml::from_str(FULL).unwrap();
        let run = config.to_run_config().unwrap();

        assert_eq!(run.settings.max_attempts, 2);
        assert!(run.settings.parallel_agents);
        assert_eq!(run.providers.len(), 2);
        assert_eq!(run.roster.panel(GateKind::Verification).len(), 3);
        assert_eq!(run.roster.conversion.provider, "anthropic");
        assert_eq!(run.roster.conversion.model, "claude-sonnet");
        assert_eq!(run.roster.validation[2].model, "granite");
        assert_eq!(config.output.folder, PathBuf::from("converted"));
        assert_eq!(config.output.extension, "txt");
    }

    #[test]
    fn test_legacy_local_provider_synthesized() {
        let config: FileConfig = toml::from_str(
            r#"
[[agents.verification]]
name = "v"
[agents.conversion]
name = "c"
[[agents.validation]]
name = "a"
"#,
        )
        .unwrap();

        let run = config.to_run_config().unwrap();
        assert_eq!(run.providers.len(), 1);
        let local = &run.providers[0];
        assert_eq!(local.name, "local");
        assert_eq!(local.request_format, RequestFormat::OpenAi);
        assert_eq!(local.url_for("m"), "http://localhost:1234/v1/chat/completions");
        assert!(!local.requires_credential());
    }

    #[test]
    fn test_even_panel_rejected_at_load() {
        let config: FileConfig = toml::from_str(
            r#"
[[agents.verification]]
name = "v1"
[[agents.verification]]
name = "v2"
[agents.conversion]
name = "c"
[[agents.validation]]
name = "a"
"#,
        )
        .unwrap();

        assert!(matches!(
            config.to_run_config(),
            Err(DomainError::EvenPanel { size: 2, .. })
        ));
    }

    #[test]
    fn test_unknown_provider_rejected_at_load() {
        let config: FileConfig = toml::from_str(
            r#"
[[agents.verification]]
name = "v"
provider = "openai"
[agents.conversion]
name = "c"
[[agents.validation]]
name = "a"
"#,
        )
        .unwrap();

        assert!(matches!(
            config.to_run_config(),
            Err(DomainError::UnknownProvider { ref provider, .. }) if provider == "openai"
        ));
    }

    #[test]
    fn test_default_config_has_no_conversion_agent() {
        assert!(matches!(
            FileConfig::default().to_run_config(),
            Err(DomainError::InvalidConfiguration(_))
        ));
    }
}
