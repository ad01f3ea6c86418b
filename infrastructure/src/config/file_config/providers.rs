//! Provider configuration from TOML (`[providers.<name>]` tables)

use serde::{Deserialize, Serialize};
use udc_domain::{ApiKey, DomainError, ProviderSpec, RequestFormat};

/// Raw provider configuration from TOML
///
/// # Example
///
/// ```toml
/// [providers.anthropic]
/// base_url = "https://api.anthropic.com"
/// request_format = "anthropic"
/// api_key = "${ANTHROPIC_API_KEY}"
/// ```
///
/// `auth_header` and `auth_prefix` fall back to the request format's
/// defaults. A provider with neither an `api_key` nor an `auth_header` is
/// treated as an unauthenticated local server, as is `auth_header = ""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    pub base_url: String,
    pub endpoint: Option<String>,
    /// "openai", "anthropic" or "google" (a "-style" suffix is accepted)
    pub request_format: String,
    pub auth_header: Option<String>,
    pub auth_prefix: Option<String>,
    /// Literal key, or `${VAR}` to read it from the environment
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    /// Anthropic API version header
    pub api_version: Option<String>,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1234".to_string(),
            endpoint: None,
            request_format: "openai".to_string(),
            auth_header: None,
            auth_prefix: None,
            api_key: None,
            max_tokens: None,
            api_version: None,
        }
    }
}

impl FileProviderConfig {
    /// Resolve this table into a [`ProviderSpec`] named `name`
    pub fn to_spec(&self, name: &str) -> Result<ProviderSpec, DomainError> {
        let format: RequestFormat = self.request_format.parse().map_err(|e| {
            DomainError::InvalidConfiguration(format!("providers.{}: {}", name, e))
        })?;
        let api_key = ApiKey::parse(self.api_key.as_deref().unwrap_or_default());

        let mut spec = ProviderSpec::new(name, self.base_url.clone(), format);
        if let Some(endpoint) = &self.endpoint {
            spec = spec.with_endpoint(endpoint.clone());
        }
        if let Some(max_tokens) = self.max_tokens {
            spec.max_tokens = max_tokens;
        }
        spec.api_version = self.api_version.clone();

        spec = match self.auth_header.as_deref().map(str::trim) {
            Some("") => spec.without_auth(),
            Some(header) => {
                let prefix = self.auth_prefix.clone().unwrap_or_else(|| {
                    if header.eq_ignore_ascii_case(format.default_auth_header()) {
                        format.default_auth_prefix().to_string()
                    } else {
                        String::new()
                    }
                });
                spec.with_auth(header, prefix)
            }
            None if api_key == ApiKey::None => spec.without_auth(),
            None => match &self.auth_prefix {
                Some(prefix) => spec.with_auth(format.default_auth_header(), prefix.clone()),
                None => spec,
            },
        };

        Ok(spec.with_api_key(api_key))
    }
}
