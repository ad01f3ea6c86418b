//! Provider specifications (serde-free).
//!
//! A [`ProviderSpec`] names one inference back-end and the request shape it
//! speaks. Agents reference providers by name.

use crate::core::error::DomainError;
use std::fmt;

/// Wire shape of a provider's request and response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RequestFormat {
    /// `messages` array with `system`/`user` roles, `choices[0].message.content` reply
    #[default]
    OpenAi,
    /// Top-level `system` field, `content[].text` reply
    Anthropic,
    /// `systemInstruction` + `contents`, `candidates[0].content.parts[].text` reply
    Google,
}

impl RequestFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestFormat::OpenAi => "openai",
            RequestFormat::Anthropic => "anthropic",
            RequestFormat::Google => "google",
        }
    }

    /// Header carrying the credential when the provider does not name one
    pub fn default_auth_header(&self) -> &'static str {
        match self {
            RequestFormat::OpenAi => "Authorization",
            RequestFormat::Anthropic => "x-api-key",
            RequestFormat::Google => "x-goog-api-key",
        }
    }

    /// Prefix placed before the credential in the auth header
    pub fn default_auth_prefix(&self) -> &'static str {
        match self {
            RequestFormat::OpenAi => "Bearer ",
            RequestFormat::Anthropic | RequestFormat::Google => "",
        }
    }

    /// Endpoint path used when the provider does not name one
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            RequestFormat::OpenAi => "v1/chat/completions",
            RequestFormat::Anthropic => "v1/messages",
            RequestFormat::Google => "v1beta/models/{model}:generateContent",
        }
    }
}

impl fmt::Display for RequestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim_end_matches("-style") {
            "openai" => Ok(RequestFormat::OpenAi),
            "anthropic" => Ok(RequestFormat::Anthropic),
            "google" | "gemini" => Ok(RequestFormat::Google),
            other => Err(format!(
                "Unknown request format: {}. Valid: openai, anthropic, google",
                other
            )),
        }
    }
}

/// Where a provider's API key comes from
#[derive(Clone, PartialEq, Eq, Default)]
pub enum ApiKey {
    /// No key configured
    #[default]
    None,
    /// Key given directly in configuration
    Literal(String),
    /// Key read from the named environment variable
    Env(String),
}

impl ApiKey {
    /// Parse a configured value: `${VAR}` refers to an environment variable,
    /// an empty string means no key, anything else is a literal key
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            ApiKey::None
        } else if let Some(var) = raw.strip_prefix("${").and_then(|r| r.strip_suffix('}')) {
            ApiKey::Env(var.to_string())
        } else {
            ApiKey::Literal(raw.to_string())
        }
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiKey::None => f.write_str("None"),
            ApiKey::Literal(_) => f.write_str("Literal(<redacted>)"),
            ApiKey::Env(var) => write!(f, "Env({var})"),
        }
    }
}

/// One inference back-end
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSpec {
    pub name: String,
    /// Scheme and host, e.g. `https://api.openai.com`
    pub base_url: String,
    /// Path appended to `base_url`; `{model}` is replaced with the agent's model
    pub endpoint: String,
    /// Header carrying the credential; `None` for unauthenticated local servers
    pub auth_header: Option<String>,
    pub auth_prefix: String,
    pub request_format: RequestFormat,
    pub api_key: ApiKey,
    /// Upper bound on generated tokens (required by anthropic-style back-ends)
    pub max_tokens: u32,
    /// `anthropic-version` header value for anthropic-style back-ends
    pub api_version: Option<String>,
}

impl ProviderSpec {
    /// Create a provider with the format's default endpoint and authentication
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, format: RequestFormat) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            endpoint: format.default_endpoint().to_string(),
            auth_header: Some(format.default_auth_header().to_string()),
            auth_prefix: format.default_auth_prefix().to_string(),
            request_format: format,
            api_key: ApiKey::None,
            max_tokens: 8192,
            api_version: None,
        }
    }

    /// Unauthenticated local OpenAI-compatible server (e.g. LM Studio)
    pub fn local(base_url: impl Into<String>) -> Self {
        Self::new("local", base_url, RequestFormat::OpenAi).without_auth()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_api_key(mut self, key: ApiKey) -> Self {
        self.api_key = key;
        self
    }

    pub fn with_auth(mut self, header: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.auth_header = Some(header.into());
        self.auth_prefix = prefix.into();
        self
    }

    pub fn without_auth(mut self) -> Self {
        self.auth_header = None;
        self.auth_prefix = String::new();
        self
    }

    /// Whether calls to this provider need a credential
    pub fn requires_credential(&self) -> bool {
        self.auth_header.is_some()
    }

    /// Full request URL for `model`
    pub fn url_for(&self, model: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let endpoint = self.endpoint.trim_start_matches('/').replace("{model}", model);
        format!("{}/{}", base, endpoint)
    }

    /// Resolve this provider's credential using `lookup` for environment variables
    ///
    /// Returns `Ok(None)` for providers that need no credential.
    pub fn resolve_credential<F>(&self, lookup: F) -> Result<Option<String>, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !self.requires_credential() {
            return Ok(None);
        }

        let missing = |variable: &str| DomainError::CredentialMissing {
            provider: self.name.clone(),
            variable: variable.to_string(),
        };

        match &self.api_key {
            ApiKey::Literal(key) => Ok(Some(key.clone())),
            ApiKey::Env(var) => lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(Some)
                .ok_or_else(|| missing(var)),
            ApiKey::None => Err(missing("<no api_key configured>")),
        }
    }
}
