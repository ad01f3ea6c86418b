//! HTTP agent gateway
//!
//! Sends one agent call to the provider it references, in that provider's
//! request format, with the adapter-level retry policy around the exchange.
//! Credentials are resolved once, when the gateway is built.

use super::retry::{RetryConfig, RetryPolicy};
use super::{anthropic, google, openai};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use udc_application::{AgentGateway, CallSettings, GatewayError};
use udc_domain::{
    AgentCallResult, AgentRoster, AgentSpec, DomainError, Message, ProviderSpec, RequestFormat,
};

/// Longest error body kept on an `HttpStatus` failure
const MAX_ERROR_BODY_CHARS: usize = 500;

struct ResolvedProvider {
    spec: ProviderSpec,
    credential: Option<String>,
}

/// [`AgentGateway`] over reqwest
pub struct HttpAgentGateway {
    client: reqwest::Client,
    providers: HashMap<String, ResolvedProvider>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl HttpAgentGateway {
    /// Build a gateway, resolving credentials from the process environment
    ///
    /// # Errors
    /// `UnknownProvider` if an agent references a provider that is not
    /// configured, `CredentialMissing` if a referenced provider needs a
    /// credential that cannot be resolved.
    pub fn new(
        providers: Vec<ProviderSpec>,
        roster: &AgentRoster,
        call: &CallSettings,
    ) -> Result<Self, DomainError> {
        Self::with_lookup(providers, roster, call, |var| std::env::var(var).ok())
    }

    /// Build a gateway with a custom environment lookup (for testing)
    pub fn with_lookup<F>(
        providers: Vec<ProviderSpec>,
        roster: &AgentRoster,
        call: &CallSettings,
        lookup: F,
    ) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        roster.validate_providers(&providers)?;

        let mut resolved = HashMap::with_capacity(providers.len());
        for spec in providers {
            let referenced = roster.agents().any(|agent| agent.provider == spec.name);
            let credential = if referenced {
                spec.resolve_credential(&lookup)?
            } else {
                None
            };
            resolved.insert(spec.name.clone(), ResolvedProvider { spec, credential });
        }

        let client = reqwest::Client::builder()
            .timeout(call.timeout)
            .build()
            .map_err(|e| {
                DomainError::InvalidConfiguration(format!("could not build HTTP client: {}", e))
            })?;

        info!(
            providers = resolved.len(),
            timeout_secs = call.timeout.as_secs(),
            retry_attempts = call.retry_attempts,
            "HttpAgentGateway initialized"
        );

        Ok(Self {
            client,
            providers: resolved,
            retry: RetryPolicy::new(RetryConfig::from(call)),
            timeout: call.timeout,
        })
    }

    async fn send_once(
        &self,
        provider: &ResolvedProvider,
        agent: &AgentSpec,
        messages: &[Message],
    ) -> Result<String, GatewayError> {
        let spec = &provider.spec;
        let url = spec.url_for(&agent.model);
        let body = match spec.request_format {
            RequestFormat::OpenAi => openai::build_body(spec, agent, messages),
            RequestFormat::Anthropic => anthropic::build_body(spec, agent, messages),
            RequestFormat::Google => google::build_body(spec, agent, messages),
        };

        let mut request = self.client.post(&url).json(&body);
        if let (Some(header), Some(credential)) = (&spec.auth_header, &provider.credential) {
            request = request.header(header.as_str(), format!("{}{}", spec.auth_prefix, credential));
        }
        if spec.request_format == RequestFormat::Anthropic {
            request = request.header(
                "anthropic-version",
                spec.api_version.as_deref().unwrap_or(anthropic::DEFAULT_API_VERSION),
            );
        }

        debug!(agent = %agent.id, provider = %spec.name, url = %url, "Sending agent request");
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(GatewayError::HttpStatus {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        match spec.request_format {
            RequestFormat::OpenAi => openai::parse_reply(&text),
            RequestFormat::Anthropic => anthropic::parse_reply(&text),
            RequestFormat::Google => google::parse_reply(&text),
        }
    }

    fn transport_error(&self, error: reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout(self.timeout)
        } else {
            GatewayError::Connection(error.to_string())
        }
    }
}

#[async_trait]
impl AgentGateway for HttpAgentGateway {
    async fn send(&self, agent: &AgentSpec, messages: &[Message]) -> AgentCallResult {
        let started = Instant::now();

        let Some(provider) = self.providers.get(&agent.provider) else {
            let error = GatewayError::UnknownProvider(agent.provider.clone());
            return AgentCallResult::failure(
                agent.id.clone(),
                error.kind(),
                error.to_string(),
                started.elapsed(),
            );
        };

        let outcome = self
            .retry
            .execute(|| self.send_once(provider, agent, messages))
            .await;
        let latency = started.elapsed();

        match outcome {
            Ok(text) => {
                debug!(
                    agent = %agent.id,
                    latency_ms = latency.as_millis() as u64,
                    bytes = text.len(),
                    "Agent replied"
                );
                AgentCallResult::success(agent.id.clone(), text, latency)
            }
            Err(error) => {
                warn!(
                    agent = %agent.id,
                    provider = %provider.spec.name,
                    latency_ms = latency.as_millis() as u64,
                    "Agent call failed: {}",
                    error
                );
                AgentCallResult::failure(agent.id.clone(), error.kind(), error.to_string(), latency)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use udc_domain::{AgentId, AgentRole, ApiKey, CallErrorKind};

    fn roster_on(provider: &str) -> AgentRoster {
        let agent = |role: AgentRole, i: usize| {
            AgentSpec::new(AgentId::for_role(role, i), format!("{role}-{i}"), role)
                .with_provider(provider)
                .with_model("test-model")
        };
        AgentRoster::new(
            vec![agent(AgentRole::Verify, 0)],
            agent(AgentRole::Convert, 0),
            vec![agent(AgentRole::Validate, 0)],
        )
    }

    fn call_settings(retry_attempts: u32) -> CallSettings {
        CallSettings {
            timeout: Duration::from_secs(5),
            retry_attempts,
            retry_backoff: Duration::ZERO,
        }
    }

    fn messages() -> Vec<Message> {
        vec![Message::system("be strict"), Message::user("a,b\n1,2")]
    }

    fn gateway(provider: ProviderSpec, retry_attempts: u32) -> HttpAgentGateway {
        let roster = roster_on(&provider.name);
        HttpAgentGateway::with_lookup(vec![provider], &roster, &call_settings(retry_attempts), |var| {
            (var == "TEST_API_KEY").then(|| "sk-test".to_string())
        })
        .unwrap()
    }

    fn verifier(provider: &str) -> AgentSpec {
        roster_on(provider).verification[0].clone()
    }

    #[tokio::test]
    async fn test_openai_request_and_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "test-model",
                "stream": false,
                "messages": [
                    {"role": "system", "content": "be strict"},
                    {"role": "user", "content": "a,b\n1,2"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"<isvalid>true</isvalid>"}}]}"#)
            .expect(1)
            .create_async()
            .await;

        let provider = ProviderSpec::new("openai", server.url(), RequestFormat::OpenAi)
            .with_api_key(ApiKey::Env("TEST_API_KEY".into()));
        let result = gateway(provider, 1).send(&verifier("openai"), &messages()).await;

        mock.assert_async().await;
        assert!(result.success);
        assert_eq!(result.raw_response, "<isvalid>true</isvalid>");
    }

    #[tokio::test]
    async fn test_local_provider_sends_no_auth_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"ok"}}]}"#)
            .create_async()
            .await;

        let result = gateway(ProviderSpec::local(server.url()), 1)
            .send(&verifier("local"), &messages())
            .await;

        mock.assert_async().await;
        assert!(result.success);
    }

    #[tokio::test]
    async fn test_anthropic_request_and_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "sk-test")
            .match_header("anthropic-version", "2023-06-01")
            .match_body(Matcher::PartialJson(json!({
                "model": "test-model",
                "system": "be strict",
                "messages": [{"role": "user", "content": "a,b\n1,2"}]
            })))
            .with_status(200)
            .with_body(r#"{"content":[{"type":"text","text":"<output>[]</output>"}]}"#)
            .create_async()
            .await;

        let provider = ProviderSpec::new("anthropic", server.url(), RequestFormat::Anthropic)
            .with_api_key(ApiKey::Literal("sk-test".into()));
        let result = gateway(provider, 1).send(&verifier("anthropic"), &messages()).await;

        mock.assert_async().await;
        assert!(result.success);
        assert_eq!(result.raw_response, "<output>[]</output>");
    }

    #[tokio::test]
    async fn test_google_request_and_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/test-model:generateContent")
            .match_header("x-goog-api-key", "sk-test")
            .match_body(Matcher::PartialJson(json!({
                "systemInstruction": {"parts": [{"text": "be strict"}]},
                "contents": [{"role": "user", "parts": [{"text": "a,b\n1,2"}]}]
            })))
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"<isvalid>false</isvalid>"}]}}]}"#)
            .create_async()
            .await;

        let provider = ProviderSpec::new("google", server.url(), RequestFormat::Google)
            .with_api_key(ApiKey::Env("TEST_API_KEY".into()));
        let result = gateway(provider, 1).send(&verifier("google"), &messages()).await;

        mock.assert_async().await;
        assert_eq!(result.raw_response, "<isvalid>false</isvalid>");
    }

    #[tokio::test]
    async fn test_server_errors_retried_then_unreachable() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(503)
            .with_body("overloaded")
            .expect(3)
            .create_async()
            .await;

        let result = gateway(ProviderSpec::local(server.url()), 3)
            .send(&verifier("local"), &messages())
            .await;

        mock.assert_async().await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(CallErrorKind::Unreachable));
        assert!(result.error_message.unwrap_or_default().contains("503"));
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(401)
            .with_body("invalid key")
            .expect(1)
            .create_async()
            .await;

        let result = gateway(ProviderSpec::local(server.url()), 3)
            .send(&verifier("local"), &messages())
            .await;

        mock.assert_async().await;
        assert_eq!(result.error_kind, Some(CallErrorKind::Unreachable));
    }

    #[tokio::test]
    async fn test_malformed_envelope_is_unparseable() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"unexpected": true}"#)
            .expect(1)
            .create_async()
            .await;

        let result = gateway(ProviderSpec::local(server.url()), 3)
            .send(&verifier("local"), &messages())
            .await;

        mock.assert_async().await;
        assert_eq!(result.error_kind, Some(CallErrorKind::UnparseableResponse));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let result = gateway(ProviderSpec::local("http://127.0.0.1:1"), 2)
            .send(&verifier("local"), &messages())
            .await;

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(CallErrorKind::Unreachable));
    }

    #[tokio::test]
    async fn test_silent_server_times_out_and_retries() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        // accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&accepted);
        tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                open.push(socket);
            }
        });

        let provider = ProviderSpec::local(format!("http://{address}"));
        let roster = roster_on(&provider.name);
        let settings = CallSettings {
            timeout: Duration::from_millis(200),
            retry_attempts: 2,
            retry_backoff: Duration::ZERO,
        };
        let gateway = HttpAgentGateway::with_lookup(vec![provider], &roster, &settings, |_| None).unwrap();

        let started = Instant::now();
        let result = gateway.send(&verifier("local"), &messages()).await;

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(CallErrorKind::Unreachable));
        assert!(result.error_message.as_deref().unwrap_or_default().contains("timed out"));
        assert_eq!(accepted.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() >= Duration::from_millis(400));
    }

    #[test]
    fn test_missing_credential_fails_construction() {
        let provider = ProviderSpec::new("openai", "https://api.openai.com", RequestFormat::OpenAi)
            .with_api_key(ApiKey::Env("UNSET_VARIABLE".into()));
        let result = HttpAgentGateway::with_lookup(
            vec![provider],
            &roster_on("openai"),
            &call_settings(1),
            |_| None,
        );

        assert!(matches!(result, Err(DomainError::CredentialMissing { ref variable, .. }) if variable == "UNSET_VARIABLE"));
    }

    #[test]
    fn test_unreferenced_provider_needs_no_credential() {
        let unused = ProviderSpec::new("openai", "https://api.openai.com", RequestFormat::OpenAi)
            .with_api_key(ApiKey::Env("UNSET_VARIABLE".into()));
        let result = HttpAgentGateway::with_lookup(
            vec![ProviderSpec::local("http://localhost:1234"), unused],
            &roster_on("local"),
            &call_settings(1),
            |_| None,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn test_unknown_provider_fails_construction() {
        let result = HttpAgentGateway::with_lookup(
            vec![ProviderSpec::local("http://localhost:1234")],
            &roster_on("missing"),
            &call_settings(1),
            |_| None,
        );

        assert!(matches!(result, Err(DomainError::UnknownProvider { .. })));
    }
}
