//! Anthropic-style messages API

use serde::{Deserialize, Serialize};
use udc_application::GatewayError;
use udc_domain::{AgentSpec, Message, ProviderSpec, session::split_system};

/// `anthropic-version` header sent when the provider does not set one
pub(crate) const DEFAULT_API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

pub(crate) fn build_body(
    provider: &ProviderSpec,
    agent: &AgentSpec,
    messages: &[Message],
) -> serde_json::Value {
    let (system, rest) = split_system(messages);

    let request = AnthropicRequest {
        model: &agent.model,
        max_tokens: provider.max_tokens,
        temperature: agent.temperature,
        system,
        messages: rest
            .iter()
            .map(|m| AnthropicMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect(),
    };
    serde_json::to_value(&request).unwrap_or_default()
}

pub(crate) fn parse_reply(body: &str) -> Result<String, GatewayError> {
    let response: AnthropicResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::MalformedEnvelope(format!("invalid JSON: {}", e)))?;

    let texts: Vec<String> = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();

    if texts.is_empty() {
        return Err(GatewayError::MalformedEnvelope(
            "no text blocks in content".into(),
        ));
    }
    Ok(texts.join(""))
}
