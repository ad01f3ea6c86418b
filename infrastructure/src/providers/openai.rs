//! OpenAI-style chat completions (also LM Studio and other compatible servers)

use serde::{Deserialize, Serialize};
use udc_application::GatewayError;
use udc_domain::{AgentSpec, Message, ProviderSpec, session::split_system};

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    temperature: f64,
    max_tokens: u32,
    stream: bool,
    messages: Vec<OpenAiMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiReplyMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiReplyMessage {
    content: Option<String>,
}

pub(crate) fn build_body(
    provider: &ProviderSpec,
    agent: &AgentSpec,
    messages: &[Message],
) -> serde_json::Value {
    let (system, rest) = split_system(messages);

    let mut wire = Vec::with_capacity(rest.len() + 1);
    if let Some(system) = system.as_deref() {
        wire.push(OpenAiMessage {
            role: "system",
            content: system,
        });
    }
    wire.extend(rest.iter().map(|m| OpenAiMessage {
        role: m.role.as_str(),
        content: &m.content,
    }));

    let request = OpenAiRequest {
        model: &agent.model,
        temperature: agent.temperature,
        max_tokens: provider.max_tokens,
        stream: false,
        messages: wire,
    };
    serde_json::to_value(&request).unwrap_or_default()
}

pub(crate) fn parse_reply(body: &str) -> Result<String, GatewayError> {
    let response: OpenAiResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::MalformedEnvelope(format!("invalid JSON: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GatewayError::MalformedEnvelope("no choices[0].message.content".into()))
}
