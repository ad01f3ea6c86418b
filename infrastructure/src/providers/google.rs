//! Google-style `generateContent` API

use serde::{Deserialize, Serialize};
use udc_application::GatewayError;
use udc_domain::{AgentSpec, Message, ProviderSpec, session::split_system};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GoogleContent>,
    contents: Vec<GoogleContent>,
    generation_config: GoogleGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GooglePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleGenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
}

#[derive(Debug, Deserialize)]
struct GoogleCandidate {
    content: Option<GoogleContent>,
}

fn text_content(role: Option<&str>, text: &str) -> GoogleContent {
    GoogleContent {
        role: role.map(str::to_string),
        parts: vec![GooglePart {
            text: Some(text.to_string()),
        }],
    }
}

pub(crate) fn build_body(
    provider: &ProviderSpec,
    agent: &AgentSpec,
    messages: &[Message],
) -> serde_json::Value {
    let (system, rest) = split_system(messages);

    let request = GoogleRequest {
        system_instruction: system.as_deref().map(|s| text_content(None, s)),
        contents: rest
            .iter()
            .map(|m| text_content(Some(m.role.as_str()), &m.content))
            .collect(),
        generation_config: GoogleGenerationConfig {
            temperature: agent.temperature,
            max_output_tokens: provider.max_tokens,
        },
    };
    serde_json::to_value(&request).unwrap_or_default()
}

pub(crate) fn parse_reply(body: &str) -> Result<String, GatewayError> {
    let response: GoogleResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::MalformedEnvelope(format!("invalid JSON: {}", e)))?;

    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .ok_or_else(|| GatewayError::MalformedEnvelope("no candidates[0].content".into()))?;

    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.is_empty() {
        return Err(GatewayError::MalformedEnvelope(
            "no text parts in candidates[0].content".into(),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use udc_domain::{AgentId, AgentRole, RequestFormat};

    #[test]
    fn test_body_shape() {
        let provider = ProviderSpec::new(
            "google",
            "https://generativelanguage.googleapis.com",
            RequestFormat::Google,
        );
        let agent = AgentSpec::new(AgentId::new("validate-0"), "v", AgentRole::Validate)
            .with_model("gemini-2.0-flash")
            .with_temperature(0.5);
        let body = build_body(
            &provider,
            &agent,
            &[Message::system("compare"), Message::user("input and output")],
        );

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "compare");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "input and output");
        assert_eq!(body["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn test_parse_reply() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"<isvalid>"},{"text":"false</isvalid>"}]}}]}"#;
        assert_eq!(parse_reply(body).unwrap(), "<isvalid>false</isvalid>");
    }

    #[test]
    fn test_parse_reply_without_candidates() {
        assert!(matches!(
            parse_reply(r#"{"candidates":[]}"#),
            Err(GatewayError::MalformedEnvelope(_))
        ));
    }
}
