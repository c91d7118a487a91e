use super::{ProviderKind, ProviderStrategy};
use crate::error::GatewayError;
use crate::network::request::ModelRequest;
use serde_json::{json, Value};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Messages envelope: separate `system` field, image as a base64 source block.
pub struct AnthropicProvider;

impl ProviderStrategy for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn default_endpoint(&self) -> &'static str {
        "https://api.anthropic.com/v1/messages"
    }

    fn auth_headers(&self, token: &str) -> Vec<(&'static str, String)> {
        vec![
            ("x-api-key", token.to_string()),
            ("anthropic-version", ANTHROPIC_VERSION.to_string()),
        ]
    }

    // No JSON-mode switch exists in this envelope; `want_json` is dropped.
    fn build_request(&self, model: &str, request: &ModelRequest) -> Value {
        let mut content = Vec::new();
        if let Some(image) = &request.image {
            content.push(json!({
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": image.media_type().mime(),
                    "data": image.to_base64(),
                }
            }));
        }
        content.push(json!({ "type": "text", "text": request.user_prompt }));

        let mut body = json!({
            "model": model,
            "max_tokens": request.max_output_tokens,
            "temperature": request.temperature,
            "messages": [{ "role": "user", "content": content }],
        });

        if let Some(system) = &request.system_prompt {
            body["system"] = Value::String(system.clone());
        }

        body
    }

    fn parse_response(&self, body: &Value) -> Result<String, GatewayError> {
        body["content"]
            .as_array()
            .and_then(|blocks| blocks.iter().find_map(|b| b["text"].as_str()))
            .map(str::to_string)
            .ok_or_else(|| GatewayError::MalformedResponse("no text block in response content".into()))
    }
}
