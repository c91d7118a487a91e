use super::{ProviderKind, ProviderStrategy};
use crate::error::GatewayError;
use crate::network::request::ModelRequest;
use serde_json::{json, Value};

/// Chat-completions envelope: flat message list, image as a `data:` URL part.
pub struct OpenAiProvider;

impl ProviderStrategy for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn default_endpoint(&self) -> &'static str {
        "https://api.openai.com/v1/chat/completions"
    }

    fn auth_headers(&self, token: &str) -> Vec<(&'static str, String)> {
        vec![("Authorization", format!("Bearer {token}"))]
    }

    fn build_request(&self, model: &str, request: &ModelRequest) -> Value {
        let mut messages = Vec::new();
        if let Some(system) = &request.system_prompt {
            messages.push(json!({ "role": "system", "content": system }));
        }

        let user_content = match &request.image {
            Some(image) => json!([
                { "type": "text", "text": request.user_prompt },
                { "type": "image_url", "image_url": { "url": image.data_url() } }
            ]),
            None => Value::String(request.user_prompt.clone()),
        };
        messages.push(json!({ "role": "user", "content": user_content }));

        let mut body = json!({
            "model": model,
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_output_tokens,
        });

        if request.want_json {
            body["response_format"] = json!({ "type": "json_object" });
        }

        body
    }

    fn parse_response(&self, body: &Value) -> Result<String, GatewayError> {
        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                GatewayError::MalformedResponse("no choices[0].message.content in response".into())
            })
    }
}
