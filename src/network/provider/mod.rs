// Provider envelope strategies behind the one gateway contract
use super::request::ModelRequest;
use crate::error::{AppError, GatewayError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    /// Key used for credential lookups.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    pub fn strategy(&self) -> Box<dyn ProviderStrategy> {
        match self {
            ProviderKind::OpenAi => Box::new(OpenAiProvider),
            ProviderKind::Anthropic => Box::new(AnthropicProvider),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            other => Err(AppError::InvalidArgument(format!("unknown provider '{other}'"))),
        }
    }
}

/// Builds and reads one provider's wire envelope.
pub trait ProviderStrategy: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn default_endpoint(&self) -> &'static str;

    fn auth_headers(&self, token: &str) -> Vec<(&'static str, String)>;

    fn build_request(&self, model: &str, request: &ModelRequest) -> Value;

    fn parse_response(&self, body: &Value) -> Result<String, GatewayError>;
}
