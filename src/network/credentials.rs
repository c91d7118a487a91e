use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Read-only view of stored provider settings, keyed by provider name.
pub trait CredentialStore: Send + Sync {
    fn endpoint(&self, provider: &str) -> Option<String>;
    fn token(&self, provider: &str) -> Option<String>;
}

#[derive(Clone, Default, Deserialize)]
pub struct ProviderCredentials {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// In-memory credential store, usually built from the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct CredentialMap {
    entries: HashMap<String, ProviderCredentials>,
}

impl CredentialMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, provider: &str, token: impl Into<String>) -> Self {
        self.entries.entry(provider.to_string()).or_default().api_key = Some(token.into());
        self
    }

    pub fn with_endpoint(mut self, provider: &str, endpoint: impl Into<String>) -> Self {
        self.entries.entry(provider.to_string()).or_default().endpoint = Some(endpoint.into());
        self
    }
}

impl From<HashMap<String, ProviderCredentials>> for CredentialMap {
    fn from(entries: HashMap<String, ProviderCredentials>) -> Self {
        Self { entries }
    }
}

impl CredentialStore for CredentialMap {
    fn endpoint(&self, provider: &str) -> Option<String> {
        self.entries
            .get(provider)
            .and_then(|c| c.endpoint.clone())
            .filter(|e| !e.trim().is_empty())
    }

    fn token(&self, provider: &str) -> Option<String> {
        self.entries
            .get(provider)
            .and_then(|c| c.api_key.clone())
            .filter(|t| !t.trim().is_empty())
    }
}
