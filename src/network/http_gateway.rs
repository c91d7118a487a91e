use super::credentials::CredentialStore;
use super::gateway::ModelGateway;
use super::provider::{ProviderKind, ProviderStrategy};
use super::request::ModelRequest;
use crate::error::GatewayError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

/// Gateway that talks to a hosted provider over HTTPS.
pub struct HttpGateway {
    client: Client,
    strategy: Box<dyn ProviderStrategy>,
    model: String,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpGateway {
    pub fn new(provider: ProviderKind, model: impl Into<String>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self::with_client(Client::new(), provider, model, credentials)
    }

    pub fn with_client(
        client: Client,
        provider: ProviderKind,
        model: impl Into<String>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            client,
            strategy: provider.strategy(),
            model: model.into(),
            credentials,
        }
    }

    /// The credential store's override, else the provider default.
    pub fn endpoint(&self) -> String {
        self.credentials
            .endpoint(self.strategy.kind().as_str())
            .unwrap_or_else(|| self.strategy.default_endpoint().to_string())
    }

    fn token(&self) -> Result<String, GatewayError> {
        let provider = self.strategy.kind().as_str();
        self.credentials
            .token(provider)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| GatewayError::Authentication {
                provider: provider.to_string(),
            })
    }
}

#[async_trait]
impl ModelGateway for HttpGateway {
    #[instrument(skip(self, request), fields(provider = %self.strategy.kind(), model = %self.model))]
    async fn invoke(&self, request: ModelRequest) -> Result<String, GatewayError> {
        // Checked before anything touches the network
        let token = self.token()?;
        let endpoint = self.endpoint();
        let body = self.strategy.build_request(&self.model, &request);

        let mut builder = self.client.post(&endpoint).json(&body);
        for (name, value) in self.strategy.auth_headers(&token) {
            builder = builder.header(name, value);
        }

        let start = Instant::now();
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Provider {
                status_code: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        let text = self.strategy.parse_response(&payload)?;

        debug!(
            "Model call completed in {}ms ({} chars, image: {})",
            start.elapsed().as_millis(),
            text.len(),
            request.image.is_some()
        );

        Ok(text)
    }

    fn name(&self) -> &'static str {
        self.strategy.kind().as_str()
    }
}
