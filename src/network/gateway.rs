use super::request::ModelRequest;
use crate::error::GatewayError;
use async_trait::async_trait;

/// Sends one request to a model and returns its raw text. No retries and no
/// pipeline logic live behind this boundary.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn invoke(&self, request: ModelRequest) -> Result<String, GatewayError>;

    fn name(&self) -> &'static str {
        "gateway"
    }
}
