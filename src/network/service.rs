use super::gateway::ModelGateway;
use super::request::ModelRequest;
use crate::error::GatewayError;
use async_trait::async_trait;
use futures::Future;
use futures::task::Context;
use futures::task::Poll;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tower::timeout::error::Elapsed;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, Service, ServiceBuilder, ServiceExt};

/// Exposes a gateway as a tower service so middleware can be layered on.
#[derive(Clone)]
pub struct GatewayService {
    inner: Arc<dyn ModelGateway>,
}

impl GatewayService {
    pub fn new(inner: Arc<dyn ModelGateway>) -> Self {
        Self { inner }
    }
}

impl Service<ModelRequest> for GatewayService {
    type Response = String;
    type Error = GatewayError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ModelRequest) -> Self::Future {
        let inner = self.inner.clone();
        Box::pin(async move { inner.invoke(req).await })
    }
}

/// Gateway wrapper enforcing a per-call deadline.
pub struct TimedGateway {
    inner: Arc<dyn ModelGateway>,
    timeout: Option<Duration>,
}

impl TimedGateway {
    pub fn new(inner: Arc<dyn ModelGateway>, timeout: Option<Duration>) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl ModelGateway for TimedGateway {
    async fn invoke(&self, request: ModelRequest) -> Result<String, GatewayError> {
        let service = GatewayService::new(self.inner.clone());
        match self.timeout {
            Some(limit) => ServiceBuilder::new()
                .layer(TimeoutLayer::new(limit))
                .service(service)
                .oneshot(request)
                .await
                .map_err(into_gateway_error),
            None => service.oneshot(request).await,
        }
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

fn into_gateway_error(err: BoxError) -> GatewayError {
    if err.is::<Elapsed>() {
        return GatewayError::Timeout;
    }
    match err.downcast::<GatewayError>() {
        Ok(gateway_error) => *gateway_error,
        Err(other) => GatewayError::MalformedResponse(other.to_string()),
    }
}
