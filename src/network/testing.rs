use super::gateway::ModelGateway;
use super::request::ModelRequest;
use crate::error::GatewayError;
use async_trait::async_trait;
use std::sync::Mutex;

type Responder = Box<dyn Fn(&ModelRequest) -> Result<String, GatewayError> + Send + Sync>;

/// In-memory gateway that answers from a closure and records every request.
pub(crate) struct ScriptedGateway {
    responder: Responder,
    calls: Mutex<Vec<ModelRequest>>,
}

impl ScriptedGateway {
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&ModelRequest) -> Result<String, GatewayError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(text.clone()))
    }

    pub(crate) fn failing(status_code: u16) -> Self {
        Self::new(move |_| {
            Err(GatewayError::Provider {
                status_code,
                body: "scripted failure".into(),
            })
        })
    }

    pub(crate) fn calls(&self) -> Vec<ModelRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_with_system(&self, system_prompt: &str) -> Vec<ModelRequest> {
        self.calls()
            .into_iter()
            .filter(|r| r.is_system(system_prompt))
            .collect()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn invoke(&self, request: ModelRequest) -> Result<String, GatewayError> {
        let response = (self.responder)(&request);
        self.calls.lock().unwrap().push(request);
        response
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
