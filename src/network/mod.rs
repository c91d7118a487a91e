pub mod credentials;
pub mod gateway;
pub mod http_gateway;
pub mod provider;
pub mod request;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use credentials::{CredentialMap, CredentialStore, ProviderCredentials};
pub use gateway::ModelGateway;
pub use http_gateway::HttpGateway;
pub use provider::{ProviderKind, ProviderStrategy};
pub use request::ModelRequest;
pub use service::{GatewayService, TimedGateway};
