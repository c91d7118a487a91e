use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Prompt synthesis failed: {0}")]
    Synthesis(#[source] GatewayError),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Configuration Error: {0}")]
    Configuration(#[from] ::config::ConfigError),
    #[error("Image Error: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Model Gateway Error Type
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("No credential configured for provider '{provider}'")]
    Authentication { provider: String },
    #[error("Provider returned status {status_code}: {body}")]
    Provider { status_code: u16, body: String },
    #[error("Failed to reach provider: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
    #[error("Model call exceeded its deadline")]
    Timeout,
}

impl GatewayError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, GatewayError::Authentication { .. })
    }
}
