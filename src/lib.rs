pub mod common;
pub mod config;
pub mod error;
pub mod network;
pub mod pipeline;

pub use common::{MediaType, ScreenCapture};
pub use crate::config::Configuration;
pub use error::{AppError, GatewayError};

pub use network::{HttpGateway, ModelGateway, ModelRequest, ProviderKind};
pub use pipeline::{
    AnalysisResult, DetectionMode, PipelineSettings, PromptPipeline, PromptPipelineBuilder,
    PromptVerbosity, RunStatus,
};
