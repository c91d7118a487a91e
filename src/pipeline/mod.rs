pub mod context;
pub mod domain;
pub mod orchestration;
pub mod prompts;
pub mod services;

pub use context::{RunContext, RunMetrics, StageTiming};
pub use domain::{
    AnalysisResult, BoundingBox, Detection, DetectionMode, PipelineSettings, PipelineStage,
    PromptVerbosity, RunStatus,
};
pub use orchestration::{PromptPipeline, PromptPipelineBuilder, StageOutcome};
