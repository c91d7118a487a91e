pub mod processing_pipeline;
pub mod stage_outcome;
pub mod step;

pub use processing_pipeline::{PromptPipeline, PromptPipelineBuilder};
pub use stage_outcome::StageOutcome;
