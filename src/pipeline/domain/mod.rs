pub mod analysis;
pub mod detection;
pub mod settings;

pub use analysis::{AnalysisResult, PipelineStage, RunStatus};
pub use detection::{BoundingBox, Detection};
pub use settings::{DetectionMode, PipelineSettings, PromptVerbosity};
