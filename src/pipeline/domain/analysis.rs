use super::detection::Detection;
use crate::pipeline::context::metrics::RunMetrics;
use serde::Serialize;

pub const NO_DETECTIONS_SENTINEL: &str =
    "No UI components were detected in the screenshot.";
pub const CANCELLED_SENTINEL: &str = "Analysis was cancelled before it completed.";

/// Where a failed run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Detection,
    DesignAnalysis,
    ActivityDescription,
    ComponentAnalysis,
    Synthesis,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Detection => "detection",
            PipelineStage::DesignAnalysis => "design_analysis",
            PipelineStage::ActivityDescription => "activity_description",
            PipelineStage::ComponentAnalysis => "component_analysis",
            PipelineStage::Synthesis => "synthesis",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    NoDetections,
    Failed { stage: PipelineStage, message: String },
    Cancelled,
}

/// What a pipeline run hands back to its caller. Always fully populated.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub design_summary: String,
    pub component_summaries: Vec<String>,
    pub final_prompt: String,
    pub status: RunStatus,
    pub detections: Vec<Detection>,
    pub metrics: RunMetrics,
}

impl AnalysisResult {
    pub fn no_detections(metrics: RunMetrics) -> Self {
        Self::sentinel(NO_DETECTIONS_SENTINEL.to_string(), RunStatus::NoDetections, metrics)
    }

    pub fn failed(stage: PipelineStage, message: String, metrics: RunMetrics) -> Self {
        let text = format!("Analysis failed during {}: {}", stage.as_str(), message);
        Self::sentinel(text, RunStatus::Failed { stage, message }, metrics)
    }

    pub fn cancelled(metrics: RunMetrics) -> Self {
        Self::sentinel(CANCELLED_SENTINEL.to_string(), RunStatus::Cancelled, metrics)
    }

    fn sentinel(text: String, status: RunStatus, metrics: RunMetrics) -> Self {
        Self {
            design_summary: text.clone(),
            component_summaries: vec![text.clone()],
            final_prompt: text,
            status,
            detections: Vec::new(),
            metrics,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}
