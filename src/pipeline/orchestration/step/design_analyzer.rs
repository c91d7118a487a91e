use super::describe_image;
use crate::common::capture::ScreenCapture;
use crate::config::StageTuning;
use crate::network::gateway::ModelGateway;
use crate::pipeline::orchestration::stage_outcome::StageOutcome;
use crate::pipeline::prompts::{DESIGN_SYSTEM_PROMPT, DESIGN_USER_PROMPT};
use std::sync::Arc;
use tracing::instrument;

pub const DESIGN_ANALYSIS_UNAVAILABLE: &str =
    "Design analysis unavailable: the layout and design system could not be analyzed.";

/// Whole-image layout and design-system description.
pub struct DesignAnalyzer {
    gateway: Arc<dyn ModelGateway>,
    tuning: StageTuning,
}

impl DesignAnalyzer {
    pub fn new(gateway: Arc<dyn ModelGateway>, tuning: StageTuning) -> Self {
        Self { gateway, tuning }
    }

    #[instrument(skip_all, fields(stage = "design_analysis"))]
    pub async fn analyze(&self, image: &ScreenCapture) -> StageOutcome<String> {
        describe_image(
            self.gateway.as_ref(),
            "Design analysis",
            DESIGN_SYSTEM_PROMPT,
            DESIGN_USER_PROMPT,
            self.tuning,
            image,
            DESIGN_ANALYSIS_UNAVAILABLE,
        )
        .await
    }
}
