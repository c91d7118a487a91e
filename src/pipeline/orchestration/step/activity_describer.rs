use super::describe_image;
use crate::common::capture::ScreenCapture;
use crate::config::StageTuning;
use crate::network::gateway::ModelGateway;
use crate::pipeline::orchestration::stage_outcome::StageOutcome;
use crate::pipeline::prompts::{ACTIVITY_SYSTEM_PROMPT, ACTIVITY_USER_PROMPT};
use std::sync::Arc;
use tracing::instrument;

pub const ACTIVITY_DESCRIPTION_UNAVAILABLE: &str =
    "Activity description unavailable: the on-screen activity could not be described.";

pub struct ActivityDescriber {
    gateway: Arc<dyn ModelGateway>,
    tuning: StageTuning,
}

impl ActivityDescriber {
    pub fn new(gateway: Arc<dyn ModelGateway>, tuning: StageTuning) -> Self {
        Self { gateway, tuning }
    }

    #[instrument(skip_all, fields(stage = "activity_description"))]
    pub async fn describe(&self, image: &ScreenCapture) -> StageOutcome<String> {
        describe_image(
            self.gateway.as_ref(),
            "Activity description",
            ACTIVITY_SYSTEM_PROMPT,
            ACTIVITY_USER_PROMPT,
            self.tuning,
            image,
            ACTIVITY_DESCRIPTION_UNAVAILABLE,
        )
        .await
    }
}
