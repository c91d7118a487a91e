use crate::common::capture::ScreenCapture;
use crate::config::StageTuning;
use crate::network::gateway::ModelGateway;
use crate::network::request::ModelRequest;
use crate::pipeline::orchestration::stage_outcome::StageOutcome;
use crate::pipeline::prompts::{component_user_prompt, COMPONENT_SYSTEM_PROMPT};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub const COMPONENT_ANALYSIS_UNAVAILABLE: &str =
    "Component analysis unavailable: this component could not be analyzed.";

/// Structured description of a single detected component.
///
/// The image may be the full screenshot or a crop of the component; cropping
/// is the image processor's job.
pub struct ComponentAnalyzer {
    gateway: Arc<dyn ModelGateway>,
    tuning: StageTuning,
}

impl ComponentAnalyzer {
    pub fn new(gateway: Arc<dyn ModelGateway>, tuning: StageTuning) -> Self {
        Self { gateway, tuning }
    }

    #[instrument(skip(self, image), fields(stage = "component_analysis"))]
    pub async fn analyze(&self, image: &ScreenCapture, index: usize, location_label: &str) -> StageOutcome<String> {
        let request = ModelRequest::new(component_user_prompt(index, location_label))
            .system(COMPONENT_SYSTEM_PROMPT)
            .temperature(self.tuning.temperature)
            .max_output_tokens(self.tuning.max_tokens)
            .json(true)
            .image(image.clone());

        match self.gateway.invoke(request).await {
            Ok(raw) if !raw.trim().is_empty() => {
                debug!("Analyzed component {}", index + 1);
                StageOutcome::Ok(with_location(location_label, raw.trim()))
            }
            Ok(_) => {
                warn!("Component {} analysis returned an empty response", index + 1);
                StageOutcome::degraded(
                    with_location(location_label, COMPONENT_ANALYSIS_UNAVAILABLE),
                    "empty response",
                )
            }
            Err(e) => {
                warn!("Component {} analysis failed: {}", index + 1, e);
                StageOutcome::degraded(
                    with_location(location_label, COMPONENT_ANALYSIS_UNAVAILABLE),
                    e.to_string(),
                )
            }
        }
    }
}

fn with_location(location_label: &str, body: &str) -> String {
    format!("[Location: {location_label}]\n{body}")
}
