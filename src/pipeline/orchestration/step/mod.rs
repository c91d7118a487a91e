pub mod activity_describer;
pub mod component_analyzer;
pub mod component_detector;
pub mod design_analyzer;
pub mod prompt_synthesizer;

pub use activity_describer::ActivityDescriber;
pub use component_analyzer::ComponentAnalyzer;
pub use component_detector::ComponentDetector;
pub use design_analyzer::DesignAnalyzer;
pub use prompt_synthesizer::PromptSynthesizer;

use super::stage_outcome::StageOutcome;
use crate::common::capture::ScreenCapture;
use crate::config::StageTuning;
use crate::network::gateway::ModelGateway;
use crate::network::request::ModelRequest;
use tracing::warn;

/// One plain-text, whole-image model call. Any gateway failure degrades to
/// `sentinel`.
async fn describe_image(
    gateway: &dyn ModelGateway,
    stage: &'static str,
    system_prompt: &str,
    user_prompt: &str,
    tuning: StageTuning,
    image: &ScreenCapture,
    sentinel: &str,
) -> StageOutcome<String> {
    let request = ModelRequest::new(user_prompt)
        .system(system_prompt)
        .temperature(tuning.temperature)
        .max_output_tokens(tuning.max_tokens)
        .image(image.clone());

    match gateway.invoke(request).await {
        Ok(text) if !text.trim().is_empty() => StageOutcome::Ok(text.trim().to_string()),
        Ok(_) => {
            warn!("{} returned an empty response", stage);
            StageOutcome::degraded(sentinel.to_string(), "empty response")
        }
        Err(e) => {
            warn!("{} failed: {}", stage, e);
            StageOutcome::degraded(sentinel.to_string(), e.to_string())
        }
    }
}
