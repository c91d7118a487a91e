use crate::config::StageTuning;
use crate::error::{AppError, GatewayError};
use crate::network::gateway::ModelGateway;
use crate::network::request::ModelRequest;
use crate::pipeline::domain::settings::PromptVerbosity;
use crate::pipeline::orchestration::stage_outcome::StageOutcome;
use crate::pipeline::prompts::{DETECTION_TERM, SYNTHESIS_SYSTEM_PROMPT};
use std::sync::Arc;
use tracing::{debug, error, instrument};

pub const PROMPT_PREFIX: &str = "Build this app: ";
pub const NO_DESIGN_ANALYSIS: &str = "No design analysis available.";

/// Merges the stage outputs into one build prompt and runs a final model
/// pass over it.
pub struct PromptSynthesizer {
    gateway: Arc<dyn ModelGateway>,
    tuning: StageTuning,
}

impl PromptSynthesizer {
    pub fn new(gateway: Arc<dyn ModelGateway>, tuning: StageTuning) -> Self {
        Self { gateway, tuning }
    }

    /// Only this stage can fail a run: a provider error or an empty reply
    /// is `Fatal`.
    #[instrument(skip_all, fields(stage = "synthesis", components = component_summaries.len()))]
    pub async fn synthesize(
        &self,
        design_summary: &str,
        component_summaries: &[String],
        activity_summary: &str,
        verbosity: PromptVerbosity,
    ) -> StageOutcome<String> {
        let merged = compose(design_summary, component_summaries, activity_summary, verbosity);
        debug!("Merged prompt is {} bytes", merged.len());

        let request = ModelRequest::new(merged)
            .system(SYNTHESIS_SYSTEM_PROMPT)
            .temperature(self.tuning.temperature)
            .max_output_tokens(self.tuning.max_tokens);

        match self.gateway.invoke(request).await {
            Ok(text) if !text.trim().is_empty() => StageOutcome::Ok(ensure_prefix(&text)),
            Ok(_) => {
                error!("Synthesis returned an empty response");
                StageOutcome::Fatal(AppError::Synthesis(GatewayError::MalformedResponse(
                    "empty synthesis response".to_string(),
                )))
            }
            Err(e) => {
                error!("Synthesis failed: {}", e);
                StageOutcome::Fatal(AppError::Synthesis(e))
            }
        }
    }
}

/// Builds the merged prompt from the verbosity's template. Pure.
pub fn compose(
    design_summary: &str,
    component_summaries: &[String],
    activity_summary: &str,
    verbosity: PromptVerbosity,
) -> String {
    let design = match design_summary.trim() {
        "" => NO_DESIGN_ANALYSIS,
        design => design,
    };
    let components = component_lines(component_summaries);
    let activity = activity_summary.trim();

    let template = match verbosity {
        PromptVerbosity::Concise => format!(
            "Create a detailed prompt for rebuilding the following interface.

Layout architecture:
{design}

Visual parameters:
Match the colors, typography, spacing and radii described above exactly.

Component specifications:
{components}

Content parameters:
{activity}

Return only the final prompt."
        ),
        PromptVerbosity::Extensive => format!(
            "Create an exhaustive prompt for rebuilding the following interface.

1. Layout structure:
{design}

2. Visual style:
Reproduce every color, font, size, border and shadow given in the design analysis.

3. Visible elements:
{components}

4. Content presentation:
{activity}

5. Visual hierarchy:
Keep the emphasis and reading order implied by the layout and the element order above.

Describe each element once; do not repeat detail for {DETECTION_TERM}s that are already described.

Return only the final prompt."
        ),
    };

    flatten_template(&template)
}

fn component_lines(component_summaries: &[String]) -> String {
    let term = capitalize(DETECTION_TERM);
    component_summaries
        .iter()
        .enumerate()
        .map(|(i, summary)| format!("{} {}: {}", term, i + 1, summary.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drops the framing first and last lines and blank lines, then prefixes.
fn flatten_template(template: &str) -> String {
    let lines: Vec<&str> = template.lines().collect();
    let body = match lines.len() {
        0..=2 => &[][..],
        n => &lines[1..n - 1],
    };

    let joined = body
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    format!("{PROMPT_PREFIX}{}", joined.trim())
}

fn ensure_prefix(text: &str) -> String {
    let text = text.trim();
    let body = text
        .strip_prefix(PROMPT_PREFIX.trim_end())
        .map(str::trim_start)
        .unwrap_or(text);
    format!("{PROMPT_PREFIX}{body}")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
