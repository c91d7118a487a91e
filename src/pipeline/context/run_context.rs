use super::metrics::RunMetrics;
use super::state::{Analyzed, Captured, Described, Detected, ProcessingState};
use crate::common::capture::ScreenCapture;
use crate::pipeline::domain::analysis::{AnalysisResult, RunStatus};
use crate::pipeline::domain::detection::Detection;
use crate::pipeline::domain::settings::PipelineSettings;
use std::time::Instant;
use uuid::Uuid;

// RunContext with compile-time stage tracking via the state parameter
pub struct RunContext<S> {
    capture: ScreenCapture,
    source_dimensions: (u32, u32),
    settings: PipelineSettings,
    metrics: RunMetrics,
    processing_start: Instant,
    state: S,
}

impl<S: ProcessingState> RunContext<S> {
    pub fn capture(&self) -> &ScreenCapture {
        &self.capture
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut RunMetrics {
        &mut self.metrics
    }

    pub fn run_id(&self) -> Uuid {
        self.metrics.run_id()
    }

    pub fn stage_name(&self) -> &'static str {
        S::state_name()
    }

    /// Per-axis factor from the working image to the image the run started
    /// with. `(1.0, 1.0)` unless the capture was swapped for a resized one.
    pub fn source_scale(&self) -> (f32, f32) {
        let (source_width, source_height) = self.source_dimensions;
        let (width, height) = self.capture.dimensions();
        (
            axis_scale(source_width, width),
            axis_scale(source_height, height),
        )
    }

    /// Consumes the context, keeping only the finalized metrics.
    pub fn into_metrics(mut self) -> RunMetrics {
        self.metrics.finalize(self.processing_start);
        self.metrics
    }

    /// Finalized copy of the metrics so far, for runs that stop early.
    pub fn snapshot_metrics(&self) -> RunMetrics {
        let mut metrics = self.metrics.clone();
        metrics.finalize(self.processing_start);
        metrics
    }

    fn advance<T>(self, state: T) -> RunContext<T> {
        RunContext {
            capture: self.capture,
            source_dimensions: self.source_dimensions,
            settings: self.settings,
            metrics: self.metrics,
            processing_start: self.processing_start,
            state,
        }
    }
}

impl RunContext<Captured> {
    pub fn new(capture: ScreenCapture, settings: PipelineSettings) -> Self {
        Self {
            source_dimensions: capture.dimensions(),
            capture,
            settings,
            metrics: RunMetrics::new(Uuid::new_v4()),
            processing_start: Instant::now(),
            state: Captured,
        }
    }

    /// Swaps the working image, e.g. after downscaling. Detections must
    /// still be reported in the original image's coordinates.
    pub fn with_capture(mut self, capture: ScreenCapture) -> Self {
        self.capture = capture;
        self
    }

    /// `detections` are in working-image pixels and are mapped back to the
    /// source image here.
    pub fn into_detected(self, detections: Vec<Detection>) -> RunContext<Detected> {
        let (scale_x, scale_y) = self.source_scale();
        let detections = detections
            .into_iter()
            .map(|detection| detection.rescaled(scale_x, scale_y))
            .collect();
        self.advance(Detected { detections })
    }
}

impl RunContext<Detected> {
    pub fn detections(&self) -> &[Detection] {
        &self.state.detections
    }

    pub fn into_described(
        self,
        design_summary: String,
        activity_summary: String,
    ) -> RunContext<Described> {
        let Detected { detections } = self.state;
        RunContext {
            capture: self.capture,
            source_dimensions: self.source_dimensions,
            settings: self.settings,
            metrics: self.metrics,
            processing_start: self.processing_start,
            state: Described {
                detections,
                design_summary,
                activity_summary,
            },
        }
    }
}

impl RunContext<Described> {
    pub fn detections(&self) -> &[Detection] {
        &self.state.detections
    }

    pub fn design_summary(&self) -> &str {
        &self.state.design_summary
    }

    pub fn activity_summary(&self) -> &str {
        &self.state.activity_summary
    }

    /// `component_summaries` must line up with the detections by position.
    pub fn into_analyzed(self, component_summaries: Vec<String>) -> RunContext<Analyzed> {
        debug_assert_eq!(component_summaries.len(), self.state.detections.len());
        let Described {
            detections,
            design_summary,
            activity_summary,
        } = self.state;
        RunContext {
            capture: self.capture,
            source_dimensions: self.source_dimensions,
            settings: self.settings,
            metrics: self.metrics,
            processing_start: self.processing_start,
            state: Analyzed {
                detections,
                design_summary,
                activity_summary,
                component_summaries,
            },
        }
    }
}

impl RunContext<Analyzed> {
    pub fn detections(&self) -> &[Detection] {
        &self.state.detections
    }

    pub fn design_summary(&self) -> &str {
        &self.state.design_summary
    }

    pub fn activity_summary(&self) -> &str {
        &self.state.activity_summary
    }

    pub fn component_summaries(&self) -> &[String] {
        &self.state.component_summaries
    }

    pub fn into_result(mut self, final_prompt: String) -> AnalysisResult {
        self.metrics.finalize(self.processing_start);
        AnalysisResult {
            design_summary: self.state.design_summary,
            component_summaries: self.state.component_summaries,
            final_prompt,
            status: RunStatus::Completed,
            detections: self.state.detections,
            metrics: self.metrics,
        }
    }
}

fn axis_scale(source: u32, working: u32) -> f32 {
    if working == 0 {
        1.0
    } else {
        source as f32 / working as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::domain::detection::BoundingBox;

    #[test]
    fn context_carries_results_through_every_state() {
        let ctx = RunContext::new(ScreenCapture::solid(8, 8), PipelineSettings::default());
        assert_eq!(ctx.stage_name(), "Captured");

        let ctx = ctx.into_detected(vec![Detection::new(
            "button",
            BoundingBox::new(1.0, 1.0, 2.0, 2.0),
            0.9,
            "Submit",
        )]);
        assert_eq!(ctx.detections().len(), 1);

        let ctx = ctx.into_described("design".into(), "activity".into());
        assert_eq!(ctx.design_summary(), "design");

        let ctx = ctx.into_analyzed(vec!["[Location: Submit]\n{}".into()]);
        assert_eq!(ctx.stage_name(), "Analyzed");

        let result = ctx.into_result("Build this app: x".into());
        assert!(result.is_completed());
        assert_eq!(result.component_summaries.len(), result.detections.len());
        assert_eq!(result.design_summary, "design");
    }

    #[test]
    fn detections_from_a_resized_capture_map_back_to_source() {
        let ctx = RunContext::new(ScreenCapture::solid(400, 200), PipelineSettings::default())
            .with_capture(ScreenCapture::solid(100, 50));
        assert_eq!(ctx.source_scale(), (4.0, 4.0));

        let ctx = ctx.into_detected(vec![Detection::new(
            "button",
            BoundingBox::new(10.0, 10.0, 50.0, 20.0),
            0.9,
            "Submit",
        )]);
        assert_eq!(
            ctx.detections()[0].bounding_box(),
            BoundingBox::new(40.0, 40.0, 200.0, 80.0)
        );
        // the working image is still the resized one
        assert_eq!(ctx.capture().dimensions(), (100, 50));
    }
}
