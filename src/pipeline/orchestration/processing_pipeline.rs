use crate::common::capture::ScreenCapture;
use crate::config::Configuration;
use crate::error::AppError;
use crate::network::gateway::ModelGateway;
use crate::network::http_gateway::HttpGateway;
use crate::network::service::TimedGateway;
use crate::pipeline::context::metrics::RunMetrics;
use crate::pipeline::context::run_context::RunContext;
use crate::pipeline::context::state::{Captured, ProcessingState};
use crate::pipeline::domain::analysis::{AnalysisResult, PipelineStage};
use crate::pipeline::domain::detection::{BoundingBox, Detection};
use crate::pipeline::domain::settings::{DetectionMode, PipelineSettings};
use crate::pipeline::orchestration::stage_outcome::StageOutcome;
use crate::pipeline::orchestration::step::{
    ActivityDescriber, ComponentAnalyzer, ComponentDetector, DesignAnalyzer, PromptSynthesizer,
};
use crate::pipeline::services::image::{ImageProcessor, RasterImageProcessor};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Copy)]
struct RunOptions {
    detection_cap: usize,
    crop_components: bool,
    parallel_component_analysis: bool,
    max_concurrent_components: usize,
    max_image_dimension: Option<u32>,
}

/// Screenshot in, build prompt out.
///
/// Stages run in a fixed order: detection, design and activity (together),
/// per-component analysis, synthesis. A run never returns an error; failures
/// are reported through `AnalysisResult::status`.
pub struct PromptPipeline {
    detector: ComponentDetector,
    component_analyzer: ComponentAnalyzer,
    design_analyzer: DesignAnalyzer,
    activity_describer: ActivityDescriber,
    synthesizer: PromptSynthesizer,
    image_processor: Arc<dyn ImageProcessor>,
    settings: PipelineSettings,
    options: RunOptions,
}

impl PromptPipeline {
    pub fn builder(configuration: Configuration) -> PromptPipelineBuilder {
        PromptPipelineBuilder::new(configuration)
    }

    pub fn settings(&self) -> PipelineSettings {
        self.settings
    }

    pub fn detection_cap(&self) -> usize {
        self.options.detection_cap
    }

    pub fn set_detection_mode(&mut self, mode: DetectionMode) {
        self.settings.set_detection_mode(mode);
    }

    /// Accepts `concise` or `extensive`; anything else leaves the current
    /// verbosity in place.
    pub fn set_prompt_verbosity(&mut self, level: &str) -> Result<(), AppError> {
        self.settings.set_prompt_verbosity(level)
    }

    /// A `detection_cap` of 0 is treated as 1.
    pub async fn run_pipeline(&self, image: &ScreenCapture, detection_cap: usize) -> AnalysisResult {
        self.run_pipeline_with_cancellation(image, detection_cap, &CancellationToken::new())
            .await
    }

    /// Stops at the next await point once `cancel_token` fires and returns a
    /// `Cancelled` result.
    pub async fn run_pipeline_with_cancellation(
        &self,
        image: &ScreenCapture,
        detection_cap: usize,
        cancel_token: &CancellationToken,
    ) -> AnalysisResult {
        let ctx = RunContext::new(image.clone(), self.settings);
        let run_id = ctx.run_id();
        if detection_cap == 0 {
            warn!(%run_id, "Detection cap of 0 raised to 1");
        }
        let detection_cap = detection_cap.max(1);

        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                warn!(%run_id, "Pipeline run cancelled");
                AnalysisResult::cancelled(RunMetrics::new(run_id))
            }
            result = self.execute(ctx, detection_cap) => result,
        }
    }

    #[instrument(skip_all, fields(run_id = %ctx.run_id(), cap = detection_cap))]
    async fn execute(&self, ctx: RunContext<Captured>, detection_cap: usize) -> AnalysisResult {
        info!("Starting pipeline run");
        let mut ctx = match self.options.max_image_dimension {
            Some(max_dimension) => self.downscale(ctx, max_dimension).await,
            None => ctx,
        };

        // Detection
        let started = Instant::now();
        let (detections, model_calls, degraded) = match ctx.settings().detection_mode {
            DetectionMode::Llm => {
                let outcome = self.detector.detect_outcome(ctx.capture(), detection_cap).await;
                let degraded = outcome.is_degraded();
                (outcome.unwrap_or_default(), 1, degraded)
            }
            DetectionMode::WholeImage => (vec![whole_image_detection(ctx.capture())], 0, false),
        };
        ctx.metrics_mut().record_stage(
            PipelineStage::Detection.as_str(),
            started.elapsed(),
            model_calls,
            degraded,
        );

        let mut ctx = ctx.into_detected(detections);
        if ctx.detections().is_empty() {
            info!("No components detected, skipping analysis");
            return AnalysisResult::no_detections(ctx.into_metrics());
        }

        // Design and activity
        let started = Instant::now();
        let (design, activity) = tokio::join!(
            self.design_analyzer.analyze(ctx.capture()),
            self.activity_describer.describe(ctx.capture())
        );
        let elapsed = started.elapsed();
        ctx.metrics_mut().record_stage(
            PipelineStage::DesignAnalysis.as_str(),
            elapsed,
            1,
            design.is_degraded(),
        );
        ctx.metrics_mut().record_stage(
            PipelineStage::ActivityDescription.as_str(),
            elapsed,
            1,
            activity.is_degraded(),
        );
        let design_summary = match design.into_result() {
            Ok(summary) => summary,
            Err(e) => return fail(PipelineStage::DesignAnalysis, e, &ctx),
        };
        let activity_summary = match activity.into_result() {
            Ok(summary) => summary,
            Err(e) => return fail(PipelineStage::ActivityDescription, e, &ctx),
        };
        info!("Design and activity analysis done in {:?}", elapsed);

        let mut ctx = ctx.into_described(design_summary, activity_summary);

        // Components. Boxes are in source pixels, crops come from the working image.
        let started = Instant::now();
        let (scale_x, scale_y) = ctx.source_scale();
        let to_working = (1.0 / scale_x, 1.0 / scale_y);
        let outcomes: Vec<StageOutcome<String>> = if self.options.parallel_component_analysis {
            stream::iter(ctx.detections().iter().enumerate())
                .map(|(index, detection)| {
                    self.analyze_component(ctx.capture(), index, detection, to_working)
                })
                .buffered(self.options.max_concurrent_components.max(1))
                .collect()
                .await
        } else {
            let mut outcomes = Vec::with_capacity(ctx.detections().len());
            for (index, detection) in ctx.detections().iter().enumerate() {
                outcomes.push(
                    self.analyze_component(ctx.capture(), index, detection, to_working)
                        .await,
                );
            }
            outcomes
        };

        let model_calls = outcomes.len();
        let mut degraded = false;
        let mut component_summaries = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            degraded |= outcome.is_degraded();
            match outcome.into_result() {
                Ok(summary) => component_summaries.push(summary),
                Err(e) => return fail(PipelineStage::ComponentAnalysis, e, &ctx),
            }
        }
        let elapsed = started.elapsed();
        ctx.metrics_mut().record_stage(
            PipelineStage::ComponentAnalysis.as_str(),
            elapsed,
            model_calls,
            degraded,
        );
        info!("Analyzed {} components in {:?}", model_calls, elapsed);

        let mut ctx = ctx.into_analyzed(component_summaries);

        // Synthesis
        let started = Instant::now();
        let outcome = self
            .synthesizer
            .synthesize(
                ctx.design_summary(),
                ctx.component_summaries(),
                ctx.activity_summary(),
                ctx.settings().verbosity,
            )
            .await;
        ctx.metrics_mut().record_stage(
            PipelineStage::Synthesis.as_str(),
            started.elapsed(),
            1,
            outcome.is_degraded(),
        );

        match outcome.into_result() {
            Ok(final_prompt) => {
                let result = ctx.into_result(final_prompt);
                info!(
                    "Pipeline run completed in {}ms with {} model calls",
                    result.metrics.total_duration_ms(),
                    result.metrics.total_model_calls()
                );
                result
            }
            Err(e) => fail(PipelineStage::Synthesis, e, &ctx),
        }
    }

    async fn downscale(&self, ctx: RunContext<Captured>, max_dimension: u32) -> RunContext<Captured> {
        let processor = self.image_processor.clone();
        let source = ctx.capture().clone();
        let scaled = tokio::task::spawn_blocking(move || processor.downscale(&source, max_dimension)).await;

        match scaled {
            Ok(Ok(scaled)) => {
                debug!("Source image is {:?} after downscale", scaled.dimensions());
                ctx.with_capture(scaled)
            }
            Ok(Err(e)) => {
                warn!("Downscale failed, keeping the original image: {}", e);
                ctx
            }
            Err(e) => {
                warn!("Downscale task failed, keeping the original image: {}", e);
                ctx
            }
        }
    }

    async fn analyze_component(
        &self,
        image: &ScreenCapture,
        index: usize,
        detection: &Detection,
        (scale_x, scale_y): (f32, f32),
    ) -> StageOutcome<String> {
        let cropped = if self.options.crop_components {
            self.crop(image, detection.bounding_box().scaled(scale_x, scale_y))
                .await
        } else {
            None
        };

        self.component_analyzer
            .analyze(cropped.as_ref().unwrap_or(image), index, detection.label())
            .await
    }

    // None means analyze the full image instead
    async fn crop(&self, image: &ScreenCapture, region: BoundingBox) -> Option<ScreenCapture> {
        if region.is_empty() {
            debug!("Zero-area box, analyzing the full image");
            return None;
        }

        let processor = self.image_processor.clone();
        let source = image.clone();
        match tokio::task::spawn_blocking(move || processor.crop(&source, region)).await {
            Ok(Ok(cropped)) => Some(cropped),
            Ok(Err(e)) => {
                warn!("Crop failed, analyzing the full image: {}", e);
                None
            }
            Err(e) => {
                warn!("Crop task failed, analyzing the full image: {}", e);
                None
            }
        }
    }
}

fn fail<S: ProcessingState>(stage: PipelineStage, err: AppError, ctx: &RunContext<S>) -> AnalysisResult {
    error!("Pipeline failed during {}: {}", stage.as_str(), err);
    AnalysisResult::failed(stage, err.to_string(), ctx.snapshot_metrics())
}

fn whole_image_detection(image: &ScreenCapture) -> Detection {
    let (width, height) = image.dimensions();
    Detection::new(
        "screen",
        BoundingBox::new(0.0, 0.0, width as f32, height as f32),
        1.0,
        "full screen",
    )
}

pub struct PromptPipelineBuilder {
    configuration: Configuration,
    gateway: Option<Arc<dyn ModelGateway>>,
    image_processor: Option<Arc<dyn ImageProcessor>>,
}

impl PromptPipelineBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            gateway: None,
            image_processor: None,
        }
    }

    // Overrides the configured detection cap.
    pub fn detection_cap(mut self, detection_cap: usize) -> Self {
        self.configuration.detection_cap = detection_cap;
        self
    }

    pub fn min_confidence(mut self, min_confidence: f32) -> Self {
        self.configuration.min_confidence = min_confidence;
        self
    }

    pub fn crop_components(mut self, crop_components: bool) -> Self {
        self.configuration.crop_components = crop_components;
        self
    }

    pub fn parallel_component_analysis(mut self, parallel: bool) -> Self {
        self.configuration.parallel_component_analysis = parallel;
        self
    }

    pub fn max_concurrent_components(mut self, limit: usize) -> Self {
        self.configuration.max_concurrent_components = limit;
        self
    }

    pub fn max_image_dimension(mut self, max_image_dimension: u32) -> Self {
        self.configuration.max_image_dimension = Some(max_image_dimension);
        self
    }

    pub fn settings(mut self, settings: PipelineSettings) -> Self {
        self.configuration.detection_mode = settings.detection_mode;
        self.configuration.verbosity = settings.verbosity;
        self
    }

    // Replaces the HTTP gateway, e.g. with an in-memory one.
    pub fn gateway(mut self, gateway: Arc<dyn ModelGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn image_processor(mut self, image_processor: Arc<dyn ImageProcessor>) -> Self {
        self.image_processor = Some(image_processor);
        self
    }

    pub fn build(self) -> Result<PromptPipeline, AppError> {
        let configuration = self.configuration;
        configuration.validate().map_err(AppError::InvalidArgument)?;

        let inner = match self.gateway {
            Some(gateway) => gateway,
            None => Arc::new(HttpGateway::new(
                configuration.provider,
                configuration.model.clone(),
                Arc::new(configuration.credential_store()),
            )),
        };
        let gateway: Arc<dyn ModelGateway> =
            Arc::new(TimedGateway::new(inner, configuration.request_timeout()));
        let stages = &configuration.stages;

        Ok(PromptPipeline {
            detector: ComponentDetector::new(gateway.clone(), stages.detection)
                .with_min_confidence(configuration.min_confidence),
            component_analyzer: ComponentAnalyzer::new(gateway.clone(), stages.component),
            design_analyzer: DesignAnalyzer::new(gateway.clone(), stages.design),
            activity_describer: ActivityDescriber::new(gateway.clone(), stages.activity),
            synthesizer: PromptSynthesizer::new(gateway, stages.synthesis),
            image_processor: self
                .image_processor
                .unwrap_or_else(|| Arc::new(RasterImageProcessor)),
            settings: configuration.settings(),
            options: RunOptions {
                detection_cap: configuration.detection_cap,
                crop_components: configuration.crop_components,
                parallel_component_analysis: configuration.parallel_component_analysis,
                max_concurrent_components: configuration.max_concurrent_components,
                max_image_dimension: configuration.max_image_dimension,
            },
        })
    }
}
