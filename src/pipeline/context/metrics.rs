use indexmap::IndexMap;
use serde::Serialize;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Timing for one pipeline stage.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StageTiming {
    pub duration_ms: u64,
    pub model_calls: usize,
    pub degraded: bool,
}

/// Metrics collected during one pipeline run, in stage order.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetrics {
    run_id: Uuid,
    stages: IndexMap<&'static str, StageTiming>,
    total_duration_ms: u64,
}

impl RunMetrics {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            stages: IndexMap::new(),
            total_duration_ms: 0,
        }
    }

    pub fn record_stage(&mut self, stage: &'static str, duration: Duration, model_calls: usize, degraded: bool) {
        self.stages.insert(
            stage,
            StageTiming {
                duration_ms: duration.as_millis() as u64,
                model_calls,
                degraded,
            },
        );
    }

    pub fn finalize(&mut self, start_time: Instant) {
        self.total_duration_ms = start_time.elapsed().as_millis() as u64;
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn stage(&self, stage: &str) -> Option<&StageTiming> {
        self.stages.get(stage)
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.keys().copied()
    }

    pub fn total_model_calls(&self) -> usize {
        self.stages.values().map(|s| s.model_calls).sum()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration_ms
    }
}
