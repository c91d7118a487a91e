pub mod metrics;
pub mod run_context;
pub mod state;

pub use metrics::{RunMetrics, StageTiming};
pub use run_context::RunContext;
pub use state::{Analyzed, Captured, Described, Detected, ProcessingState};
