use crate::pipeline::domain::detection::Detection;

// Markers to track how far a run has progressed
pub struct Captured;

pub struct Detected {
    pub(super) detections: Vec<Detection>,
}

pub struct Described {
    pub(super) detections: Vec<Detection>,
    pub(super) design_summary: String,
    pub(super) activity_summary: String,
}

pub struct Analyzed {
    pub(super) detections: Vec<Detection>,
    pub(super) design_summary: String,
    pub(super) activity_summary: String,
    pub(super) component_summaries: Vec<String>,
}

pub trait ProcessingState: 'static {
    fn state_name() -> &'static str;
}

impl ProcessingState for Captured {
    fn state_name() -> &'static str {
        "Captured"
    }
}

impl ProcessingState for Detected {
    fn state_name() -> &'static str {
        "Detected"
    }
}

impl ProcessingState for Described {
    fn state_name() -> &'static str {
        "Described"
    }
}

impl ProcessingState for Analyzed {
    fn state_name() -> &'static str {
        "Analyzed"
    }
}
