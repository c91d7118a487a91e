use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How components are found before per-component analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMode {
    /// Ask the vision model to enumerate components.
    #[default]
    Llm,
    /// Skip detection and treat the whole screenshot as one component.
    WholeImage,
}

impl FromStr for DetectionMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llm" => Ok(DetectionMode::Llm),
            "whole-image" | "whole_image" => Ok(DetectionMode::WholeImage),
            other => Err(AppError::InvalidArgument(format!(
                "unknown detection mode '{other}'"
            ))),
        }
    }
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionMode::Llm => write!(f, "llm"),
            DetectionMode::WholeImage => write!(f, "whole-image"),
        }
    }
}

/// Which synthesis template the final prompt is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptVerbosity {
    #[default]
    Concise,
    Extensive,
}

impl FromStr for PromptVerbosity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "concise" => Ok(PromptVerbosity::Concise),
            "extensive" => Ok(PromptVerbosity::Extensive),
            other => Err(AppError::InvalidArgument(format!(
                "prompt verbosity must be 'concise' or 'extensive', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for PromptVerbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptVerbosity::Concise => write!(f, "concise"),
            PromptVerbosity::Extensive => write!(f, "extensive"),
        }
    }
}

/// Caller-owned run settings, snapshotted at the start of every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub detection_mode: DetectionMode,
    pub verbosity: PromptVerbosity,
}

impl PipelineSettings {
    pub fn set_detection_mode(&mut self, mode: DetectionMode) {
        self.detection_mode = mode;
    }

    /// Leaves the current verbosity untouched when `level` is not recognized.
    pub fn set_prompt_verbosity(&mut self, level: &str) -> Result<(), AppError> {
        self.verbosity = level.parse()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_llm_and_concise() {
        let settings = PipelineSettings::default();
        assert_eq!(settings.detection_mode, DetectionMode::Llm);
        assert_eq!(settings.verbosity, PromptVerbosity::Concise);
    }

    #[test]
    fn invalid_verbosity_is_rejected_and_previous_value_kept() {
        let mut settings = PipelineSettings::default();
        settings.set_prompt_verbosity("extensive").unwrap();

        let err = settings.set_prompt_verbosity("invalid").unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert_eq!(settings.verbosity, PromptVerbosity::Extensive);
    }

    #[test]
    fn detection_mode_parses_both_spellings() {
        assert_eq!("whole_image".parse::<DetectionMode>().unwrap(), DetectionMode::WholeImage);
        assert_eq!("LLM".parse::<DetectionMode>().unwrap(), DetectionMode::Llm);
        assert!("yolo".parse::<DetectionMode>().is_err());
    }
}
