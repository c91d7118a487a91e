use crate::error::AppError;
use crate::network::credentials::{CredentialMap, ProviderCredentials};
use crate::network::provider::ProviderKind;
use crate::pipeline::domain::settings::{DetectionMode, PipelineSettings, PromptVerbosity};
use ::config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

const ENV_PREFIX: &str = "SCREEN2PROMPT";

/// Sampling parameters for one model-backed stage.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StageTuning {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl StageTuning {
    pub const fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StageParameters {
    pub detection: StageTuning,
    pub component: StageTuning,
    pub design: StageTuning,
    pub activity: StageTuning,
    pub synthesis: StageTuning,
}

impl Default for StageParameters {
    fn default() -> Self {
        Self {
            detection: StageTuning::new(0.1, 2048),
            component: StageTuning::new(0.2, 1024),
            design: StageTuning::new(0.1, 1500),
            activity: StageTuning::new(0.1, 300),
            synthesis: StageTuning::new(0.3, 4096),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub provider: ProviderKind,
    pub model: String,
    pub detection_cap: usize,
    pub min_confidence: f32,
    /// Per model call; 0 disables the deadline.
    pub request_timeout_secs: u64,
    pub max_image_dimension: Option<u32>,
    pub crop_components: bool,
    pub parallel_component_analysis: bool,
    /// In-flight component analyses when running in parallel.
    pub max_concurrent_components: usize,
    pub detection_mode: DetectionMode,
    pub verbosity: PromptVerbosity,
    pub stages: StageParameters,
    pub credentials: HashMap<String, ProviderCredentials>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            model: "gpt-4o".to_string(),
            detection_cap: 6,
            min_confidence: 0.0,
            request_timeout_secs: 60,
            max_image_dimension: None,
            crop_components: false,
            parallel_component_analysis: false,
            max_concurrent_components: 4,
            detection_mode: DetectionMode::Llm,
            verbosity: PromptVerbosity::Concise,
            stages: StageParameters::default(),
            credentials: HashMap::new(),
        }
    }
}

impl Configuration {
    /// Layers an optional TOML file under `SCREEN2PROMPT_*` environment
    /// variables (`__` separates nested keys), then validates.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut configuration: Configuration = builder.build()?.try_deserialize()?;
        configuration.fill_token_from_env();
        configuration.validate().map_err(AppError::InvalidArgument)?;
        Ok(configuration)
    }

    // Conventional provider variables, used only when nothing else set a key
    fn fill_token_from_env(&mut self) {
        let provider = self.provider.as_str();
        let var = match self.provider {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        };
        let entry = self.credentials.entry(provider.to_string()).or_default();
        if entry.api_key.is_none() {
            entry.api_key = std::env::var(var).ok();
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.detection_cap == 0 {
            return Err("Detection cap must be greater than 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err("Minimum confidence must be between 0.0 and 1.0".to_string());
        }

        if self.model.trim().is_empty() {
            return Err("Model name must not be empty".to_string());
        }

        if self.max_concurrent_components == 0 {
            return Err("Component concurrency must be greater than 0".to_string());
        }

        if self.max_image_dimension == Some(0) {
            return Err("Maximum image dimension must be greater than 0".to_string());
        }

        let stages = &self.stages;
        for (name, tuning) in [
            ("detection", stages.detection),
            ("component", stages.component),
            ("design", stages.design),
            ("activity", stages.activity),
            ("synthesis", stages.synthesis),
        ] {
            if !(0.0..=2.0).contains(&tuning.temperature) {
                return Err(format!("Temperature for {name} must be between 0.0 and 2.0"));
            }
            if tuning.max_tokens == 0 {
                return Err(format!("Max tokens for {name} must be greater than 0"));
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            detection_mode: self.detection_mode,
            verbosity: self.verbosity,
        }
    }

    pub fn credential_store(&self) -> CredentialMap {
        CredentialMap::from(self.credentials.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::credentials::CredentialStore;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let configuration = Configuration::default();
        assert!(configuration.validate().is_ok());
        assert_eq!(configuration.detection_cap, 6);
        assert_eq!(configuration.settings(), PipelineSettings::default());
    }

    #[test]
    fn zero_cap_is_rejected() {
        let configuration = Configuration {
            detection_cap: 0,
            ..Configuration::default()
        };
        assert!(configuration.validate().is_err());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut configuration = Configuration {
            min_confidence: 1.5,
            ..Configuration::default()
        };
        assert!(configuration.validate().is_err());

        configuration.min_confidence = 0.5;
        configuration.stages.synthesis.temperature = 3.0;
        assert!(configuration.validate().is_err());
    }

    #[test]
    fn zero_timeout_disables_the_deadline() {
        let configuration = Configuration {
            request_timeout_secs: 0,
            ..Configuration::default()
        };
        assert_eq!(configuration.request_timeout(), None);
        assert_eq!(
            Configuration::default().request_timeout(),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn loads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
provider = "anthropic"
model = "claude-sonnet-4-5"
detection_cap = 3
verbosity = "extensive"
detection_mode = "whole-image"

[stages.synthesis]
temperature = 0.5
max_tokens = 2000

[credentials.anthropic]
api_key = "sk-test"
endpoint = "http://localhost:9999/v1/messages"
"#
        )
        .unwrap();

        let configuration = Configuration::load(Some(file.path())).unwrap();
        assert_eq!(configuration.provider, ProviderKind::Anthropic);
        assert_eq!(configuration.detection_cap, 3);
        assert_eq!(configuration.verbosity, PromptVerbosity::Extensive);
        assert_eq!(configuration.detection_mode, DetectionMode::WholeImage);
        assert_eq!(configuration.stages.synthesis.max_tokens, 2000);
        // untouched stages keep their defaults
        assert_eq!(configuration.stages.detection.max_tokens, 2048);

        let store = configuration.credential_store();
        assert_eq!(store.token("anthropic").as_deref(), Some("sk-test"));
        assert_eq!(
            store.endpoint("anthropic").as_deref(),
            Some("http://localhost:9999/v1/messages")
        );
    }

    #[test]
    fn invalid_file_values_fail_to_load() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "detection_cap = 0").unwrap();
        assert!(matches!(
            Configuration::load(Some(file.path())),
            Err(AppError::InvalidArgument(_))
        ));
    }
}
