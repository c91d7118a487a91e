use crate::common::capture::ScreenCapture;

/// One multimodal request to a model provider.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub temperature: f32,
    pub want_json: bool,
    pub max_output_tokens: u32,
    pub image: Option<ScreenCapture>,
}

impl ModelRequest {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: None,
            user_prompt: user_prompt.into(),
            temperature: 0.1,
            want_json: false,
            max_output_tokens: 1024,
            image: None,
        }
    }

    pub fn system(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Asks the provider to constrain output to a JSON object. Advisory only:
    /// callers still have to parse defensively.
    pub fn json(mut self, want_json: bool) -> Self {
        self.want_json = want_json;
        self
    }

    pub fn max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn image(mut self, image: ScreenCapture) -> Self {
        self.image = Some(image);
        self
    }

    pub fn is_system(&self, system_prompt: &str) -> bool {
        self.system_prompt.as_deref() == Some(system_prompt)
    }
}
