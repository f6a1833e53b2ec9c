use crate::config::AppConfig;
use crate::constants::{DEFAULT_MAX_STEPS, DEFAULT_MODEL};

#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub model: String,
    pub system_prompt: Option<String>,
    /// Model calls allowed per request, each followed by its tool calls.
    pub max_steps: usize,
}

impl ChatOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}
