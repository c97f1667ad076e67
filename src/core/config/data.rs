use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::api::models::DEFAULT_MODEL;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const MAX_OUTPUT_TOKENS: u32 = 4096;
pub const MAX_TEMPERATURE: f32 = 2.0;
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Be concise, accurate, and friendly in your responses.";

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Settings persisted between runs. Every field is optional so a partially
/// written file still loads; accessors apply the defaults.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// System directive sent ahead of the conversation. An empty string
    /// disables it; `None` falls back to the built-in directive.
    pub system_prompt: Option<String>,
}

impl Config {
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// The credential from the config file, or `OPENAI_API_KEY` when the file
    /// has none.
    pub fn resolve_api_key(&self) -> String {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .unwrap_or_default()
    }

    /// `OPENAI_BASE_URL` wins over the configured base URL.
    pub fn resolve_base_url(&self) -> String {
        std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Snapshot the generation parameters for one request.
    pub fn generation_config(&self, model_override: Option<&str>) -> GenerationConfig {
        let model_id = model_override
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| self.model())
            .to_string();
        let directive = self.system_prompt().trim();

        GenerationConfig {
            credential: self.resolve_api_key(),
            model_id,
            temperature: self.temperature(),
            max_output_tokens: self.max_tokens(),
            system_directive: (!directive.is_empty()).then(|| directive.to_string()),
        }
    }
}

/// Parameters for a single completion request. Compared and copied by value.
#[derive(Clone, PartialEq)]
pub struct GenerationConfig {
    pub credential: String,
    pub model_id: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub system_directive: Option<String>,
}

impl GenerationConfig {
    pub fn has_credential(&self) -> bool {
        !self.credential.trim().is_empty()
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("credential", &mask_secret(&self.credential))
            .field("model_id", &self.model_id)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("system_directive", &self.system_directive)
            .finish()
    }
}

pub fn validate_temperature(value: f32) -> Result<f32, String> {
    if value.is_finite() && (0.0..=MAX_TEMPERATURE).contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "temperature must be between 0 and {MAX_TEMPERATURE}, got {value}"
        ))
    }
}

pub fn validate_max_tokens(value: u32) -> Result<u32, String> {
    if (1..=MAX_OUTPUT_TOKENS).contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "max-tokens must be between 1 and {MAX_OUTPUT_TOKENS}, got {value}"
        ))
    }
}

/// Show only the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "(unset)".to_string();
    }
    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
