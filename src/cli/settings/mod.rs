//! `parley set` / `parley unset`.
//!
//! Values are validated here, before anything is written to disk, so the
//! stored configuration always produces a usable request.

pub mod error;

pub use error::SettingError;

use crate::core::config::data::{mask_secret, validate_max_tokens, validate_temperature, Config};
use crate::utils::url::validate_base_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    ApiKey,
    BaseUrl,
    Model,
    Temperature,
    MaxTokens,
    SystemPrompt,
}

const ALL_KEYS: [SettingKey; 6] = [
    SettingKey::ApiKey,
    SettingKey::BaseUrl,
    SettingKey::Model,
    SettingKey::Temperature,
    SettingKey::MaxTokens,
    SettingKey::SystemPrompt,
];

impl SettingKey {
    pub fn name(self) -> &'static str {
        match self {
            SettingKey::ApiKey => "api-key",
            SettingKey::BaseUrl => "base-url",
            SettingKey::Model => "model",
            SettingKey::Temperature => "temperature",
            SettingKey::MaxTokens => "max-tokens",
            SettingKey::SystemPrompt => "system-prompt",
        }
    }

    pub fn names() -> Vec<&'static str> {
        ALL_KEYS.iter().map(|key| key.name()).collect()
    }

    pub fn parse(input: &str) -> Result<Self, SettingError> {
        ALL_KEYS
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(input.trim()))
            .ok_or_else(|| SettingError::UnknownKey(input.to_string()))
    }

    fn example(self) -> &'static str {
        match self {
            SettingKey::ApiKey => "parley set api-key sk-...",
            SettingKey::BaseUrl => "parley set base-url http://localhost:11434/v1",
            SettingKey::Model => "parley set model gpt-4o",
            SettingKey::Temperature => "parley set temperature 0.7",
            SettingKey::MaxTokens => "parley set max-tokens 2048",
            SettingKey::SystemPrompt => "parley set system-prompt You are a terse assistant.",
        }
    }
}

/// Apply `set <key> <value...>` to `config`. Multi-word values are joined
/// with single spaces. Returns the confirmation message.
pub fn apply_set(config: &mut Config, key: &str, args: &[String]) -> Result<String, SettingError> {
    let key = SettingKey::parse(key)?;
    let value = args.join(" ");
    let value = value.trim();

    // An empty system prompt is meaningful: it disables the directive.
    if value.is_empty() && key != SettingKey::SystemPrompt {
        return Err(SettingError::MissingArgs {
            hint: "Specify a value for this setting:",
            example: key.example(),
        });
    }

    let invalid = |reason: String| SettingError::InvalidValue {
        key: key.name(),
        reason,
    };

    let shown = match key {
        SettingKey::ApiKey => {
            config.api_key = Some(value.to_string());
            mask_secret(value)
        }
        SettingKey::BaseUrl => {
            let url = validate_base_url(value).map_err(invalid)?;
            config.base_url = Some(url.clone());
            url
        }
        SettingKey::Model => {
            config.model = Some(value.to_string());
            value.to_string()
        }
        SettingKey::Temperature => {
            let parsed = value
                .parse::<f32>()
                .map_err(|err| invalid(err.to_string()))?;
            config.temperature = Some(validate_temperature(parsed).map_err(invalid)?);
            parsed.to_string()
        }
        SettingKey::MaxTokens => {
            let parsed = value
                .parse::<u32>()
                .map_err(|err| invalid(err.to_string()))?;
            config.max_tokens = Some(validate_max_tokens(parsed).map_err(invalid)?);
            parsed.to_string()
        }
        SettingKey::SystemPrompt => {
            config.system_prompt = Some(value.to_string());
            if value.is_empty() {
                "(disabled)".to_string()
            } else {
                value.to_string()
            }
        }
    };

    Ok(format!("✅ Set {} to: {shown}", key.name()))
}

/// Apply `unset <key>`, restoring the built-in default.
pub fn apply_unset(config: &mut Config, key: &str) -> Result<String, SettingError> {
    let key = SettingKey::parse(key)?;
    match key {
        SettingKey::ApiKey => config.api_key = None,
        SettingKey::BaseUrl => config.base_url = None,
        SettingKey::Model => config.model = None,
        SettingKey::Temperature => config.temperature = None,
        SettingKey::MaxTokens => config.max_tokens = None,
        SettingKey::SystemPrompt => config.system_prompt = None,
    }
    Ok(format!("✅ Unset {}", key.name()))
}

/// Load, mutate and save the on-disk configuration.
pub fn mutate_config<F>(mutate: F) -> Result<String, SettingError>
where
    F: FnOnce(&mut Config) -> Result<String, SettingError>,
{
    let mut config = Config::load().map_err(|err| SettingError::ConfigError(err.to_string()))?;
    let message = mutate(&mut config)?;
    config
        .save()
        .map_err(|err| SettingError::ConfigError(err.to_string()))?;
    Ok(message)
}
