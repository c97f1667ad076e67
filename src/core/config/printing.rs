use crate::core::config::data::{mask_secret, Config};

impl Config {
    /// Render the effective settings, one `key: value` line each. The
    /// credential is masked.
    pub fn summary_lines(&self) -> Vec<String> {
        let api_key = match &self.api_key {
            Some(key) if !key.trim().is_empty() => mask_secret(key),
            _ => "(unset)".to_string(),
        };
        let base_url = self
            .base_url
            .clone()
            .unwrap_or_else(|| "(default)".to_string());
        let system_prompt = match self.system_prompt.as_deref() {
            None => "(default)".to_string(),
            Some("") => "(disabled)".to_string(),
            Some(prompt) => prompt.to_string(),
        };

        vec![
            format!("  api-key: {api_key}"),
            format!("  base-url: {base_url}"),
            format!("  model: {}", self.model()),
            format!("  temperature: {}", self.temperature()),
            format!("  max-tokens: {}", self.max_tokens()),
            format!("  system-prompt: {system_prompt}"),
        ]
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        for line in self.summary_lines() {
            println!("{line}");
        }
    }
}
