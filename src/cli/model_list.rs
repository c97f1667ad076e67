//! Model listing functionality
//!
//! Lists the built-in model catalog and marks the configured default.

use std::error::Error;

use crate::api::models::{CatalogModel, CATALOG};
use crate::core::config::Config;

pub fn list_models() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    println!("🤖 Available Models");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    for line in model_lines(CATALOG, config.model()) {
        println!("{line}");
    }
    println!();

    if !CATALOG.iter().any(|model| model.id == config.model()) {
        println!("🎯 Configured model {} is not in the list above.", config.model());
    }
    println!("💡 Use 'parley set model <id>' to change the default, or -m <id> for one run.");
    Ok(())
}

fn model_lines(models: &[CatalogModel], default_model: &str) -> Vec<String> {
    models
        .iter()
        .map(|model| {
            let marker = if model.id == default_model { "*" } else { " " };
            format!(
                "{marker} {:<16} {:<14} {}",
                model.id, model.display_name, model.description
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_only_the_default_model() {
        let lines = model_lines(CATALOG, "gpt-4o-mini");
        assert_eq!(lines.len(), CATALOG.len());
        let marked: Vec<_> = lines.iter().filter(|line| line.starts_with('*')).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("gpt-4o-mini"));
    }

    #[test]
    fn unknown_default_marks_nothing() {
        let lines = model_lines(CATALOG, "local-llama");
        assert!(lines.iter().all(|line| line.starts_with(' ')));
    }
}
