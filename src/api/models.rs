/// A model the client offers without querying the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogModel {
    pub id: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
}

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub const CATALOG: &[CatalogModel] = &[
    CatalogModel {
        id: "gpt-4o",
        display_name: "GPT-4o",
        description: "Most advanced model, best for complex tasks",
    },
    CatalogModel {
        id: "gpt-4o-mini",
        display_name: "GPT-4o Mini",
        description: "Faster and more affordable",
    },
    CatalogModel {
        id: "gpt-4-turbo",
        display_name: "GPT-4 Turbo",
        description: "High performance with large context",
    },
    CatalogModel {
        id: "gpt-3.5-turbo",
        display_name: "GPT-3.5 Turbo",
        description: "Fast and efficient for most tasks",
    },
];

/// Look up a catalog entry by id, ignoring ASCII case.
pub fn find_model(id: &str) -> Option<&'static CatalogModel> {
    CATALOG
        .iter()
        .find(|model| model.id.eq_ignore_ascii_case(id.trim()))
}

/// Human-readable label for a model id, falling back to the id itself for
/// models outside the catalog.
pub fn display_name(id: &str) -> &str {
    find_model(id).map(|model| model.display_name).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_is_in_catalog() {
        assert!(find_model(DEFAULT_MODEL).is_some());
    }

    #[test]
    fn find_model_ignores_case_and_padding() {
        let model = find_model("  GPT-4o ").expect("catalog entry");
        assert_eq!(model.id, "gpt-4o");
        assert!(find_model("claude-3").is_none());
    }

    #[test]
    fn display_name_falls_back_to_id() {
        assert_eq!(display_name("gpt-4-turbo"), "GPT-4 Turbo");
        assert_eq!(display_name("my-local-model"), "my-local-model");
    }
}
