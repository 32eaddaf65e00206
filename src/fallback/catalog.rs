//! Data-driven template catalog: `category -> ordered templates`.

use crate::types::Complexity;
use crate::{Error, ErrorContext, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("templates.yaml");

/// Name of the category used when no keyword matches.
pub const GENERIC_CATEGORY: &str = "generic";

#[derive(Debug, Clone, Deserialize)]
pub struct StepTemplates {
    pub trigger: String,
    pub process: String,
    pub output: String,
}

/// One name/description template inside a category.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateDescriptor {
    pub name: String,
    pub description: String,
    pub complexity: Complexity,
    pub time_savings_minutes: f64,
    pub steps: StepTemplates,
}

impl TemplateDescriptor {
    /// Substitute `{title}` and `{title_lower}` into `text`.
    pub fn render(text: &str, title: &str) -> String {
        text.replace("{title_lower}", &title.to_lowercase())
            .replace("{title}", title)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryTemplates {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub integrations: Vec<String>,
    pub templates: Vec<TemplateDescriptor>,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    categories: Vec<CategoryTemplates>,
}

/// Fallback template catalog, loaded once and shared read-only.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    categories: Vec<CategoryTemplates>,
    generic_index: usize,
}

impl TemplateCatalog {
    /// The catalog compiled into the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let doc: CatalogDocument = serde_yaml::from_str(yaml)?;
        Self::from_categories(doc.categories)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_categories(mut categories: Vec<CategoryTemplates>) -> Result<Self> {
        let mut seen = HashSet::new();
        for (i, category) in categories.iter_mut().enumerate() {
            let field = format!("categories[{}]", i);
            if category.name.trim().is_empty() {
                return Err(invalid("category name is empty", field));
            }
            if !seen.insert(category.name.clone()) {
                return Err(invalid(
                    format!("duplicate category '{}'", category.name),
                    field,
                ));
            }
            if category.templates.is_empty() {
                return Err(invalid(
                    format!("category '{}' has no templates", category.name),
                    format!("{}.templates", field),
                ));
            }
            if category.integrations.is_empty() {
                return Err(invalid(
                    format!("category '{}' has no integrations", category.name),
                    format!("{}.integrations", field),
                ));
            }
            for (j, t) in category.templates.iter().enumerate() {
                if t.name.trim().is_empty() || t.description.trim().is_empty() {
                    return Err(invalid(
                        "template name and description must be non-empty",
                        format!("{}.templates[{}]", field, j),
                    ));
                }
                if !(t.time_savings_minutes.is_finite() && t.time_savings_minutes > 0.0) {
                    return Err(invalid(
                        "time_savings_minutes must be positive",
                        format!("{}.templates[{}].time_savings_minutes", field, j),
                    ));
                }
            }
            for keyword in category.keywords.iter_mut() {
                *keyword = keyword.trim().to_lowercase();
            }
            category.keywords.retain(|k| !k.is_empty());
        }

        let generic_index = categories
            .iter()
            .position(|c| c.name == GENERIC_CATEGORY)
            .ok_or_else(|| {
                invalid(
                    format!("catalog must define a '{}' category", GENERIC_CATEGORY),
                    "categories".to_string(),
                )
            })?;

        Ok(Self {
            categories,
            generic_index,
        })
    }

    pub fn categories(&self) -> &[CategoryTemplates] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&CategoryTemplates> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn generic(&self) -> &CategoryTemplates {
        &self.categories[self.generic_index]
    }

    /// Enumerate the full strategy table: every category with its ordered templates.
    pub fn strategies(&self) -> impl Iterator<Item = (&str, &[TemplateDescriptor])> {
        self.categories
            .iter()
            .map(|c| (c.name.as_str(), c.templates.as_slice()))
    }

    /// Template for a variation; indices beyond the list cycle.
    pub fn template_for<'a>(
        category: &'a CategoryTemplates,
        variation_index: u32,
    ) -> &'a TemplateDescriptor {
        let idx = variation_index as usize % category.templates.len();
        &category.templates[idx]
    }
}

fn invalid(message: impl Into<String>, field: String) -> Error {
    Error::validation_with_context(
        message,
        ErrorContext::new()
            .with_field_path(field)
            .with_source("template_catalog"),
    )
}
