use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

use crate::error::{EngineError, EngineResult};
use crate::section::SectionKind;

/// One entry of a category schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDefault {
    pub key: SectionKind,
    pub default_content: Value,
    #[serde(default)]
    pub required: bool,
}

/// Default theme values for a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTheme {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
    pub font_family: String,
    pub heading_family: String,
}

impl Default for CategoryTheme {
    fn default() -> Self {
        Self {
            primary: "#1f2937".to_string(),
            secondary: "#4b5563".to_string(),
            accent: "#2563eb".to_string(),
            background: "#ffffff".to_string(),
            text: "#111827".to_string(),
            font_family: "Inter".to_string(),
            heading_family: "Inter".to_string(),
        }
    }
}

/// Ordered section defaults for one category.
///
/// Entry order is the category's canonical section order. Schemas are
/// immutable once registered and shared read-only by every tenant of the
/// category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSchema {
    pub category: String,
    pub label: String,
    pub entries: Vec<SectionDefault>,
    pub theme: CategoryTheme,
}

impl SectionSchema {
    /// Build a schema from a block order, filling defaults per kind and
    /// appending any essential section the order leaves out.
    pub fn from_order(
        category: impl Into<String>,
        label: impl Into<String>,
        order: &[SectionKind],
        theme: CategoryTheme,
    ) -> Self {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(order.len() + SectionKind::ESSENTIAL.len());
        for kind in order.iter().chain(SectionKind::ESSENTIAL.iter()) {
            if !seen.insert(kind.clone()) {
                continue;
            }
            entries.push(SectionDefault {
                key: kind.clone(),
                default_content: default_content(kind, &theme),
                required: kind.is_essential(),
            });
        }
        Self {
            category: category.into(),
            label: label.into(),
            entries,
            theme,
        }
    }

    /// Add a section to the end of the block order (before the essentials).
    pub fn with_section(mut self, key: SectionKind, default_content: Value) -> Self {
        if self.contains(&key) {
            return self;
        }
        let at = self
            .entries
            .iter()
            .position(|e| e.key.is_essential())
            .unwrap_or(self.entries.len());
        self.entries.insert(
            at,
            SectionDefault {
                key,
                default_content,
                required: false,
            },
        );
        self
    }

    /// The category's canonical section order.
    pub fn default_order(&self) -> Vec<SectionKind> {
        self.entries.iter().map(|e| e.key.clone()).collect()
    }

    pub fn contains(&self, key: &SectionKind) -> bool {
        self.entry(key).is_some()
    }

    pub fn entry(&self, key: &SectionKind) -> Option<&SectionDefault> {
        self.entries.iter().find(|e| &e.key == key)
    }

    /// Check the registry invariants: no duplicate keys, every essential present.
    pub fn validate(&self) -> EngineResult<()> {
        if self.category.trim().is_empty() {
            return Err(EngineError::InvalidCategory {
                key: self.category.clone(),
            });
        }
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if entry.key.as_str().is_empty() {
                return Err(EngineError::InvalidSectionKey {
                    key: String::new(),
                    reason: "section keys must be non-empty".to_string(),
                });
            }
            if !seen.insert(&entry.key) {
                return Err(EngineError::DuplicateSection {
                    category: self.category.clone(),
                    key: entry.key.to_string(),
                });
            }
        }
        for essential in &SectionKind::ESSENTIAL {
            if !seen.contains(essential) {
                return Err(EngineError::MissingEssentialSection {
                    category: self.category.clone(),
                    key: essential.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Default content for a section kind.
///
/// List sections default to an empty list so that malformed tenant input
/// falls back to "nothing to show" rather than placeholder items.
pub fn default_content(kind: &SectionKind, theme: &CategoryTheme) -> Value {
    match kind {
        SectionKind::Header => json!({
            "title": "",
            "tagline": "",
            "logo": "",
            "background_image": "",
            "cta_label": "",
            "cta_url": "",
        }),
        SectionKind::About => json!({
            "title": "About us",
            "description": "",
            "image": "",
        }),
        SectionKind::Services => list_default("Services", "items"),
        SectionKind::Menu => list_default("Menu", "items"),
        SectionKind::Projects => list_default("Projects", "items"),
        SectionKind::Programs => list_default("Programs", "items"),
        SectionKind::Pricing => list_default("Pricing", "items"),
        SectionKind::Team => list_default("Our team", "items"),
        SectionKind::Gallery => list_default("Gallery", "images"),
        SectionKind::Videos => list_default("Videos", "videos"),
        SectionKind::Testimonials => list_default("What our clients say", "items"),
        SectionKind::Faq => list_default("Frequently asked questions", "items"),
        SectionKind::BusinessHours => list_default("Opening hours", "days"),
        SectionKind::Contact => json!({
            "title": "Contact",
            "phone": "",
            "email": "",
            "address": "",
            "whatsapp": "",
        }),
        SectionKind::Map => json!({
            "title": "Find us",
            "address": "",
            "embed_url": "",
        }),
        SectionKind::SocialLinks => json!({ "links": [] }),
        SectionKind::Footer => json!({
            "text": "",
            "show_powered_by": true,
        }),
        SectionKind::Colors => json!({
            "primary": theme.primary,
            "secondary": theme.secondary,
            "accent": theme.accent,
            "background": theme.background,
            "text": theme.text,
        }),
        SectionKind::Font => json!({
            "family": theme.font_family,
            "heading_family": theme.heading_family,
        }),
        SectionKind::Language => json!({ "code": "en" }),
        SectionKind::Pwa => json!({
            "enabled": false,
            "name": "",
            "short_name": "",
            "theme_color": "",
            "background_color": "",
            "icon": "",
        }),
        SectionKind::CustomCssJs => json!({ "css": "", "js": "" }),
        SectionKind::Custom(_) => Value::Object(Map::new()),
    }
}

fn list_default(title: &str, field: &str) -> Value {
    let mut map = Map::new();
    map.insert("title".to_string(), Value::String(title.to_string()));
    map.insert(field.to_string(), Value::Array(Vec::new()));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_order_appends_essentials() {
        let schema = SectionSchema::from_order(
            "test",
            "Test",
            &[SectionKind::Header, SectionKind::Contact],
            CategoryTheme::default(),
        );
        let order = schema.default_order();
        assert_eq!(order[0], SectionKind::Header);
        assert_eq!(order[1], SectionKind::Contact);
        assert_eq!(&order[2..], &SectionKind::ESSENTIAL);
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_from_order_skips_duplicates() {
        let schema = SectionSchema::from_order(
            "test",
            "Test",
            &[SectionKind::Header, SectionKind::Header, SectionKind::Font],
            CategoryTheme::default(),
        );
        assert_eq!(schema.entries.len(), 1 + SectionKind::ESSENTIAL.len());
    }

    #[test]
    fn test_with_section_inserts_before_essentials() {
        let promo = SectionKind::Custom("promo".to_string());
        let schema = SectionSchema::from_order(
            "test",
            "Test",
            &[SectionKind::Header],
            CategoryTheme::default(),
        )
        .with_section(promo.clone(), json!({"headline": ""}));
        assert_eq!(schema.default_order()[1], promo);
    }

    #[test]
    fn test_validate_rejects_missing_essential() {
        let mut schema =
            SectionSchema::from_order("test", "Test", &[SectionKind::Header], CategoryTheme::default());
        schema.entries.retain(|e| e.key != SectionKind::Pwa);
        assert!(matches!(
            schema.validate(),
            Err(EngineError::MissingEssentialSection { .. })
        ));
    }

    #[test]
    fn test_colors_default_follows_theme() {
        let theme = CategoryTheme {
            primary: "#ff0000".to_string(),
            ..CategoryTheme::default()
        };
        let colors = default_content(&SectionKind::Colors, &theme);
        assert_eq!(colors["primary"], "#ff0000");
    }
}
