//! Web app manifest built from the `pwa` section.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pipeline::ResolvedPage;
use crate::section::SectionKind;
use crate::validator::validate_color;

const SHORT_NAME_MAX: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebManifest {
    pub name: String,
    pub short_name: String,
    pub start_url: String,
    pub display: String,
    pub theme_color: String,
    pub background_color: String,
    pub lang: String,
    pub dir: String,
    pub icons: Vec<ManifestIcon>,
}

impl WebManifest {
    /// Build the manifest for `page`, or `None` when the tenant has not
    /// enabled the PWA section.
    pub fn from_page(page: &ResolvedPage, start_url: &str) -> Option<Self> {
        let pwa = page.content(&SectionKind::Pwa)?;
        if !pwa.get("enabled").and_then(Value::as_bool).unwrap_or(false) {
            return None;
        }

        let text = |field: &str| {
            pwa.get(field)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };
        let color = |field: &str, fallback: &str| {
            text(field)
                .filter(|c| validate_color(c).is_ok())
                .unwrap_or(fallback)
                .to_string()
        };

        let name = text("name")
            .unwrap_or(page.business_name.as_str())
            .to_string();
        let short_name = text("short_name")
            .map(str::to_string)
            .unwrap_or_else(|| short_name_for(&name));
        let icons = text("icon")
            .map(|src| {
                vec![ManifestIcon {
                    src: src.to_string(),
                    sizes: "any".to_string(),
                    mime_type: icon_mime_type(src).to_string(),
                }]
            })
            .unwrap_or_default();

        Some(Self {
            short_name,
            name,
            start_url: if start_url.is_empty() { "/" } else { start_url }.to_string(),
            display: "standalone".to_string(),
            theme_color: color("theme_color", &page.theme.colors.primary),
            background_color: color("background_color", &page.theme.colors.background),
            lang: page.theme.language.code.clone(),
            dir: page.theme.language.direction.clone(),
            icons,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn short_name_for(name: &str) -> String {
    if name.chars().count() <= SHORT_NAME_MAX {
        return name.to_string();
    }
    let first_word = name.split_whitespace().next().unwrap_or(name);
    first_word.chars().take(SHORT_NAME_MAX).collect()
}

fn icon_mime_type(src: &str) -> &'static str {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    let ext = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "image/png",
    }
}
