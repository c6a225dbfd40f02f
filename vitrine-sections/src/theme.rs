use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::normalize::SectionMap;
use crate::schema::CategoryTheme;
use crate::section::SectionKind;
use crate::validator::{language_direction, validate_color, validate_font_family, validate_language};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeFont {
    pub family: String,
    pub heading_family: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeLanguage {
    pub code: String,
    pub direction: String,
}

/// Theme values handed to renderers, taken from the essential sections and
/// checked against the category defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTheme {
    pub colors: ThemeColors,
    pub font: ThemeFont,
    pub language: ThemeLanguage,
}

impl ResolvedTheme {
    /// Theme made only of category defaults.
    pub fn from_defaults(defaults: &CategoryTheme) -> Self {
        Self::resolve_sections(&SectionMap::new(), defaults)
    }

    /// Build the theme from normalized sections. Invalid values fall back to
    /// the category default.
    pub fn resolve_sections(sections: &SectionMap, defaults: &CategoryTheme) -> Self {
        let colors = sections.get(&SectionKind::Colors);
        let font = sections.get(&SectionKind::Font);
        let language = sections.get(&SectionKind::Language);

        let color = |field: &str, fallback: &str| {
            pick(colors, field, fallback, |v| validate_color(v).is_ok())
        };

        let family = pick(font, "family", &defaults.font_family, |v| {
            validate_font_family(v).is_ok()
        });
        let heading_family = pick(font, "heading_family", &family, |v| {
            validate_font_family(v).is_ok()
        });
        let code = pick(language, "code", "en", |v| validate_language(v).is_ok());

        Self {
            colors: ThemeColors {
                primary: color("primary", &defaults.primary),
                secondary: color("secondary", &defaults.secondary),
                accent: color("accent", &defaults.accent),
                background: color("background", &defaults.background),
                text: color("text", &defaults.text),
            },
            font: ThemeFont {
                family,
                heading_family,
            },
            language: ThemeLanguage {
                direction: language_direction(&code).to_string(),
                code,
            },
        }
    }

    /// Resolve a theme token reference (e.g., "$theme.colors.primary")
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let path = reference.strip_prefix("$theme.")?;
        let (group, key) = path.split_once('.')?;

        let value = match (group, key) {
            ("colors", "primary") => &self.colors.primary,
            ("colors", "secondary") => &self.colors.secondary,
            ("colors", "accent") => &self.colors.accent,
            ("colors", "background") => &self.colors.background,
            ("colors", "text") => &self.colors.text,
            ("font", "family") => &self.font.family,
            ("font", "heading_family") => &self.font.heading_family,
            ("language", "code") => &self.language.code,
            ("language", "direction") => &self.language.direction,
            _ => return None,
        };
        Some(value.clone())
    }

    /// Replace every known `$theme.group.key` token in `text`. Unknown tokens
    /// are left as written.
    pub fn interpolate(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("$theme.") {
            out.push_str(&rest[..start]);
            let token_len = rest[start..]
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$'))
                .unwrap_or(rest.len() - start);
            let token = rest[start..start + token_len].trim_end_matches('.');
            match self.resolve(token) {
                Some(value) => out.push_str(&value),
                None => out.push_str(token),
            }
            rest = &rest[start + token.len()..];
        }
        out.push_str(rest);
        out
    }

    /// CSS custom properties for the theme.
    pub fn css_variables(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("--color-primary", self.colors.primary.as_str()),
            ("--color-secondary", self.colors.secondary.as_str()),
            ("--color-accent", self.colors.accent.as_str()),
            ("--color-background", self.colors.background.as_str()),
            ("--color-text", self.colors.text.as_str()),
            ("--font-body", self.font.family.as_str()),
            ("--font-heading", self.font.heading_family.as_str()),
        ]
    }
}

fn pick(section: Option<&Value>, field: &str, fallback: &str, valid: impl Fn(&str) -> bool) -> String {
    match section.and_then(|s| s.get(field)).and_then(Value::as_str) {
        Some(value) if valid(value) => value.trim().to_string(),
        Some(value) => {
            debug!(field, value, fallback, "invalid theme value, using default");
            fallback.to_string()
        }
        None => fallback.to_string(),
    }
}
