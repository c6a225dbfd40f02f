use regex::Regex;
use std::sync::OnceLock;

use crate::error::{EngineError, EngineResult};

const NAMED_COLORS: &[&str] = &[
    "black", "white", "red", "green", "blue", "yellow", "orange", "purple", "pink", "gray",
    "grey", "brown", "navy", "teal", "transparent",
];

const RTL_LANGUAGES: &[&str] = &["ar", "he", "fa", "ur"];

const MAX_FONT_FAMILY_LEN: usize = 64;

pub fn validate_color(color: &str) -> EngineResult<()> {
    static HEX_COLOR_REGEX: OnceLock<Regex> = OnceLock::new();
    let hex_regex = HEX_COLOR_REGEX
        .get_or_init(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());

    let color = color.trim();
    if color.starts_with('#') {
        if !hex_regex.is_match(color) {
            return Err(EngineError::InvalidColor {
                value: color.to_string(),
                reason: "hex colors must be #rgb or #rrggbb".to_string(),
            });
        }
        return Ok(());
    }
    if !NAMED_COLORS.contains(&color.to_ascii_lowercase().as_str()) {
        return Err(EngineError::InvalidColor {
            value: color.to_string(),
            reason: format!("expected a hex color or one of: {}", NAMED_COLORS.join(", ")),
        });
    }
    Ok(())
}

pub fn validate_font_family(family: &str) -> EngineResult<()> {
    static FONT_FAMILY_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = FONT_FAMILY_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]*$").unwrap());

    let family = family.trim();
    if family.is_empty() || family.len() > MAX_FONT_FAMILY_LEN {
        return Err(EngineError::InvalidFontFamily {
            family: family.to_string(),
            reason: format!("must be 1-{} characters", MAX_FONT_FAMILY_LEN),
        });
    }
    if !re.is_match(family) {
        return Err(EngineError::InvalidFontFamily {
            family: family.to_string(),
            reason: "only letters, digits, spaces and '-' are allowed".to_string(),
        });
    }
    Ok(())
}

pub fn validate_language(code: &str) -> EngineResult<()> {
    static LANGUAGE_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = LANGUAGE_REGEX.get_or_init(|| Regex::new(r"^[a-z]{2}(-[A-Z]{2})?$").unwrap());

    if !re.is_match(code.trim()) {
        return Err(EngineError::InvalidLanguage {
            code: code.to_string(),
        });
    }
    Ok(())
}

/// Text direction for a validated language code.
pub fn language_direction(code: &str) -> &'static str {
    let primary = code.split('-').next().unwrap_or(code);
    if RTL_LANGUAGES.contains(&primary) {
        "rtl"
    } else {
        "ltr"
    }
}
