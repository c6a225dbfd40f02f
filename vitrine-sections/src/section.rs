use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A section key.
///
/// Known kinds are closed variants; anything else parses to [`SectionKind::Custom`]
/// so operator-added sections stay addressable. A custom key only survives
/// resolution when the category schema declares it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SectionKind {
    Header,
    About,
    Services,
    Menu,
    Projects,
    Programs,
    Pricing,
    Team,
    Gallery,
    Videos,
    Testimonials,
    Faq,
    BusinessHours,
    Contact,
    Map,
    SocialLinks,
    Footer,
    Colors,
    Font,
    Language,
    Pwa,
    CustomCssJs,
    Custom(String),
}

/// Every known (non-custom) kind, block sections first.
pub const KNOWN_SECTIONS: &[SectionKind] = &[
    SectionKind::Header,
    SectionKind::About,
    SectionKind::Services,
    SectionKind::Menu,
    SectionKind::Projects,
    SectionKind::Programs,
    SectionKind::Pricing,
    SectionKind::Team,
    SectionKind::Gallery,
    SectionKind::Videos,
    SectionKind::Testimonials,
    SectionKind::Faq,
    SectionKind::BusinessHours,
    SectionKind::Contact,
    SectionKind::Map,
    SectionKind::SocialLinks,
    SectionKind::Footer,
    SectionKind::Colors,
    SectionKind::Font,
    SectionKind::Language,
    SectionKind::Pwa,
    SectionKind::CustomCssJs,
];

impl SectionKind {
    /// Sections that survive every plan restriction and visibility setting.
    pub const ESSENTIAL: [SectionKind; 5] = [
        SectionKind::Colors,
        SectionKind::Font,
        SectionKind::Language,
        SectionKind::Pwa,
        SectionKind::CustomCssJs,
    ];

    /// Parse a key leniently: trimmed, case-insensitive, `-` accepted for `_`.
    pub fn parse(key: &str) -> Self {
        let normalized = key.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "header" => SectionKind::Header,
            "about" => SectionKind::About,
            "services" => SectionKind::Services,
            "menu" => SectionKind::Menu,
            "projects" => SectionKind::Projects,
            "programs" => SectionKind::Programs,
            "pricing" => SectionKind::Pricing,
            "team" => SectionKind::Team,
            "gallery" => SectionKind::Gallery,
            "videos" => SectionKind::Videos,
            "testimonials" => SectionKind::Testimonials,
            "faq" => SectionKind::Faq,
            "business_hours" => SectionKind::BusinessHours,
            "contact" => SectionKind::Contact,
            "map" => SectionKind::Map,
            "social_links" => SectionKind::SocialLinks,
            "footer" => SectionKind::Footer,
            "colors" => SectionKind::Colors,
            "font" => SectionKind::Font,
            "language" => SectionKind::Language,
            "pwa" => SectionKind::Pwa,
            "custom_css_js" => SectionKind::CustomCssJs,
            _ => SectionKind::Custom(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SectionKind::Header => "header",
            SectionKind::About => "about",
            SectionKind::Services => "services",
            SectionKind::Menu => "menu",
            SectionKind::Projects => "projects",
            SectionKind::Programs => "programs",
            SectionKind::Pricing => "pricing",
            SectionKind::Team => "team",
            SectionKind::Gallery => "gallery",
            SectionKind::Videos => "videos",
            SectionKind::Testimonials => "testimonials",
            SectionKind::Faq => "faq",
            SectionKind::BusinessHours => "business_hours",
            SectionKind::Contact => "contact",
            SectionKind::Map => "map",
            SectionKind::SocialLinks => "social_links",
            SectionKind::Footer => "footer",
            SectionKind::Colors => "colors",
            SectionKind::Font => "font",
            SectionKind::Language => "language",
            SectionKind::Pwa => "pwa",
            SectionKind::CustomCssJs => "custom_css_js",
            SectionKind::Custom(key) => key,
        }
    }

    pub fn is_essential(&self) -> bool {
        Self::ESSENTIAL.contains(self)
    }

    /// Field holding the section's item sequence, for list-based kinds.
    pub fn list_field(&self) -> Option<&'static str> {
        match self {
            SectionKind::Services
            | SectionKind::Menu
            | SectionKind::Projects
            | SectionKind::Programs
            | SectionKind::Pricing
            | SectionKind::Team
            | SectionKind::Testimonials
            | SectionKind::Faq => Some("items"),
            SectionKind::Gallery => Some("images"),
            SectionKind::Videos => Some("videos"),
            SectionKind::BusinessHours => Some("days"),
            SectionKind::SocialLinks => Some("links"),
            _ => None,
        }
    }

    /// True when the content has nothing worth rendering for this kind.
    ///
    /// Malformed content (a scalar where an object or list is expected)
    /// counts as empty.
    pub fn is_empty_content(&self, content: &Value) -> bool {
        if self.is_essential() || *self == SectionKind::Footer {
            return false;
        }
        if let Some(field) = self.list_field() {
            return match content.get(field) {
                Some(Value::Array(items)) => items.iter().all(is_blank),
                _ => true,
            };
        }
        match self {
            SectionKind::Contact => all_blank(content, &["phone", "email", "address", "whatsapp"]),
            SectionKind::Header => all_blank(content, &["title", "logo"]),
            SectionKind::About => all_blank(content, &["description", "image"]),
            SectionKind::Map => all_blank(content, &["address", "embed_url"]),
            _ => is_blank(content),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SectionKind {
    fn from(key: String) -> Self {
        SectionKind::parse(&key)
    }
}

impl From<&str> for SectionKind {
    fn from(key: &str) -> Self {
        SectionKind::parse(key)
    }
}

impl From<SectionKind> for String {
    fn from(kind: SectionKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Null, whitespace-only strings, and containers holding only blank values.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.iter().all(is_blank),
        Value::Object(map) => map.values().all(is_blank),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn all_blank(content: &Value, fields: &[&str]) -> bool {
    if !content.is_object() {
        return true;
    }
    fields
        .iter()
        .all(|field| content.get(*field).map_or(true, is_blank))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_is_lenient() {
        assert_eq!(SectionKind::parse("Business-Hours"), SectionKind::BusinessHours);
        assert_eq!(SectionKind::parse("  contact "), SectionKind::Contact);
        assert_eq!(
            SectionKind::parse("Loyalty-Card"),
            SectionKind::Custom("loyalty_card".to_string())
        );
    }

    #[test]
    fn test_known_sections_round_trip_through_as_str() {
        for kind in KNOWN_SECTIONS {
            assert_eq!(&SectionKind::parse(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_serde_uses_string_keys() {
        let kinds: Vec<SectionKind> = serde_json::from_value(json!(["gallery", "promo"])).unwrap();
        assert_eq!(
            kinds,
            vec![SectionKind::Gallery, SectionKind::Custom("promo".to_string())]
        );
        assert_eq!(serde_json::to_value(&kinds).unwrap(), json!(["gallery", "promo"]));
    }

    #[test]
    fn test_contact_empty_when_all_channels_blank() {
        let content = json!({"title": "Contact", "phone": "", "email": " ", "address": ""});
        assert!(SectionKind::Contact.is_empty_content(&content));

        let content = json!({"phone": "", "email": "hi@example.com", "address": ""});
        assert!(!SectionKind::Contact.is_empty_content(&content));
    }

    #[test]
    fn test_list_sections_need_items() {
        assert!(SectionKind::Services.is_empty_content(&json!({"title": "Services", "items": []})));
        assert!(SectionKind::Gallery.is_empty_content(&json!({"images": "not-a-list"})));
        assert!(!SectionKind::Gallery.is_empty_content(&json!({"images": ["/storage/a.png"]})));
    }

    #[test]
    fn test_essentials_and_footer_are_never_empty() {
        assert!(!SectionKind::Colors.is_empty_content(&json!({})));
        assert!(!SectionKind::Footer.is_empty_content(&Value::Null));
    }

    #[test]
    fn test_custom_section_blankness() {
        let kind = SectionKind::Custom("promo".to_string());
        assert!(kind.is_empty_content(&json!({"headline": "", "items": []})));
        assert!(!kind.is_empty_content(&json!({"headline": "Spring sale"})));
    }
}
