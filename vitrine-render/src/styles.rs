//! Per-category presentation table.
//!
//! Categories differ only in how the shared section markup is laid out and
//! which icons decorate section headings.

use serde::Serialize;
use vitrine_sections::registry::normalize_category_key;
use vitrine_sections::{SectionKind, DEFAULT_CATEGORY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeroLayout {
    Centered,
    Split,
    Banner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListLayout {
    Cards,
    List,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconSet {
    Classic,
    Bold,
    Soft,
}

impl HeroLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeroLayout::Centered => "centered",
            HeroLayout::Split => "split",
            HeroLayout::Banner => "banner",
        }
    }
}

impl ListLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListLayout::Cards => "cards",
            ListLayout::List => "list",
            ListLayout::Grid => "grid",
        }
    }
}

impl IconSet {
    /// Heading glyph for a section, if the set decorates it.
    pub fn glyph(&self, kind: &SectionKind) -> Option<&'static str> {
        use SectionKind::*;
        let glyph = match (self, kind) {
            (_, About) => "\u{2139}",
            (IconSet::Classic, Services | Programs) => "\u{2726}",
            (IconSet::Bold, Services | Programs) => "\u{2692}",
            (IconSet::Soft, Services | Programs) => "\u{273F}",
            (_, Menu) => "\u{2615}",
            (_, Projects) => "\u{25A3}",
            (_, Pricing) => "\u{00A4}",
            (_, Team) => "\u{263A}",
            (_, Gallery) => "\u{25A6}",
            (_, Videos) => "\u{25B6}",
            (IconSet::Soft, Testimonials) => "\u{2661}",
            (_, Testimonials) => "\u{275D}",
            (_, Faq) => "?",
            (_, BusinessHours) => "\u{25F7}",
            (_, Contact) => "\u{2709}",
            (_, Map) => "\u{2316}",
            _ => return None,
        };
        Some(glyph)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryStyle {
    pub key: &'static str,
    pub hero: HeroLayout,
    pub list: ListLayout,
    pub icons: IconSet,
}

use HeroLayout::{Banner, Centered, Split};
use IconSet::{Bold, Classic, Soft};
use ListLayout::{Cards, Grid, List};

#[rustfmt::skip]
pub const STYLES: &[CategoryStyle] = &[
    CategoryStyle { key: "default", hero: Centered, list: Cards, icons: Classic },
    CategoryStyle { key: "salon", hero: Split, list: Cards, icons: Soft },
    CategoryStyle { key: "barbershop", hero: Banner, list: List, icons: Bold },
    CategoryStyle { key: "spa", hero: Centered, list: Cards, icons: Soft },
    CategoryStyle { key: "restaurant", hero: Banner, list: List, icons: Classic },
    CategoryStyle { key: "cafe", hero: Split, list: List, icons: Soft },
    CategoryStyle { key: "bakery", hero: Split, list: Grid, icons: Soft },
    CategoryStyle { key: "construction", hero: Banner, list: Grid, icons: Bold },
    CategoryStyle { key: "plumber", hero: Banner, list: Cards, icons: Bold },
    CategoryStyle { key: "electrician", hero: Banner, list: Cards, icons: Bold },
    CategoryStyle { key: "cleaning", hero: Centered, list: Cards, icons: Classic },
    CategoryStyle { key: "personal-trainer", hero: Banner, list: Cards, icons: Bold },
    CategoryStyle { key: "gym", hero: Banner, list: Grid, icons: Bold },
    CategoryStyle { key: "yoga-studio", hero: Centered, list: List, icons: Soft },
    CategoryStyle { key: "dentist", hero: Split, list: Cards, icons: Classic },
    CategoryStyle { key: "clinic", hero: Split, list: Cards, icons: Classic },
    CategoryStyle { key: "veterinary", hero: Split, list: Cards, icons: Soft },
    CategoryStyle { key: "photographer", hero: Banner, list: Grid, icons: Classic },
    CategoryStyle { key: "wedding-planner", hero: Centered, list: Grid, icons: Soft },
    CategoryStyle { key: "real-estate", hero: Banner, list: Grid, icons: Classic },
    CategoryStyle { key: "lawyer", hero: Split, list: List, icons: Classic },
    CategoryStyle { key: "accountant", hero: Split, list: List, icons: Classic },
    CategoryStyle { key: "consultant", hero: Centered, list: List, icons: Classic },
    CategoryStyle { key: "auto-repair", hero: Banner, list: Cards, icons: Bold },
    CategoryStyle { key: "car-wash", hero: Banner, list: Cards, icons: Bold },
    CategoryStyle { key: "florist", hero: Centered, list: Grid, icons: Soft },
    CategoryStyle { key: "boutique", hero: Split, list: Grid, icons: Soft },
    CategoryStyle { key: "tattoo-studio", hero: Banner, list: Grid, icons: Bold },
    CategoryStyle { key: "tutor", hero: Centered, list: List, icons: Classic },
    CategoryStyle { key: "pet-grooming", hero: Split, list: Cards, icons: Soft },
    CategoryStyle { key: "event-venue", hero: Banner, list: Grid, icons: Classic },
];

/// Style row for `category`.
pub fn style_for(category: &str) -> Option<&'static CategoryStyle> {
    let key = normalize_category_key(category);
    STYLES.iter().find(|s| s.key == key)
}

/// Style row for the default category.
pub fn default_style() -> &'static CategoryStyle {
    STYLES
        .iter()
        .find(|s| s.key == DEFAULT_CATEGORY)
        .unwrap_or(&STYLES[0])
}
