//! Built-in per-category section schemas.
//!
//! Each row of [`CATEGORIES`] names a category, its default palette and font,
//! and its block order. Essential sections are appended by
//! [`SectionSchema::from_order`], so rows never list them.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::EngineResult;
use crate::schema::{CategoryTheme, SectionSchema};
use crate::section::SectionKind::{self, *};

/// Category used when a tenant's category key is unknown.
pub const DEFAULT_CATEGORY: &str = "default";

/// A row of the built-in category table
pub struct CategoryRow {
    pub key: &'static str,
    pub label: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub font: &'static str,
    pub order: &'static [SectionKind],
}

const STANDARD_ORDER: &[SectionKind] = &[
    Header, About, Services, Gallery, Videos, Testimonials, Faq, BusinessHours, Contact, Map,
    SocialLinks, Footer,
];

const FOOD_ORDER: &[SectionKind] = &[
    Header, About, Menu, Gallery, Videos, Testimonials, BusinessHours, Contact, Map, SocialLinks,
    Footer,
];

const TRADES_ORDER: &[SectionKind] = &[
    Header, Services, Projects, About, Testimonials, Faq, Contact, Map, SocialLinks, Footer,
];

const FITNESS_ORDER: &[SectionKind] = &[
    Header, About, Programs, Pricing, Team, Gallery, Videos, Testimonials, BusinessHours, Contact,
    SocialLinks, Footer,
];

const HEALTH_ORDER: &[SectionKind] = &[
    Header, About, Services, Team, Testimonials, Faq, BusinessHours, Contact, Map, Footer,
];

const PROFESSIONAL_ORDER: &[SectionKind] = &[
    Header, About, Services, Team, Testimonials, Faq, Contact, SocialLinks, Footer,
];

const PORTFOLIO_ORDER: &[SectionKind] = &[
    Header, Gallery, About, Services, Pricing, Videos, Testimonials, Contact, SocialLinks, Footer,
];

const BEAUTY_ORDER: &[SectionKind] = &[
    Header, About, Services, Pricing, Team, Gallery, Testimonials, BusinessHours, Contact, Map,
    SocialLinks, Footer,
];

#[rustfmt::skip]
pub const CATEGORIES: &[CategoryRow] = &[
    CategoryRow { key: "default", label: "Business", primary: "#1f2937", secondary: "#4b5563", accent: "#2563eb", font: "Inter", order: STANDARD_ORDER },
    CategoryRow { key: "salon", label: "Hair Salon", primary: "#9d174d", secondary: "#f9a8d4", accent: "#db2777", font: "Playfair Display", order: BEAUTY_ORDER },
    CategoryRow { key: "barbershop", label: "Barbershop", primary: "#111827", secondary: "#b45309", accent: "#dc2626", font: "Oswald", order: BEAUTY_ORDER },
    CategoryRow { key: "spa", label: "Spa", primary: "#115e59", secondary: "#99f6e4", accent: "#0d9488", font: "Lora", order: BEAUTY_ORDER },
    CategoryRow { key: "restaurant", label: "Restaurant", primary: "#7f1d1d", secondary: "#fcd34d", accent: "#b91c1c", font: "Merriweather", order: FOOD_ORDER },
    CategoryRow { key: "cafe", label: "Cafe", primary: "#78350f", secondary: "#fde68a", accent: "#92400e", font: "Nunito", order: FOOD_ORDER },
    CategoryRow { key: "bakery", label: "Bakery", primary: "#9a3412", secondary: "#fed7aa", accent: "#ea580c", font: "Quicksand", order: FOOD_ORDER },
    CategoryRow { key: "construction", label: "Construction", primary: "#1e3a8a", secondary: "#facc15", accent: "#ca8a04", font: "Roboto Condensed", order: TRADES_ORDER },
    CategoryRow { key: "plumber", label: "Plumbing", primary: "#1e40af", secondary: "#93c5fd", accent: "#2563eb", font: "Roboto", order: TRADES_ORDER },
    CategoryRow { key: "electrician", label: "Electrician", primary: "#1c1917", secondary: "#fde047", accent: "#eab308", font: "Roboto", order: TRADES_ORDER },
    CategoryRow { key: "cleaning", label: "Cleaning Services", primary: "#0369a1", secondary: "#bae6fd", accent: "#0ea5e9", font: "Open Sans", order: TRADES_ORDER },
    CategoryRow { key: "personal-trainer", label: "Personal Trainer", primary: "#14532d", secondary: "#86efac", accent: "#16a34a", font: "Montserrat", order: FITNESS_ORDER },
    CategoryRow { key: "gym", label: "Gym", primary: "#18181b", secondary: "#f97316", accent: "#ea580c", font: "Bebas Neue", order: FITNESS_ORDER },
    CategoryRow { key: "yoga-studio", label: "Yoga Studio", primary: "#4c1d95", secondary: "#ddd6fe", accent: "#7c3aed", font: "Lato", order: FITNESS_ORDER },
    CategoryRow { key: "dentist", label: "Dental Clinic", primary: "#0e7490", secondary: "#cffafe", accent: "#06b6d4", font: "Source Sans Pro", order: HEALTH_ORDER },
    CategoryRow { key: "clinic", label: "Medical Clinic", primary: "#1d4ed8", secondary: "#dbeafe", accent: "#3b82f6", font: "Source Sans Pro", order: HEALTH_ORDER },
    CategoryRow { key: "veterinary", label: "Veterinary", primary: "#065f46", secondary: "#a7f3d0", accent: "#10b981", font: "Nunito", order: HEALTH_ORDER },
    CategoryRow { key: "photographer", label: "Photographer", primary: "#000000", secondary: "#a3a3a3", accent: "#f59e0b", font: "Raleway", order: PORTFOLIO_ORDER },
    CategoryRow { key: "wedding-planner", label: "Wedding Planner", primary: "#831843", secondary: "#fce7f3", accent: "#be185d", font: "Cormorant Garamond", order: PORTFOLIO_ORDER },
    CategoryRow { key: "real-estate", label: "Real Estate", primary: "#0f172a", secondary: "#cbd5e1", accent: "#0284c7", font: "Poppins", order: PORTFOLIO_ORDER },
    CategoryRow { key: "lawyer", label: "Law Firm", primary: "#1e293b", secondary: "#d4af37", accent: "#a16207", font: "Libre Baskerville", order: PROFESSIONAL_ORDER },
    CategoryRow { key: "accountant", label: "Accounting", primary: "#134e4a", secondary: "#ccfbf1", accent: "#0f766e", font: "IBM Plex Sans", order: PROFESSIONAL_ORDER },
    CategoryRow { key: "consultant", label: "Consulting", primary: "#312e81", secondary: "#c7d2fe", accent: "#4f46e5", font: "IBM Plex Sans", order: PROFESSIONAL_ORDER },
    CategoryRow { key: "auto-repair", label: "Auto Repair", primary: "#27272a", secondary: "#ef4444", accent: "#dc2626", font: "Roboto Condensed", order: TRADES_ORDER },
    CategoryRow { key: "car-wash", label: "Car Wash", primary: "#075985", secondary: "#7dd3fc", accent: "#0284c7", font: "Poppins", order: STANDARD_ORDER },
    CategoryRow { key: "florist", label: "Florist", primary: "#3f6212", secondary: "#fbcfe8", accent: "#65a30d", font: "Cormorant Garamond", order: PORTFOLIO_ORDER },
    CategoryRow { key: "boutique", label: "Boutique", primary: "#292524", secondary: "#e7e5e4", accent: "#a8a29e", font: "Playfair Display", order: PORTFOLIO_ORDER },
    CategoryRow { key: "tattoo-studio", label: "Tattoo Studio", primary: "#0a0a0a", secondary: "#525252", accent: "#e11d48", font: "Oswald", order: PORTFOLIO_ORDER },
    CategoryRow { key: "tutor", label: "Tutoring", primary: "#1e3a8a", secondary: "#fef08a", accent: "#f59e0b", font: "Nunito", order: PROFESSIONAL_ORDER },
    CategoryRow { key: "pet-grooming", label: "Pet Grooming", primary: "#6b21a8", secondary: "#f5d0fe", accent: "#c026d3", font: "Quicksand", order: BEAUTY_ORDER },
    CategoryRow { key: "event-venue", label: "Event Venue", primary: "#422006", secondary: "#fef3c7", accent: "#d97706", font: "Lora", order: PORTFOLIO_ORDER },
];

impl CategoryRow {
    pub fn theme(&self) -> CategoryTheme {
        CategoryTheme {
            primary: self.primary.to_string(),
            secondary: self.secondary.to_string(),
            accent: self.accent.to_string(),
            font_family: self.font.to_string(),
            heading_family: self.font.to_string(),
            ..CategoryTheme::default()
        }
    }

    pub fn schema(&self) -> SectionSchema {
        SectionSchema::from_order(self.key, self.label, self.order, self.theme())
    }
}

/// Normalize a category key: trimmed, lowercase, `_` and spaces as `-`.
pub fn normalize_category_key(key: &str) -> String {
    key.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == '_' || c == ' ' { '-' } else { c })
        .collect()
}

/// Lookup table of category schemas.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, SectionSchema>,
}

impl SchemaRegistry {
    /// An empty registry holding only the `default` category.
    pub fn new() -> Self {
        let mut schemas = HashMap::new();
        if let Some(row) = CATEGORIES.iter().find(|r| r.key == DEFAULT_CATEGORY) {
            schemas.insert(DEFAULT_CATEGORY.to_string(), row.schema());
        }
        Self { schemas }
    }

    /// A registry holding every built-in category.
    pub fn with_builtin_categories() -> Self {
        let schemas = CATEGORIES
            .iter()
            .map(|row| (row.key.to_string(), row.schema()))
            .collect();
        Self { schemas }
    }

    /// The process-wide built-in registry, built on first use.
    pub fn builtin() -> &'static SchemaRegistry {
        static BUILTIN: OnceLock<SchemaRegistry> = OnceLock::new();
        BUILTIN.get_or_init(SchemaRegistry::with_builtin_categories)
    }

    /// Add or replace a category schema after checking its invariants.
    pub fn register(&mut self, mut schema: SectionSchema) -> EngineResult<()> {
        schema.category = normalize_category_key(&schema.category);
        schema.validate()?;
        self.schemas.insert(schema.category.clone(), schema);
        Ok(())
    }

    pub fn get(&self, category: &str) -> Option<&SectionSchema> {
        self.schemas.get(&normalize_category_key(category))
    }

    /// The schema for `category`, or the default category's schema.
    pub fn schema_or_default(&self, category: &str) -> &SectionSchema {
        match self.get(category) {
            Some(schema) => schema,
            None => {
                tracing::debug!(category, "unknown category, using default schema");
                self.default_schema()
            }
        }
    }

    pub fn default_schema(&self) -> &SectionSchema {
        static FALLBACK: OnceLock<SectionSchema> = OnceLock::new();
        self.schemas.get(DEFAULT_CATEGORY).unwrap_or_else(|| {
            FALLBACK.get_or_init(|| {
                SectionSchema::from_order(
                    DEFAULT_CATEGORY,
                    "Business",
                    STANDARD_ORDER,
                    CategoryTheme::default(),
                )
            })
        })
    }

    pub fn contains(&self, category: &str) -> bool {
        self.get(category).is_some()
    }

    /// Registered category keys, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
