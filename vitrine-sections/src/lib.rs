//! # Vitrine section resolution engine
//!
//! Turns a tenant's saved business profile into an ordered, filtered,
//! render-ready list of sections.
//!
//! ## Pipeline
//! - Category schema lookup (falls back to `default`)
//! - Normalization: tenant content deep-merged over schema defaults
//! - Plan gate: plan and template allowances, essentials always kept
//! - Ordering: tenant order reconciled with the category order
//! - Visibility: tenant switches and per-kind emptiness checks
//! - Asset rewriting and video sanitizing
//! - Theme resolution
//!
//! ## Example
//! ```ignore
//! use vitrine_sections::{resolve_page, BusinessProfile, PlanEntitlement, RenderContext,
//!     SchemaRegistry, TemplateConfig};
//!
//! let profile = BusinessProfile::from_yaml_str(r#"
//! name: Studio Nova
//! category: salon
//! sections:
//!   header:
//!     title: Studio Nova
//! "#)?;
//!
//! let page = resolve_page(
//!     &profile,
//!     &TemplateConfig::default(),
//!     &PlanEntitlement::unrestricted(),
//!     &RenderContext::new(),
//!     SchemaRegistry::builtin(),
//! );
//! for section in page.visible_sections() {
//!     println!("{} {}", section.order, section.key);
//! }
//! ```

pub mod assets;
pub mod config;
pub mod error;
pub mod manifest;
pub mod media;
pub mod normalize;
pub mod order;
pub mod pipeline;
pub mod plan;
pub mod profile;
pub mod registry;
pub mod schema;
pub mod section;
pub mod theme;
pub mod validator;
pub mod visibility;

// --- Core types ---
pub use assets::AssetBase;
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use manifest::{ManifestIcon, WebManifest};
pub use media::{EmbeddableVideo, SanitizedVideo, TrustedEmbed, VideoProvider, VideoRef};
pub use normalize::{RawSections, SectionMap};
pub use plan::{AllowedSections, PlanCatalog, PlanEntitlement};
pub use profile::{BusinessProfile, TemplateConfig};
pub use registry::{SchemaRegistry, DEFAULT_CATEGORY};
pub use schema::{CategoryTheme, SectionDefault, SectionSchema};
pub use section::SectionKind;
pub use theme::ResolvedTheme;
pub use visibility::VisibilityMap;

// --- Pipeline ---
pub use pipeline::{
    resolve_page, resolve_profile, resolve_with_schema, RenderContext, ResolvedPage,
    ResolvedSection,
};

/// Load a profile and resolve it with `config` against the built-in registry.
pub fn resolve_file(
    profile_path: impl AsRef<std::path::Path>,
    config: &EngineConfig,
) -> EngineResult<ResolvedPage> {
    let profile = BusinessProfile::load(profile_path)?;
    resolve_profile(&profile, config, SchemaRegistry::builtin())
}
