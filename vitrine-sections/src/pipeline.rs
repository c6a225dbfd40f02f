//! The resolution pipeline.
//!
//! A pure function of the tenant's profile, the category schema, the plan
//! entitlement and the request context. Nothing here fails: unknown keys are
//! dropped, malformed content falls back to defaults, empty sections hide.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

use crate::assets::{self, AssetBase};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::media::{sanitize_video_items, TrustedEmbed};
use crate::normalize::{normalize, SectionMap};
use crate::order;
use crate::plan::{gate, PlanEntitlement};
use crate::profile::{BusinessProfile, TemplateConfig};
use crate::registry::{normalize_category_key, SchemaRegistry};
use crate::schema::SectionSchema;
use crate::section::SectionKind;
use crate::theme::ResolvedTheme;
use crate::visibility;

/// Request-scoped settings threaded into the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderContext {
    /// Base that relative asset paths are joined to. `None` leaves them as is.
    pub asset_base: Option<AssetBase>,
    /// Admin-authored video embeds. The only source of raw markup.
    pub trusted_embeds: Vec<TrustedEmbed>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        Ok(Self {
            asset_base: config.asset_base()?,
            trusted_embeds: Vec::new(),
        })
    }

    pub fn with_asset_base(mut self, base: AssetBase) -> Self {
        self.asset_base = Some(base);
        self
    }

    pub fn with_trusted_embed(mut self, embed: TrustedEmbed) -> Self {
        self.trusted_embeds.push(embed);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSection {
    pub key: SectionKind,
    pub content: Value,
    /// Essential sections are always present; this carries their own verdict.
    pub visible: bool,
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
}

/// Everything a renderer needs for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPage {
    /// Category requested by the profile (normalized, possibly unknown).
    pub category: String,
    /// Category whose schema was applied.
    pub schema_category: String,
    pub business_name: String,
    pub sections: Vec<ResolvedSection>,
    pub theme: ResolvedTheme,
}

impl ResolvedPage {
    pub fn section(&self, key: &SectionKind) -> Option<&ResolvedSection> {
        self.sections.iter().find(|s| &s.key == key)
    }

    pub fn content(&self, key: &SectionKind) -> Option<&Value> {
        self.section(key).map(|s| &s.content)
    }

    pub fn keys(&self) -> Vec<&SectionKind> {
        self.sections.iter().map(|s| &s.key).collect()
    }

    /// Sections to draw, in order.
    pub fn visible_sections(&self) -> impl Iterator<Item = &ResolvedSection> {
        self.sections.iter().filter(|s| s.visible)
    }
}

/// Resolve a profile against the registry schema for its category, falling
/// back to the registry's default category.
pub fn resolve_page(
    profile: &BusinessProfile,
    template: &TemplateConfig,
    entitlement: &PlanEntitlement,
    ctx: &RenderContext,
    registry: &SchemaRegistry,
) -> ResolvedPage {
    let schema = registry.schema_or_default(&profile.category);
    resolve_with_schema(profile, template, entitlement, ctx, schema)
}

/// Resolve a profile with its own template, the plan from `config` and a
/// context built from `config`.
///
/// Unknown categories fall back to `config.default_category` before the
/// registry's own default.
pub fn resolve_profile(
    profile: &BusinessProfile,
    config: &EngineConfig,
    registry: &SchemaRegistry,
) -> EngineResult<ResolvedPage> {
    let ctx = RenderContext::from_config(config)?;
    let entitlement = config.entitlement_for(profile.plan.as_deref());
    let schema = registry
        .get(&profile.category)
        .or_else(|| registry.get(&config.default_category))
        .unwrap_or_else(|| registry.default_schema());
    Ok(resolve_with_schema(
        profile,
        &profile.template,
        &entitlement,
        &ctx,
        schema,
    ))
}

/// Run every stage against an explicit schema.
pub fn resolve_with_schema(
    profile: &BusinessProfile,
    template: &TemplateConfig,
    entitlement: &PlanEntitlement,
    ctx: &RenderContext,
    schema: &SectionSchema,
) -> ResolvedPage {
    let allowed = entitlement
        .allowed_sections
        .intersect(&template.allowed_sections);

    let mut sections = gate(normalize(&profile.sections, schema), &allowed);
    // Visibility has to judge the videos list as it will be rendered.
    attach_videos(&mut sections, &ctx.trusted_embeds);

    let available: BTreeSet<SectionKind> = sections.keys().cloned().collect();
    let ordered = order::resolve(
        template.section_order.as_deref(),
        &schema.default_order(),
        &available,
    );
    let kept = visibility::filter(&ordered, &template.section_visibility, &sections);

    let theme = ResolvedTheme::resolve_sections(&sections, &schema.theme);

    let resolved = kept
        .into_iter()
        .enumerate()
        .filter_map(|(position, key)| {
            let content = sections.remove(&key)?;
            let visible = visibility::is_visible(&key, &template.section_visibility, Some(&content));
            let content = match &ctx.asset_base {
                Some(base) => assets::rewrite(&content, base),
                None => content,
            };
            Some(ResolvedSection {
                settings: template.settings_for(&key).cloned(),
                key,
                content,
                visible,
                order: position,
            })
        })
        .collect::<Vec<_>>();

    debug!(
        category = %profile.category,
        schema = %schema.category,
        sections = resolved.len(),
        "resolved page"
    );

    ResolvedPage {
        category: normalize_category_key(&profile.category),
        schema_category: schema.category.clone(),
        business_name: profile.name.clone(),
        sections: resolved,
        theme,
    }
}

fn attach_videos(sections: &mut SectionMap, trusted: &[TrustedEmbed]) {
    let kind = SectionKind::Videos;
    let Some(field) = kind.list_field() else {
        return;
    };
    if let Some(content) = sections.get_mut(&kind) {
        sanitize_video_items(content, field, trusted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::AllowedSections;
    use crate::visibility::VisibilityMap;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn salon() -> BusinessProfile {
        BusinessProfile::new("Studio Nova", "salon")
            .with_section("header", json!({"title": "Studio Nova", "logo": "/storage/logo.png"}))
            .with_section("services", json!({"items": [{"name": "Cut", "price": "30"}]}))
            .with_section("contact", json!({"email": ""}))
            .with_section("bogus", json!({"anything": 1}))
    }

    fn resolve(profile: &BusinessProfile, template: &TemplateConfig, ctx: &RenderContext) -> ResolvedPage {
        resolve_page(
            profile,
            template,
            &PlanEntitlement::unrestricted(),
            ctx,
            SchemaRegistry::builtin(),
        )
    }

    #[test]
    fn test_essentials_always_present() {
        let page = resolve_page(
            &salon(),
            &TemplateConfig::default(),
            &PlanEntitlement::essentials_only(),
            &RenderContext::new(),
            SchemaRegistry::builtin(),
        );
        let keys: Vec<SectionKind> = page.sections.iter().map(|s| s.key.clone()).collect();
        assert_eq!(keys, SectionKind::ESSENTIAL.to_vec());
    }

    #[test]
    fn test_empty_and_unknown_sections_are_dropped() {
        let page = resolve(&salon(), &TemplateConfig::default(), &RenderContext::new());
        assert!(page.section(&SectionKind::Header).is_some());
        assert!(page.section(&SectionKind::Services).is_some());
        assert!(page.section(&SectionKind::Contact).is_none());
        assert!(page.section(&SectionKind::Custom("bogus".into())).is_none());
    }

    #[test]
    fn test_orders_are_contiguous() {
        let page = resolve(&salon(), &TemplateConfig::default(), &RenderContext::new());
        let orders: Vec<usize> = page.sections.iter().map(|s| s.order).collect();
        assert_eq!(orders, (0..page.sections.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_tenant_order_and_visibility() {
        let mut visibility = VisibilityMap::new();
        visibility.insert(SectionKind::Header, false);
        visibility.insert(SectionKind::Colors, false);
        let template = TemplateConfig {
            section_order: Some(vec![SectionKind::Services, SectionKind::Header]),
            section_visibility: visibility,
            ..TemplateConfig::default()
        };
        let page = resolve(&salon(), &template, &RenderContext::new());
        assert_eq!(page.sections[0].key, SectionKind::Services);
        assert!(page.section(&SectionKind::Header).is_none());
        let colors = page.section(&SectionKind::Colors).unwrap();
        assert!(!colors.visible);
    }

    #[test]
    fn test_template_allowance_narrows_plan() {
        let template = TemplateConfig {
            allowed_sections: AllowedSections::only([SectionKind::Header]),
            ..TemplateConfig::default()
        };
        let page = resolve(&salon(), &template, &RenderContext::new());
        assert!(page.section(&SectionKind::Services).is_none());
        assert!(page.section(&SectionKind::Header).is_some());
    }

    #[test]
    fn test_assets_rewritten_with_base() {
        let ctx = RenderContext::new()
            .with_asset_base(AssetBase::parse("https://cdn.example.com").unwrap());
        let page = resolve(&salon(), &TemplateConfig::default(), &ctx);
        assert_eq!(
            page.content(&SectionKind::Header).unwrap()["logo"],
            json!("https://cdn.example.com/storage/logo.png")
        );

        let page = resolve(&salon(), &TemplateConfig::default(), &RenderContext::new());
        assert_eq!(
            page.content(&SectionKind::Header).unwrap()["logo"],
            json!("/storage/logo.png")
        );
    }

    #[test]
    fn test_unknown_category_uses_default_schema() {
        let profile = BusinessProfile::new("Foo Ltd", "Foo");
        let page = resolve(&profile, &TemplateConfig::default(), &RenderContext::new());
        assert_eq!(page.category, "foo");
        assert_eq!(page.schema_category, "default");
    }

    #[test]
    fn test_resolve_profile_uses_config() {
        let config = EngineConfig::from_yaml_str(
            "asset_base_url: https://cdn.example.com\nplans:\n  free: [header]\ndefault_plan: free\n",
        )
        .unwrap();
        let page = resolve_profile(&salon(), &config, SchemaRegistry::builtin()).unwrap();
        assert!(page.section(&SectionKind::Services).is_none());
        assert_eq!(
            page.content(&SectionKind::Header).unwrap()["logo"],
            json!("https://cdn.example.com/storage/logo.png")
        );
    }
}
