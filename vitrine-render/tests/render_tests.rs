use pretty_assertions::assert_eq;
use serde_json::json;
use vitrine_render::{render_page, TemplateDispatcher};
use vitrine_sections::{
    resolve_page, resolve_profile, AssetBase, BusinessProfile, CategoryTheme, EngineConfig,
    PlanEntitlement, RenderContext, SchemaRegistry, SectionKind, SectionSchema, TemplateConfig,
    TrustedEmbed, VisibilityMap,
};

fn resolve(profile: &BusinessProfile, ctx: &RenderContext) -> vitrine_sections::ResolvedPage {
    resolve_page(
        profile,
        &profile.template,
        &PlanEntitlement::unrestricted(),
        ctx,
        SchemaRegistry::builtin(),
    )
}

fn bakery() -> BusinessProfile {
    BusinessProfile::new("Crumb & Co", "bakery")
        .with_section(
            "header",
            json!({
                "title": "Crumb & Co",
                "tagline": "Bread <daily>",
                "logo": "/storage/crumb/logo.png",
                "cta_label": "Order",
                "cta_url": "javascript:alert(1)"
            }),
        )
        .with_section(
            "about",
            json!({"description": "Baking since **1998**.\n\n<img src=x onerror=alert(1)>"}),
        )
        .with_section(
            "menu",
            json!({"items": [{"name": "Sourdough", "price": 6.5, "image": "menu/sourdough.jpg"}]}),
        )
        .with_section("contact", json!({"phone": "+1 (555) 0100", "whatsapp": "+1 555 0100"}))
        .with_section("colors", json!({"primary": "#8b4513"}))
        .with_section(
            "custom_css_js",
            json!({
                "css": ".cta { color: $theme.colors.primary; } </style><script>alert(1)</script>",
                "js": "console.log('</script>')"
            }),
        )
}

fn cdn() -> RenderContext {
    RenderContext::new().with_asset_base(AssetBase::parse("https://cdn.example.com").unwrap())
}

#[test]
fn test_unknown_category_renders_with_default_renderer() {
    let profile = BusinessProfile::new("Foo Industries", "foo")
        .with_section("header", json!({"title": "Foo Industries"}));
    let page = resolve(&profile, &RenderContext::new());

    let rendered = TemplateDispatcher::builtin().dispatch("foo", &page).unwrap();
    assert_eq!(rendered.renderer, "default");
    assert_eq!(rendered.category, "foo");
    assert!(rendered.html.contains("<h1>Foo Industries</h1>"));
}

#[test]
fn test_known_category_uses_its_style() {
    let page = resolve(&bakery(), &cdn());
    let rendered = render_page(&page).unwrap();
    assert_eq!(rendered.renderer, "bakery");
    assert!(rendered.html.contains("hero-split list-grid"));
}

#[test]
fn test_document_shell_and_theme() {
    let html = render_page(&resolve(&bakery(), &cdn())).unwrap().html;
    assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"en\" dir=\"ltr\">"));
    assert!(html.contains("<title>Crumb &amp; Co</title>"));
    assert!(html.contains("--color-primary: #8b4513;"));
    assert!(html.contains("--font-body: \"Quicksand\", sans-serif;"));
}

#[test]
fn test_tenant_text_is_escaped() {
    let html = render_page(&resolve(&bakery(), &cdn())).unwrap().html;
    assert!(html.contains("<p class=\"tagline\">Bread &lt;daily&gt;</p>"));
    assert!(!html.contains("<daily>"));
    assert!(!html.contains("href=\"javascript:"));
    assert!(!html.contains("class=\"cta\""));
}

#[test]
fn test_about_markdown_is_sanitized() {
    let html = render_page(&resolve(&bakery(), &cdn())).unwrap().html;
    assert!(html.contains("<strong>1998</strong>"));
    assert!(!html.contains("<img src=x"));
}

#[test]
fn test_assets_and_items() {
    let html = render_page(&resolve(&bakery(), &cdn())).unwrap().html;
    assert!(html.contains("src=\"https://cdn.example.com/storage/crumb/logo.png\""));
    assert!(html.contains("src=\"https://cdn.example.com/menu/sourdough.jpg\""));
    assert!(html.contains("<h3>Sourdough</h3>"));
    assert!(html.contains("<span class=\"price\">6.5</span>"));
    assert!(html.contains("href=\"tel:+15550100\""));
    assert!(html.contains("href=\"https://wa.me/15550100\""));
}

#[test]
fn test_custom_code_cannot_escape_its_element() {
    let html = render_page(&resolve(&bakery(), &cdn())).unwrap().html;
    assert!(html.contains(".cta { color: #8b4513; } <\\/style><script>alert(1)</script>"));
    assert!(html.contains("console.log('<\\/script>')"));
    assert_eq!(html.matches("</style>").count(), 2);
    assert_eq!(html.matches("</script>").count(), 2);
}

#[test]
fn test_hidden_custom_code_is_not_emitted() {
    let mut profile = bakery();
    let mut visibility = VisibilityMap::new();
    visibility.insert(SectionKind::CustomCssJs, false);
    profile.template = TemplateConfig {
        section_visibility: visibility,
        ..TemplateConfig::default()
    };
    let html = render_page(&resolve(&profile, &cdn())).unwrap().html;
    assert!(!html.contains("data-custom"));
}

#[test]
fn test_videos_render_embed_placeholder_and_trusted_markup() {
    let profile = BusinessProfile::new("Lens Lab", "photographer").with_section(
        "videos",
        json!({"videos": [
            {"url": "https://vimeo.com/76979871", "title": "Reel"},
            {"url": "https://example.com/not-a-video", "title": "Old link"}
        ]}),
    );
    let ctx = RenderContext::new().with_trusted_embed(TrustedEmbed {
        title: "Behind the scenes".to_string(),
        markup: "<iframe src=\"https://www.youtube.com/embed/dQw4w9WgXcQ\" width=\"560\" height=\"315\"></iframe>"
            .to_string(),
    });
    let html = render_page(&resolve(&profile, &ctx)).unwrap().html;

    assert!(html.contains("src=\"https://player.vimeo.com/video/76979871\""));
    assert!(html.contains("<div class=\"video-placeholder\""));
    assert!(html.contains("<figcaption>Old link</figcaption>"));
    assert!(html.contains(
        "<iframe width=\"100%\" height=\"100%\" src=\"https://www.youtube.com/embed/dQw4w9WgXcQ\"></iframe>"
    ));
}

#[test]
fn test_pwa_manifest_is_linked() {
    let profile = bakery().with_section("pwa", json!({"enabled": true, "icon": "/storage/icon.png"}));
    let rendered = render_page(&resolve(&profile, &cdn())).unwrap();
    assert!(rendered.html.contains("<link rel=\"manifest\""));
    let manifest: serde_json::Value =
        serde_json::from_str(rendered.manifest.as_deref().unwrap()).unwrap();
    assert_eq!(manifest["icons"][0]["src"], "https://cdn.example.com/storage/icon.png");
    assert_eq!(manifest["theme_color"], "#8b4513");
}

#[test]
fn test_sections_render_in_resolved_order() {
    let mut profile = bakery();
    profile.template.section_order = Some(vec![SectionKind::Contact, SectionKind::Menu]);
    let html = render_page(&resolve(&profile, &cdn())).unwrap().html;
    let contact = html.find("id=\"contact\"").unwrap();
    let menu = html.find("id=\"menu\"").unwrap();
    let header = html.find("<header").unwrap();
    assert!(contact < menu && menu < header);
}

#[test]
fn test_custom_section_renders_its_text() {
    let mut registry = SchemaRegistry::new();
    let schema = SectionSchema::from_order(
        "kiosk",
        "Kiosk",
        &[SectionKind::Header],
        CategoryTheme::default(),
    )
    .with_section(
        SectionKind::Custom("promo".to_string()),
        json!({"title": "", "headline": "", "details": {"ends": ""}}),
    );
    registry.register(schema).unwrap();

    let profile = BusinessProfile::new("Corner Kiosk", "kiosk").with_section(
        "promo",
        json!({"title": "Offers", "headline": "Spring <sale>", "details": {"ends": "May 1"}}),
    );
    let page = resolve_page(
        &profile,
        &profile.template,
        &PlanEntitlement::unrestricted(),
        &RenderContext::new(),
        &registry,
    );
    let html = render_page(&page).unwrap().html;

    assert!(html.contains("<h2>Offers</h2>"));
    assert!(html.contains("<p data-field=\"headline\">Spring &lt;sale&gt;</p>"));
    assert!(html.contains("<p data-field=\"ends\">May 1</p>"));
    assert_eq!(html.matches("Offers").count(), 1);
}

#[test]
fn test_configured_default_category_also_picks_the_renderer() {
    let config = EngineConfig {
        default_category: "bakery".to_string(),
        ..EngineConfig::default()
    };
    let profile = BusinessProfile::new("Mystery Goods", "foo")
        .with_section("header", json!({"title": "Mystery Goods"}));
    let page = resolve_profile(&profile, &config, SchemaRegistry::builtin()).unwrap();
    assert_eq!(page.schema_category, "bakery");

    let rendered = TemplateDispatcher::builtin().render(&page).unwrap();
    assert_eq!(rendered.renderer, "bakery");
    assert_eq!(rendered.category, "foo");
    assert!(rendered.html.contains("hero-split list-grid"));
}
