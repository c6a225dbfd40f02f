//! Template dispatch: pick the renderer for a page's category.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};
use vitrine_sections::registry::normalize_category_key;
use vitrine_sections::ResolvedPage;

use crate::error::RenderResult;
use crate::html::SectionRenderer;
use crate::styles::STYLES;

/// Output of a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPage {
    /// Category the page asked for.
    pub category: String,
    /// Name of the renderer that produced the output.
    pub renderer: String,
    pub html: String,
    /// Web app manifest JSON when the page has PWA enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
}

/// Something that turns a resolved page into output.
///
/// Every renderer receives the same contract: sections ordered, filtered,
/// normalized and URL-rewritten.
pub trait Renderer: Send + Sync {
    fn name(&self) -> &str;

    fn render(&self, page: &ResolvedPage) -> RenderResult<RenderedPage>;
}

/// Renderers keyed by category, with a default for everything else.
pub struct TemplateDispatcher {
    renderers: HashMap<String, Box<dyn Renderer>>,
    default: Box<dyn Renderer>,
}

impl TemplateDispatcher {
    pub fn new(default: Box<dyn Renderer>) -> Self {
        Self {
            renderers: HashMap::new(),
            default,
        }
    }

    /// A dispatcher with the generic renderer registered for every styled
    /// category.
    pub fn builtin() -> Self {
        let mut dispatcher = Self::new(Box::new(SectionRenderer::default_renderer()));
        for style in STYLES {
            dispatcher.register(style.key, Box::new(SectionRenderer::new(style)));
        }
        dispatcher
    }

    /// Register (or replace) the renderer for `category`.
    pub fn register(&mut self, category: &str, renderer: Box<dyn Renderer>) {
        self.renderers
            .insert(normalize_category_key(category), renderer);
    }

    pub fn has_renderer(&self, category: &str) -> bool {
        self.renderers
            .contains_key(&normalize_category_key(category))
    }

    /// The renderer for `category`, falling back to the default.
    pub fn renderer_for(&self, category: &str) -> &dyn Renderer {
        match self.renderers.get(&normalize_category_key(category)) {
            Some(renderer) => renderer.as_ref(),
            None => {
                warn!(category, fallback = self.default.name(), "no renderer for category, using default");
                self.default.as_ref()
            }
        }
    }

    /// Render `page` with the renderer registered for `category`.
    pub fn dispatch(&self, category: &str, page: &ResolvedPage) -> RenderResult<RenderedPage> {
        let renderer = self.renderer_for(category);
        debug!(category, renderer = renderer.name(), "dispatching page");
        renderer.render(page)
    }

    /// Render `page` with the renderer for its own category, or for the
    /// category whose schema it was resolved against.
    pub fn render(&self, page: &ResolvedPage) -> RenderResult<RenderedPage> {
        let category = if self.has_renderer(&page.category) {
            page.category.as_str()
        } else {
            debug!(
                category = %page.category,
                schema = %page.schema_category,
                "no renderer for requested category, trying schema category"
            );
            page.schema_category.as_str()
        };
        self.dispatch(category, page)
    }

    /// Registered category keys, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for TemplateDispatcher {
    fn default() -> Self {
        Self::builtin()
    }
}
