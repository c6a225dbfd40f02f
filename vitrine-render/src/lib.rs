//! # Vitrine rendering
//!
//! Template dispatch for resolved pages. Each category maps to the same
//! generic [`SectionRenderer`] configured by a row of the style table; an
//! unknown category falls back to the default renderer.
//!
//! ## Example
//! ```ignore
//! use vitrine_render::TemplateDispatcher;
//! use vitrine_sections::{resolve_file, EngineConfig};
//!
//! let page = resolve_file("profile.yaml", &EngineConfig::default())?;
//! let rendered = TemplateDispatcher::builtin().render(&page)?;
//! println!("{}", rendered.html);
//! ```

pub mod dispatch;
pub mod error;
pub mod html;
pub mod styles;

pub use dispatch::{RenderedPage, Renderer, TemplateDispatcher};
pub use error::{RenderError, RenderResult};
pub use html::{escape_html, markdown_to_sanitized_html, SectionRenderer};
pub use styles::{style_for, CategoryStyle, HeroLayout, IconSet, ListLayout};

/// Render a resolved page with the built-in dispatcher.
pub fn render_page(page: &vitrine_sections::ResolvedPage) -> RenderResult<RenderedPage> {
    TemplateDispatcher::builtin().render(page)
}
