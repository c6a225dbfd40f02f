//! HTML rendering for resolved pages.
//!
//! One renderer serves every category; the [`CategoryStyle`] row decides hero
//! and list layout and heading icons. All tenant text is escaped. The only
//! raw markup written is admin-authored video embeds, markdown output that
//! passed the tag allowlist, and the tenant's own custom CSS/JS with closing
//! tags neutralized.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag};
use serde_json::Value;
use std::fmt::Write;
use vitrine_sections::{ResolvedPage, ResolvedSection, SectionKind, WebManifest};

use crate::dispatch::{RenderedPage, Renderer};
use crate::error::RenderResult;
use crate::styles::{default_style, CategoryStyle};

/// Allowed HTML tags for markdown output.
const MARKDOWN_ALLOWED_TAGS: &[&str] = &[
    "h3", "h4", "h5", "h6", "p", "ul", "ol", "li", "table", "thead", "tbody", "tr", "th", "td",
    "a", "strong", "em", "del", "code", "pre", "blockquote", "hr", "br",
];

/// Link schemes tenant content may use.
const SAFE_SCHEMES: &[&str] = &["http:", "https:", "mailto:", "tel:"];

/// Item fields tried, in order, for a card's heading.
const ITEM_TITLE_FIELDS: &[&str] = &["name", "title", "question", "author", "label"];
/// Item fields tried, in order, for a card's body.
const ITEM_BODY_FIELDS: &[&str] = &["description", "text", "answer", "quote", "role", "details"];
/// Item fields tried, in order, for a card's image.
const ITEM_IMAGE_FIELDS: &[&str] = &["image", "photo", "avatar", "thumbnail", "src", "url"];

const MAX_COLUMNS: u64 = 6;

/// The generic section renderer, parametrized by a category style.
#[derive(Debug, Clone, Copy)]
pub struct SectionRenderer {
    style: &'static CategoryStyle,
}

impl SectionRenderer {
    pub fn new(style: &'static CategoryStyle) -> Self {
        Self { style }
    }

    pub fn default_renderer() -> Self {
        Self::new(default_style())
    }

    pub fn style(&self) -> &'static CategoryStyle {
        self.style
    }

    /// Write the complete HTML document for `page`.
    pub fn render_html(&self, page: &ResolvedPage) -> RenderResult<String> {
        let mut out = String::new();
        let manifest = WebManifest::from_page(page, "/");
        let theme = &page.theme;

        write!(
            out,
            "<!DOCTYPE html>\n<html lang=\"{}\" dir=\"{}\">\n<head>\n",
            escape_html(&theme.language.code),
            escape_html(&theme.language.direction)
        )?;
        out.push_str("<meta charset=\"utf-8\">\n");
        out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        writeln!(out, "<title>{}</title>", escape_html(&page.business_name))?;
        if manifest.is_some() {
            out.push_str("<link rel=\"manifest\" href=\"/manifest.webmanifest\">\n");
            writeln!(
                out,
                "<meta name=\"theme-color\" content=\"{}\">",
                escape_html(&theme.colors.primary)
            )?;
        }

        out.push_str("<style>\n:root {\n");
        for (name, value) in theme.css_variables() {
            if name.starts_with("--font") {
                writeln!(out, "  {}: \"{}\", sans-serif;", name, escape_css_string(value))?;
            } else {
                writeln!(out, "  {}: {};", name, value)?;
            }
        }
        out.push_str("}\n</style>\n");

        let custom = visible_content(page, &SectionKind::CustomCssJs);
        if let Some(css) = custom.and_then(|c| text_field(c, "css")) {
            writeln!(
                out,
                "<style data-custom>\n{}\n</style>",
                neutralize_closing_tag(&theme.interpolate(css), "style")
            )?;
        }
        out.push_str("</head>\n");

        write!(
            out,
            "<body class=\"vitrine vitrine-{} hero-{} list-{}\">\n<main>\n",
            escape_html(&page.category),
            self.style.hero.as_str(),
            self.style.list.as_str()
        )?;
        for section in page.visible_sections() {
            self.render_section(section, &mut out)?;
        }
        out.push_str("</main>\n");

        if let Some(js) = custom.and_then(|c| text_field(c, "js")) {
            writeln!(
                out,
                "<script data-custom>\n{}\n</script>",
                neutralize_closing_tag(js, "script")
            )?;
        }
        out.push_str("</body>\n</html>\n");
        Ok(out)
    }

    fn render_section(&self, section: &ResolvedSection, out: &mut String) -> std::fmt::Result {
        let content = &section.content;
        match &section.key {
            SectionKind::Colors
            | SectionKind::Font
            | SectionKind::Language
            | SectionKind::Pwa
            | SectionKind::CustomCssJs => Ok(()),
            SectionKind::Header => self.render_header(content, out),
            SectionKind::About => {
                self.open_section(section, out)?;
                if let Some(description) = text_field(content, "description") {
                    writeln!(
                        out,
                        "<div class=\"prose\">{}</div>",
                        markdown_to_sanitized_html(description)
                    )?;
                }
                if let Some(src) = text_field(content, "image").and_then(safe_url) {
                    writeln!(out, "<img src=\"{}\" alt=\"\" loading=\"lazy\">", escape_html(src))?;
                }
                close_section(out)
            }
            SectionKind::Gallery => {
                self.open_section(section, out)?;
                write_list_open(out, "gallery", self.style.list.as_str())?;
                for image in list_items(content, "images") {
                    let (src, caption) = match image {
                        Value::String(s) => (Some(s.as_str()), None),
                        other => (first_text(other, ITEM_IMAGE_FIELDS), text_field(other, "caption")),
                    };
                    let Some(src) = src.and_then(safe_url) else {
                        continue;
                    };
                    write!(
                        out,
                        "<li><figure><img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
                        escape_html(src),
                        escape_html(caption.unwrap_or_default())
                    )?;
                    if let Some(caption) = caption {
                        write!(out, "<figcaption>{}</figcaption>", escape_html(caption))?;
                    }
                    out.push_str("</figure></li>\n");
                }
                out.push_str("</ul>\n");
                close_section(out)
            }
            SectionKind::Videos => {
                self.open_section(section, out)?;
                out.push_str("<div class=\"videos\">\n");
                for video in list_items(content, "videos") {
                    render_video(video, out)?;
                }
                out.push_str("</div>\n");
                close_section(out)
            }
            SectionKind::BusinessHours => {
                self.open_section(section, out)?;
                out.push_str("<table class=\"hours\">\n");
                for day in list_items(content, "days") {
                    let name = first_text(day, &["day", "name", "label"]).unwrap_or_default();
                    let hours = if day.get("closed").and_then(Value::as_bool).unwrap_or(false) {
                        "Closed".to_string()
                    } else if let Some(hours) = text_field(day, "hours") {
                        hours.to_string()
                    } else {
                        match (text_field(day, "open"), text_field(day, "close")) {
                            (Some(open), Some(close)) => format!("{} - {}", open, close),
                            _ => String::new(),
                        }
                    };
                    writeln!(
                        out,
                        "<tr><th>{}</th><td>{}</td></tr>",
                        escape_html(name),
                        escape_html(&hours)
                    )?;
                }
                out.push_str("</table>\n");
                close_section(out)
            }
            SectionKind::Contact => {
                self.open_section(section, out)?;
                out.push_str("<ul class=\"contact\">\n");
                if let Some(phone) = text_field(content, "phone") {
                    writeln!(
                        out,
                        "<li><a href=\"tel:{}\">{}</a></li>",
                        escape_html(&digits(phone, true)),
                        escape_html(phone)
                    )?;
                }
                if let Some(email) = text_field(content, "email") {
                    writeln!(
                        out,
                        "<li><a href=\"mailto:{0}\">{0}</a></li>",
                        escape_html(email)
                    )?;
                }
                if let Some(whatsapp) = text_field(content, "whatsapp") {
                    writeln!(
                        out,
                        "<li><a href=\"https://wa.me/{}\" rel=\"noopener\">WhatsApp</a></li>",
                        escape_html(&digits(whatsapp, false))
                    )?;
                }
                if let Some(address) = text_field(content, "address") {
                    writeln!(out, "<li><address>{}</address></li>", escape_html(address))?;
                }
                out.push_str("</ul>\n");
                close_section(out)
            }
            SectionKind::Map => {
                self.open_section(section, out)?;
                if let Some(address) = text_field(content, "address") {
                    writeln!(out, "<address>{}</address>", escape_html(address))?;
                }
                if let Some(src) = text_field(content, "embed_url").filter(|u| is_https(u)) {
                    writeln!(
                        out,
                        "<iframe class=\"map\" src=\"{}\" loading=\"lazy\" width=\"100%\" height=\"320\"></iframe>",
                        escape_html(src)
                    )?;
                }
                close_section(out)
            }
            SectionKind::SocialLinks => {
                write!(out, "<nav class=\"social-links\">")?;
                for link in list_items(content, "links") {
                    let Some(url) = text_field(link, "url").and_then(safe_url) else {
                        continue;
                    };
                    let label = first_text(link, &["label", "platform"]).unwrap_or(url);
                    write!(
                        out,
                        "<a href=\"{}\" rel=\"noopener\">{}</a>",
                        escape_html(url),
                        escape_html(label)
                    )?;
                }
                out.push_str("</nav>\n");
                Ok(())
            }
            SectionKind::Footer => {
                out.push_str("<footer>\n");
                if let Some(text) = text_field(content, "text") {
                    writeln!(out, "<p>{}</p>", escape_html(text))?;
                }
                if content
                    .get("show_powered_by")
                    .and_then(Value::as_bool)
                    .unwrap_or(true)
                {
                    out.push_str("<p class=\"powered-by\">Powered by Vitrine</p>\n");
                }
                out.push_str("</footer>\n");
                Ok(())
            }
            kind => match kind.list_field() {
                Some(field) => {
                    self.open_section(section, out)?;
                    write_list_open(out, "items", self.style.list.as_str())?;
                    for item in list_items(content, field) {
                        render_item(item, out)?;
                    }
                    out.push_str("</ul>\n");
                    close_section(out)
                }
                None => {
                    self.open_section(section, out)?;
                    if let Value::Object(fields) = content {
                        for (name, value) in fields.iter().filter(|(name, _)| *name != "title") {
                            write_text_leaves(name, value, out)?;
                        }
                    }
                    close_section(out)
                }
            },
        }
    }

    fn render_header(&self, content: &Value, out: &mut String) -> std::fmt::Result {
        let background = text_field(content, "background_image").and_then(safe_url);
        write!(out, "<header class=\"hero hero-{}\"", self.style.hero.as_str())?;
        if let Some(bg) = background {
            write!(
                out,
                " style=\"background-image:url('{}')\"",
                escape_html(&escape_css_string(bg))
            )?;
        }
        out.push_str(">\n");
        if let Some(logo) = text_field(content, "logo").and_then(safe_url) {
            writeln!(out, "<img class=\"logo\" src=\"{}\" alt=\"\">", escape_html(logo))?;
        }
        if let Some(title) = text_field(content, "title") {
            writeln!(out, "<h1>{}</h1>", escape_html(title))?;
        }
        if let Some(tagline) = text_field(content, "tagline") {
            writeln!(out, "<p class=\"tagline\">{}</p>", escape_html(tagline))?;
        }
        if let (Some(label), Some(url)) = (
            text_field(content, "cta_label"),
            text_field(content, "cta_url").and_then(safe_url),
        ) {
            writeln!(
                out,
                "<a class=\"cta\" href=\"{}\">{}</a>",
                escape_html(url),
                escape_html(label)
            )?;
        }
        out.push_str("</header>\n");
        Ok(())
    }

    fn open_section(&self, section: &ResolvedSection, out: &mut String) -> std::fmt::Result {
        let key = section.key.as_str();
        write!(
            out,
            "<section id=\"{0}\" class=\"section section-{0}\" data-order=\"{1}\"",
            escape_html(key),
            section.order
        )?;
        if let Some(columns) = section
            .settings
            .as_ref()
            .and_then(|s| s.get("columns"))
            .and_then(Value::as_u64)
            .filter(|c| (1..=MAX_COLUMNS).contains(c))
        {
            write!(out, " style=\"--columns:{}\"", columns)?;
        }
        out.push_str(">\n");
        if let Some(title) = text_field(&section.content, "title") {
            out.push_str("<h2>");
            if let Some(glyph) = self.style.icons.glyph(&section.key) {
                write!(out, "<span class=\"icon\" aria-hidden=\"true\">{}</span> ", glyph)?;
            }
            writeln!(out, "{}</h2>", escape_html(title))?;
        }
        Ok(())
    }
}

impl Default for SectionRenderer {
    fn default() -> Self {
        Self::default_renderer()
    }
}

impl Renderer for SectionRenderer {
    fn name(&self) -> &str {
        self.style.key
    }

    fn render(&self, page: &ResolvedPage) -> RenderResult<RenderedPage> {
        let html = self.render_html(page)?;
        let manifest = match WebManifest::from_page(page, "/") {
            Some(manifest) => Some(manifest.to_json()?),
            None => None,
        };
        Ok(RenderedPage {
            category: page.category.clone(),
            renderer: self.name().to_string(),
            html,
            manifest,
        })
    }
}

fn close_section(out: &mut String) -> std::fmt::Result {
    out.push_str("</section>\n");
    Ok(())
}

fn write_list_open(out: &mut String, class: &str, layout: &str) -> std::fmt::Result {
    writeln!(out, "<ul class=\"{} layout-{}\">", class, layout)
}

fn render_item(item: &Value, out: &mut String) -> std::fmt::Result {
    if let Value::String(text) = item {
        return writeln!(out, "<li>{}</li>", escape_html(text));
    }
    out.push_str("<li class=\"item\">");
    if let Some(src) = first_text(item, ITEM_IMAGE_FIELDS).and_then(safe_url) {
        write!(out, "<img src=\"{}\" alt=\"\" loading=\"lazy\">", escape_html(src))?;
    }
    if let Some(title) = first_text(item, ITEM_TITLE_FIELDS) {
        write!(out, "<h3>{}</h3>", escape_html(title))?;
    }
    if let Some(body) = first_text(item, ITEM_BODY_FIELDS) {
        write!(out, "<p>{}</p>", escape_html(body))?;
    }
    if let Some(price) = item.get("price").and_then(scalar_text) {
        write!(out, "<span class=\"price\">{}</span>", escape_html(&price))?;
    }
    out.push_str("</li>\n");
    Ok(())
}

/// Every non-blank scalar under `value`, one paragraph each, tagged with the
/// field it came from.
fn write_text_leaves(field: &str, value: &Value, out: &mut String) -> std::fmt::Result {
    match value {
        Value::Object(fields) => {
            for (name, nested) in fields {
                write_text_leaves(name, nested, out)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for item in items {
                write_text_leaves(field, item, out)?;
            }
            Ok(())
        }
        Value::Bool(_) | Value::Null => Ok(()),
        scalar => match scalar_text(scalar) {
            Some(text) => writeln!(
                out,
                "<p data-field=\"{}\">{}</p>",
                escape_html(field),
                escape_html(&text)
            ),
            None => Ok(()),
        },
    }
}

fn render_video(video: &Value, out: &mut String) -> std::fmt::Result {
    let title = text_field(video, "title").unwrap_or_default();
    out.push_str("<figure class=\"video\">");
    if video.get("trusted").and_then(Value::as_bool).unwrap_or(false) {
        // Admin-authored markup, sized by the engine.
        if let Some(markup) = text_field(video, "markup") {
            write!(out, "<div class=\"embed\">{}</div>", markup)?;
        }
    } else if let Some(src) = video
        .get("embed")
        .and_then(|e| text_field(e, "embed_url"))
        .filter(|u| is_https(u))
    {
        write!(
            out,
            "<div class=\"embed\"><iframe src=\"{}\" title=\"{}\" width=\"100%\" height=\"100%\" allowfullscreen loading=\"lazy\"></iframe></div>",
            escape_html(src),
            escape_html(title)
        )?;
    } else {
        out.push_str("<div class=\"video-placeholder\" role=\"img\" aria-label=\"Video unavailable\"></div>");
    }
    if !title.is_empty() {
        write!(out, "<figcaption>{}</figcaption>", escape_html(title))?;
    }
    out.push_str("</figure>\n");
    Ok(())
}

fn visible_content<'a>(page: &'a ResolvedPage, key: &SectionKind) -> Option<&'a Value> {
    page.section(key).filter(|s| s.visible).map(|s| &s.content)
}

fn list_items<'a>(content: &'a Value, field: &str) -> impl Iterator<Item = &'a Value> {
    content
        .get(field)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn text_field<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn first_text<'a>(value: &'a Value, fields: &[&str]) -> Option<&'a str> {
    fields.iter().find_map(|f| text_field(value, f))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn digits(raw: &str, keep_plus: bool) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || (keep_plus && *c == '+'))
        .collect()
}

fn is_https(url: &str) -> bool {
    url.to_ascii_lowercase().starts_with("https://")
}

/// The URL if it is safe to put in `href`/`src`: a known scheme, or a path
/// without any scheme.
pub fn safe_url(url: &str) -> Option<&str> {
    let lower = url.trim().to_ascii_lowercase();
    if SAFE_SCHEMES.iter().any(|s| lower.starts_with(s)) {
        return Some(url.trim());
    }
    let scheme_end = lower.find(':');
    let path_start = lower.find(['/', '?', '#']);
    match (scheme_end, path_start) {
        (None, _) => Some(url.trim()),
        (Some(colon), Some(slash)) if slash < colon => Some(url.trim()),
        _ => None,
    }
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escapes a string for use inside a quoted CSS value.
fn escape_css_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\'', "\\'")
}

/// Break any `</tag` sequence so tenant code cannot close its element.
pub fn neutralize_closing_tag(code: &str, tag: &str) -> String {
    let needle = format!("</{}", tag);
    let mut out = String::with_capacity(code.len());
    let mut rest = code;
    while let Some(pos) = find_ascii_case_insensitive(rest, &needle) {
        out.push_str(&rest[..pos]);
        out.push_str("<\\/");
        out.push_str(&rest[pos + 2..pos + needle.len()]);
        rest = &rest[pos + needle.len()..];
    }
    out.push_str(rest);
    out
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

/// Render markdown to sanitized HTML (safe tags only, no script URLs).
pub fn markdown_to_sanitized_html(md: &str) -> String {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(md, opts).filter_map(|event| match event {
        // Raw HTML in tenant markdown is shown as text.
        Event::Html(raw) => Some(Event::Text(raw)),
        Event::Start(Tag::Image(..)) | Event::End(Tag::Image(..)) => None,
        Event::Start(Tag::Link(kind, dest, title)) => {
            Some(Event::Start(Tag::Link(kind, safe_link(dest), title)))
        }
        Event::End(Tag::Link(kind, dest, title)) => {
            Some(Event::End(Tag::Link(kind, safe_link(dest), title)))
        }
        other => Some(other),
    });
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    sanitize_html_fragment(&html)
}

fn safe_link(dest: CowStr<'_>) -> CowStr<'_> {
    if safe_url(&dest).is_some() {
        dest
    } else {
        CowStr::Borrowed("#")
    }
}

/// Keep only allowed tags; escape others so they display as text.
fn sanitize_html_fragment(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let end = match tail.find('>') {
            Some(end) => end,
            None => {
                out.push_str(&escape_html(tail));
                return out;
            }
        };
        let inner = &tail[1..end];
        let name = inner
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        if MARKDOWN_ALLOWED_TAGS.contains(&name.as_str()) {
            out.push_str(&tail[..=end]);
            rest = &tail[end + 1..];
        } else {
            out.push_str("&lt;");
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_markdown_keeps_formatting() {
        let html = markdown_to_sanitized_html("We are a **small** team.\n\n- cuts\n- color");
        assert!(html.contains("<strong>small</strong>"));
        assert!(html.contains("<li>cuts</li>"));
    }

    #[test]
    fn test_markdown_strips_scripts_and_bad_links() {
        let html = markdown_to_sanitized_html(
            "<script>alert(1)</script>\n\n[click](javascript:alert(1)) ![x](https://x.test/a.png)",
        );
        assert!(!html.contains("<script"));
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("<img"));
        assert!(html.contains("href=\"#\""));
    }

    #[test]
    fn test_safe_url() {
        assert_eq!(safe_url("https://x.test/a"), Some("https://x.test/a"));
        assert_eq!(safe_url("/storage/a.png"), Some("/storage/a.png"));
        assert_eq!(safe_url("#contact"), Some("#contact"));
        assert_eq!(safe_url("tel:+15550100"), Some("tel:+15550100"));
        assert_eq!(safe_url("javascript:alert(1)"), None);
        assert_eq!(safe_url(" JavaScript:alert(1)"), None);
        assert_eq!(safe_url("data:text/html;base64,AAAA"), None);
        assert_eq!(safe_url("img/a.png?v=1:2"), Some("img/a.png?v=1:2"));
    }

    #[test]
    fn test_neutralize_closing_tag() {
        assert_eq!(
            neutralize_closing_tag("a{} </STYLE><script>x()</script>", "style"),
            "a{} <\\/STYLE><script>x()</script>"
        );
        assert_eq!(
            neutralize_closing_tag("let s = '</script>';", "script"),
            "let s = '<\\/script>';"
        );
    }
}
