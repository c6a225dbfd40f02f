//! Embedded video references.
//!
//! There are two ways in:
//! - admin-authored markup ([`VideoRef::TrustedMarkup`]), passed through with
//!   only its sizing attributes rewritten to fill the container
//! - tenant-entered URLs ([`VideoRef::Url`]), parsed for a known provider and
//!   asset id and never treated as markup
//!
//! Tenant content can only ever produce the URL variant.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

use crate::section::is_blank;

/// Item fields that tenant content may not set on a video item.
const RESERVED_ITEM_FIELDS: &[&str] = &[
    "embed", "markup", "trusted", "placeholder", "embed_code", "embed_html",
];

/// Item fields checked, in order, for the tenant's video URL.
const URL_FIELDS: &[&str] = &["url", "video_url", "link"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoProvider {
    YouTube,
    Vimeo,
    Dailymotion,
}

impl VideoProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoProvider::YouTube => "youtube",
            VideoProvider::Vimeo => "vimeo",
            VideoProvider::Dailymotion => "dailymotion",
        }
    }
}

/// A video reference before sanitizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoRef {
    /// Free text entered by a tenant.
    Url(String),
    /// Embed markup authored by a platform administrator.
    TrustedMarkup(String),
}

/// A recognized provider video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddableVideo {
    pub provider: VideoProvider,
    pub video_id: String,
    pub embed_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SanitizedVideo {
    Embed(EmbeddableVideo),
    Markup { html: String },
}

/// Markup supplied by an administrator for a tenant's page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrustedEmbed {
    #[serde(default)]
    pub title: String,
    pub markup: String,
}

/// Sanitize a video reference. `None` means nothing embeddable; callers
/// render a placeholder instead of dropping the card.
pub fn sanitize(video: &VideoRef) -> Option<SanitizedVideo> {
    match video {
        VideoRef::TrustedMarkup(html) => {
            if html.trim().is_empty() {
                return None;
            }
            Some(SanitizedVideo::Markup {
                html: normalize_embed_sizing(html),
            })
        }
        VideoRef::Url(raw) => parse_video_url(raw).map(SanitizedVideo::Embed),
    }
}

fn embed_tag_regex() -> &'static Regex {
    static EMBED_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    EMBED_TAG_REGEX.get_or_init(|| Regex::new(r"(?i)<(iframe|video|embed)\b([^>]*)>").unwrap())
}

fn sizing_attr_regex() -> &'static Regex {
    static SIZING_ATTR_REGEX: OnceLock<Regex> = OnceLock::new();
    SIZING_ATTR_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)\s+(width|height)\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).unwrap()
    })
}

/// Replace `width`/`height` on embed tags with container-filling values.
/// Everything else in the markup is left as is.
pub fn normalize_embed_sizing(html: &str) -> String {
    embed_tag_regex()
        .replace_all(html, |caps: &regex::Captures| {
            let tag = &caps[1];
            let attrs = sizing_attr_regex().replace_all(&caps[2], "");
            format!(r#"<{} width="100%" height="100%"{}>"#, tag, attrs)
        })
        .into_owned()
}

fn youtube_id_regex() -> &'static Regex {
    static YOUTUBE_ID_REGEX: OnceLock<Regex> = OnceLock::new();
    YOUTUBE_ID_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap())
}

fn vimeo_id_regex() -> &'static Regex {
    static VIMEO_ID_REGEX: OnceLock<Regex> = OnceLock::new();
    VIMEO_ID_REGEX.get_or_init(|| Regex::new(r"^[0-9]{6,12}$").unwrap())
}

fn dailymotion_id_regex() -> &'static Regex {
    static DAILYMOTION_ID_REGEX: OnceLock<Regex> = OnceLock::new();
    DAILYMOTION_ID_REGEX.get_or_init(|| Regex::new(r"^x[0-9a-zA-Z]{4,}$").unwrap())
}

/// Parse a tenant URL into a provider video. Bare `youtube.com/...` without
/// a scheme is accepted; anything but http(s) is not.
pub fn parse_video_url(raw: &str) -> Option<EmbeddableVideo> {
    let raw = raw.trim();
    if raw.is_empty() || raw.contains(char::is_whitespace) {
        return None;
    }
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{}", raw)).ok()?,
        Err(_) => return None,
    };
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(host.as_str());
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let video = match host {
        "youtube.com" | "youtube-nocookie.com" => youtube_id(&url, &segments).map(youtube),
        "youtu.be" => segments.first().map(|s| s.to_string()).map(youtube),
        "vimeo.com" => segments
            .iter()
            .find(|seg| seg.chars().all(|c| c.is_ascii_digit()))
            .map(|s| vimeo(s.to_string())),
        "player.vimeo.com" => match segments.as_slice() {
            ["video", id, ..] => Some(vimeo(id.to_string())),
            _ => None,
        },
        "dailymotion.com" => match segments.as_slice() {
            ["video", id, ..] | ["embed", "video", id, ..] => Some(dailymotion(id)),
            _ => None,
        },
        "dai.ly" => segments.first().map(|id| dailymotion(id)),
        _ => None,
    };

    let video = video.filter(|v| {
        let re = match v.provider {
            VideoProvider::YouTube => youtube_id_regex(),
            VideoProvider::Vimeo => vimeo_id_regex(),
            VideoProvider::Dailymotion => dailymotion_id_regex(),
        };
        re.is_match(&v.video_id)
    });
    if video.is_none() {
        debug!(url = raw, "unrecognized video url");
    }
    video
}

fn youtube_id(url: &Url, segments: &[&str]) -> Option<String> {
    match segments {
        ["watch", ..] => url
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned()),
        ["embed" | "shorts" | "live" | "v", id, ..] => Some(id.to_string()),
        _ => None,
    }
}

fn youtube(id: String) -> EmbeddableVideo {
    EmbeddableVideo {
        provider: VideoProvider::YouTube,
        embed_url: format!("https://www.youtube.com/embed/{}", id),
        thumbnail_url: Some(format!("https://img.youtube.com/vi/{}/hqdefault.jpg", id)),
        video_id: id,
    }
}

fn vimeo(id: String) -> EmbeddableVideo {
    EmbeddableVideo {
        provider: VideoProvider::Vimeo,
        embed_url: format!("https://player.vimeo.com/video/{}", id),
        thumbnail_url: None,
        video_id: id,
    }
}

fn dailymotion(segment: &str) -> EmbeddableVideo {
    // Slugs look like `x7tgad0_some-title`.
    let id = segment.split('_').next().unwrap_or(segment).to_string();
    EmbeddableVideo {
        provider: VideoProvider::Dailymotion,
        embed_url: format!("https://www.dailymotion.com/embed/video/{}", id),
        thumbnail_url: Some(format!("https://www.dailymotion.com/thumbnail/video/{}", id)),
        video_id: id,
    }
}

/// Sanitize every item of a videos section in place.
///
/// Tenant items keep their other fields; each gains either an `embed`
/// object or `placeholder: true`. Blank items and items that are neither a
/// URL string nor an object are dropped. Trusted embeds are appended after
/// the tenant's items.
pub fn sanitize_video_items(content: &mut Value, list_field: &str, trusted: &[TrustedEmbed]) {
    let Some(map) = content.as_object_mut() else {
        return;
    };
    let items = match map.remove(list_field) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };

    let mut out: Vec<Value> = items.into_iter().filter_map(sanitize_tenant_item).collect();

    for embed in trusted {
        if let Some(SanitizedVideo::Markup { html }) =
            sanitize(&VideoRef::TrustedMarkup(embed.markup.clone()))
        {
            out.push(json!({
                "title": embed.title,
                "markup": html,
                "trusted": true,
            }));
        }
    }

    map.insert(list_field.to_string(), Value::Array(out));
}

fn sanitize_tenant_item(item: Value) -> Option<Value> {
    if is_blank(&item) {
        return None;
    }
    let mut fields = match item {
        Value::String(url) => {
            let mut m = Map::new();
            m.insert("url".to_string(), Value::String(url));
            m
        }
        Value::Object(m) => m,
        _ => return None,
    };
    for reserved in RESERVED_ITEM_FIELDS {
        fields.remove(*reserved);
    }
    let url = URL_FIELDS
        .iter()
        .find_map(|f| fields.get(*f).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();

    match sanitize(&VideoRef::Url(url)) {
        Some(SanitizedVideo::Embed(video)) => {
            if let Ok(embed) = serde_json::to_value(&video) {
                fields.insert("embed".to_string(), embed);
            }
        }
        _ => {
            fields.insert("placeholder".to_string(), Value::Bool(true));
        }
    }
    Some(Value::Object(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id_of(url: &str) -> Option<(VideoProvider, String)> {
        parse_video_url(url).map(|v| (v.provider, v.video_id))
    }

    #[test]
    fn test_youtube_variants() {
        let expected = Some((VideoProvider::YouTube, "dQw4w9WgXcQ".to_string()));
        assert_eq!(id_of("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42"), expected);
        assert_eq!(id_of("https://youtu.be/dQw4w9WgXcQ"), expected);
        assert_eq!(id_of("youtube.com/shorts/dQw4w9WgXcQ"), expected);
        assert_eq!(id_of("https://m.youtube.com/embed/dQw4w9WgXcQ"), expected);
        assert_eq!(id_of("https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ"), expected);
    }

    #[test]
    fn test_vimeo_and_dailymotion() {
        assert_eq!(
            id_of("https://vimeo.com/76979871"),
            Some((VideoProvider::Vimeo, "76979871".to_string()))
        );
        assert_eq!(
            id_of("https://player.vimeo.com/video/76979871?h=abc"),
            Some((VideoProvider::Vimeo, "76979871".to_string()))
        );
        assert_eq!(
            id_of("https://www.dailymotion.com/video/x7tgad0_my-title"),
            Some((VideoProvider::Dailymotion, "x7tgad0".to_string()))
        );
        assert_eq!(
            id_of("https://dai.ly/x7tgad0"),
            Some((VideoProvider::Dailymotion, "x7tgad0".to_string()))
        );
    }

    #[test]
    fn test_unrecognized_urls() {
        assert_eq!(id_of(""), None);
        assert_eq!(id_of("https://example.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(id_of("https://youtube.com/watch?v=short"), None);
        assert_eq!(id_of("javascript:alert(1)"), None);
        assert_eq!(id_of("<iframe src=\"https://youtu.be/dQw4w9WgXcQ\"></iframe>"), None);
    }

    #[test]
    fn test_trusted_markup_sizing_is_normalized() {
        let html = r#"<iframe src="https://player.example/1" width="560" height='315' allowfullscreen></iframe>"#;
        let Some(SanitizedVideo::Markup { html: out }) =
            sanitize(&VideoRef::TrustedMarkup(html.to_string()))
        else {
            panic!("expected markup");
        };
        assert_eq!(
            out,
            r#"<iframe width="100%" height="100%" src="https://player.example/1" allowfullscreen></iframe>"#
        );
        assert_eq!(normalize_embed_sizing(&out), out);
    }

    #[test]
    fn test_video_items_get_embed_or_placeholder() {
        let mut content = json!({
            "title": "Videos",
            "videos": [
                {"title": "Tour", "url": "https://youtu.be/dQw4w9WgXcQ"},
                {"title": "Broken", "url": "not a video", "markup": "<script>x</script>"},
                "https://vimeo.com/76979871",
                42
            ]
        });
        sanitize_video_items(&mut content, "videos", &[]);
        let videos = content["videos"].as_array().unwrap();
        assert_eq!(videos.len(), 3);
        assert_eq!(videos[0]["embed"]["provider"], "youtube");
        assert_eq!(videos[1]["placeholder"], true);
        assert!(videos[1].get("markup").is_none());
        assert_eq!(videos[2]["embed"]["video_id"], "76979871");
    }

    #[test]
    fn test_trusted_embeds_are_appended() {
        let mut content = json!({"videos": []});
        let trusted = vec![TrustedEmbed {
            title: "Promo".to_string(),
            markup: r#"<iframe src="https://player.example/2" width="640"></iframe>"#.to_string(),
        }];
        sanitize_video_items(&mut content, "videos", &trusted);
        assert_eq!(content["videos"][0]["trusted"], true);
        assert_eq!(
            content["videos"][0]["markup"],
            r#"<iframe width="100%" height="100%" src="https://player.example/2"></iframe>"#
        );
    }
}
