//! Relative asset path rewriting.
//!
//! Tenant content stores uploads as storage-relative paths
//! (`/storage/images/x.png`). Before rendering those are turned into absolute
//! URLs under the request's asset base. Strings that already carry a scheme
//! are never touched, which makes [`rewrite`] idempotent.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::OnceLock;
use url::Url;

use crate::error::{EngineError, EngineResult};

/// Field-name fragments that mark a value as an asset reference.
const ASSET_FIELD_HINTS: &[&str] = &[
    "image", "logo", "icon", "photo", "avatar", "thumbnail", "banner", "cover", "background",
    "favicon", "picture", "poster", "src",
];

/// Absolute `http`/`https` base URL that relative asset paths are joined to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetBase(String);

impl AssetBase {
    pub fn parse(raw: &str) -> EngineResult<Self> {
        let invalid = |reason: &str| EngineError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: reason.to_string(),
        };
        let url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("must not carry a query or fragment"));
        }
        Ok(AssetBase(url.as_str().trim_end_matches('/').to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join a relative path onto the base with exactly one slash between.
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

impl fmt::Display for AssetBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AssetBase {
    type Error = EngineError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        AssetBase::parse(&raw)
    }
}

impl From<AssetBase> for String {
    fn from(base: AssetBase) -> Self {
        base.0
    }
}

fn scheme_regex() -> &'static Regex {
    static SCHEME_REGEX: OnceLock<Regex> = OnceLock::new();
    SCHEME_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*:").unwrap())
}

fn storage_regex() -> &'static Regex {
    static STORAGE_REGEX: OnceLock<Regex> = OnceLock::new();
    STORAGE_REGEX.get_or_init(|| Regex::new(r"^/?(storage|uploads|media)/\S+$").unwrap())
}

fn media_file_regex() -> &'static Regex {
    static MEDIA_FILE_REGEX: OnceLock<Regex> = OnceLock::new();
    MEDIA_FILE_REGEX.get_or_init(|| {
        Regex::new(r"(?i)^[^\s:?#]+\.(png|jpe?g|gif|webp|svg|ico|avif|bmp|mp4|webm|mov|pdf)$")
            .unwrap()
    })
}

/// True when the value already names a location on its own: a scheme
/// (`https:`, `data:`, `mailto:`), protocol-relative, or an in-page anchor.
pub fn has_scheme(value: &str) -> bool {
    value.starts_with("//") || value.starts_with('#') || scheme_regex().is_match(value)
}

fn is_asset_field(field: &str) -> bool {
    let field = field.to_ascii_lowercase();
    ASSET_FIELD_HINTS.iter().any(|hint| field.contains(hint))
}

/// Whether `value` should be joined onto the asset base.
///
/// Storage-pattern paths always match, whatever the field. A bare file path
/// with a media extension (`logo.png`, `img/team/ana.jpg`) only matches in a
/// field whose name hints at an asset.
pub fn is_relative_asset(value: &str, field: Option<&str>) -> bool {
    let value = value.trim();
    if value.is_empty() || has_scheme(value) {
        return false;
    }
    if storage_regex().is_match(value) {
        return true;
    }
    field.is_some_and(is_asset_field) && media_file_regex().is_match(value)
}

/// Rewrite a single string value.
pub fn rewrite_str(value: &str, field: Option<&str>, base: &AssetBase) -> Option<String> {
    if is_relative_asset(value, field) {
        Some(base.join(value.trim()))
    } else {
        None
    }
}

/// Recursively rewrite relative asset paths in section content.
pub fn rewrite(content: &Value, base: &AssetBase) -> Value {
    rewrite_value(content, None, base)
}

fn rewrite_value(value: &Value, field: Option<&str>, base: &AssetBase) -> Value {
    match value {
        Value::String(s) => match rewrite_str(s, field, base) {
            Some(rewritten) => Value::String(rewritten),
            None => value.clone(),
        },
        // Sequence elements inherit the field name they live under.
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| rewrite_value(item, field, base))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, v) in map {
                out.insert(key.clone(), rewrite_value(v, Some(key), base));
            }
            Value::Object(out)
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
    }
}
