//! Tenant-owned documents: the business profile and its template overrides.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::config::read_file;
use crate::error::EngineResult;
use crate::normalize::RawSections;
use crate::plan::AllowedSections;
use crate::registry::DEFAULT_CATEGORY;
use crate::section::SectionKind;
use crate::visibility::VisibilityMap;

/// A tenant's business profile as stored by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    /// Billing plan identifier.
    #[serde(default)]
    pub plan: Option<String>,
    /// Raw section content keyed by section key, exactly as the tenant saved it.
    #[serde(default)]
    pub sections: RawSections,
    #[serde(default, alias = "templateConfig")]
    pub template: TemplateConfig,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl BusinessProfile {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            category: category.into(),
            plan: None,
            sections: RawSections::new(),
            template: TemplateConfig::default(),
        }
    }

    pub fn with_section(mut self, key: impl Into<String>, content: Value) -> Self {
        self.sections.insert(key.into(), content);
        self
    }

    pub fn from_yaml_str(yaml: &str) -> EngineResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a `.json` file, or YAML for any other extension.
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let contents = read_file(path)?;
        if is_json(path) {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }
}

/// Optional tenant overrides applied on top of the category schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    #[serde(alias = "sectionOrder")]
    pub section_order: Option<Vec<SectionKind>>,
    #[serde(alias = "sectionVisibility", deserialize_with = "lenient_visibility")]
    pub section_visibility: VisibilityMap,
    #[serde(alias = "allowedSections")]
    pub allowed_sections: AllowedSections,
    /// Per-section presentation settings, passed through to renderers.
    #[serde(alias = "sectionSettings")]
    pub section_settings: Map<String, Value>,
}

impl TemplateConfig {
    pub fn from_yaml_str(yaml: &str) -> EngineResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let contents = read_file(path)?;
        if is_json(path) {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    /// Settings saved for `key`, if any.
    pub fn settings_for(&self, key: &SectionKind) -> Option<&Value> {
        self.section_settings
            .iter()
            .find(|(k, _)| SectionKind::parse(k) == *key)
            .map(|(_, v)| v)
            .filter(|v| !v.is_null())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Accepts booleans, `0`/`1` and the usual truthy strings. Anything else is
/// skipped, so the section stays visible.
fn lenient_visibility<'de, D>(deserializer: D) -> Result<VisibilityMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<SectionKind, Value>> = Option::deserialize(deserializer)?;
    let mut out = VisibilityMap::new();
    for (key, value) in raw.unwrap_or_default() {
        match visibility_flag(&value) {
            Some(flag) => {
                out.insert(key, flag);
            }
            None => debug!(key = %key, value = %value, "ignoring unreadable visibility flag"),
        }
    }
    Ok(out)
}

fn visibility_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
