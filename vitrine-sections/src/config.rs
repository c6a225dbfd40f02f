//! Engine configuration.
//!
//! Loaded from a YAML file by the host application (or the preview binary).
//! Every field is optional; a missing file section keeps its default.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::assets::AssetBase;
use crate::error::{EngineError, EngineResult};
use crate::plan::{AllowedSections, PlanCatalog, PlanEntitlement};
use crate::registry::DEFAULT_CATEGORY;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Absolute base URL that relative asset paths are joined to.
    pub asset_base_url: Option<String>,

    /// Category used when a profile's category is unknown.
    pub default_category: String,

    /// Plan used when a profile's plan is missing or unknown.
    pub default_plan: Option<String>,

    /// Section allowance per plan identifier.
    pub plans: HashMap<String, AllowedSections>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            asset_base_url: None,
            default_category: DEFAULT_CATEGORY.to_string(),
            default_plan: None,
            plans: HashMap::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> EngineResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let contents = read_file(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    /// Load `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "no engine config found, using defaults");
            Ok(Self::default())
        }
    }

    /// Parsed asset base, if one is configured.
    pub fn asset_base(&self) -> EngineResult<Option<AssetBase>> {
        self.asset_base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(AssetBase::parse)
            .transpose()
    }

    pub fn plan_catalog(&self) -> PlanCatalog {
        let mut catalog = PlanCatalog::new();
        for (id, allowed) in &self.plans {
            catalog = catalog.with_plan(
                id.clone(),
                PlanEntitlement {
                    allowed_sections: allowed.clone(),
                },
            );
        }
        match &self.default_plan {
            Some(id) => catalog.with_default_plan(id.clone()),
            None => catalog,
        }
    }

    /// Entitlement for a profile's plan.
    ///
    /// Without any configured plans every profile is unrestricted; once plans
    /// exist, unknown ids go through the catalog's fallback.
    pub fn entitlement_for(&self, plan: Option<&str>) -> PlanEntitlement {
        if self.plans.is_empty() {
            return PlanEntitlement::unrestricted();
        }
        let catalog = self.plan_catalog();
        match plan.or(self.default_plan.as_deref()) {
            Some(id) => catalog.entitlement_for(id),
            None => catalog.entitlement_for(""),
        }
    }
}

pub(crate) fn read_file(path: &Path) -> EngineResult<String> {
    fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.display().to_string(),
        source,
    })
}
