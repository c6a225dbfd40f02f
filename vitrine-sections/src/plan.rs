//! Plan entitlements and the section gate.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::normalize::SectionMap;
use crate::section::SectionKind;

/// Which sections a plan or template permits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AllowedRepr", into = "AllowedRepr")]
pub enum AllowedSections {
    #[default]
    Unrestricted,
    Only(Vec<SectionKind>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AllowedRepr {
    Keyword(String),
    Keys(Vec<SectionKind>),
}

impl TryFrom<AllowedRepr> for AllowedSections {
    type Error = String;

    fn try_from(repr: AllowedRepr) -> Result<Self, Self::Error> {
        match repr {
            AllowedRepr::Keys(keys) => Ok(AllowedSections::Only(keys)),
            AllowedRepr::Keyword(word) => match word.trim() {
                "*" | "unrestricted" | "all" => Ok(AllowedSections::Unrestricted),
                other => Err(format!(
                    "expected 'unrestricted' or a list of section keys, got '{}'",
                    other
                )),
            },
        }
    }
}

impl From<AllowedSections> for AllowedRepr {
    fn from(allowed: AllowedSections) -> Self {
        match allowed {
            AllowedSections::Unrestricted => AllowedRepr::Keyword("unrestricted".to_string()),
            AllowedSections::Only(keys) => AllowedRepr::Keys(keys),
        }
    }
}

impl AllowedSections {
    pub fn only<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<SectionKind>,
    {
        AllowedSections::Only(keys.into_iter().map(Into::into).collect())
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, AllowedSections::Unrestricted)
    }

    /// Whether `key` passes this allowance (essentials always do).
    pub fn permits(&self, key: &SectionKind) -> bool {
        match self {
            AllowedSections::Unrestricted => true,
            AllowedSections::Only(keys) => key.is_essential() || keys.contains(key),
        }
    }

    /// Sections permitted by both allowances. Keeps `self`'s order.
    pub fn intersect(&self, other: &AllowedSections) -> AllowedSections {
        match (self, other) {
            (AllowedSections::Unrestricted, x) | (x, AllowedSections::Unrestricted) => x.clone(),
            (AllowedSections::Only(a), AllowedSections::Only(b)) => {
                AllowedSections::Only(a.iter().filter(|k| b.contains(k)).cloned().collect())
            }
        }
    }
}

/// A plan's section entitlement, as reported by billing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntitlement {
    #[serde(default, alias = "allowedSections")]
    pub allowed_sections: AllowedSections,
}

impl PlanEntitlement {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Only the essential sections.
    pub fn essentials_only() -> Self {
        Self {
            allowed_sections: AllowedSections::Only(Vec::new()),
        }
    }

    pub fn only<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<SectionKind>,
    {
        Self {
            allowed_sections: AllowedSections::only(keys),
        }
    }
}

/// Keep only the sections `allowed` permits, plus the essential set.
pub fn gate(sections: SectionMap, allowed: &AllowedSections) -> SectionMap {
    if allowed.is_unrestricted() {
        return sections;
    }
    sections
        .into_iter()
        .filter(|(key, _)| allowed.permits(key))
        .collect()
}

/// Plan identifiers mapped to entitlements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanCatalog {
    pub plans: HashMap<String, PlanEntitlement>,
    /// Plan used for unknown plan identifiers.
    pub default_plan: Option<String>,
}

impl PlanCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(mut self, id: impl Into<String>, entitlement: PlanEntitlement) -> Self {
        self.plans.insert(id.into(), entitlement);
        self
    }

    pub fn with_default_plan(mut self, id: impl Into<String>) -> Self {
        self.default_plan = Some(id.into());
        self
    }

    /// The entitlement for `plan_id`.
    ///
    /// Unknown ids fall back to the default plan, then to essentials only.
    pub fn entitlement_for(&self, plan_id: &str) -> PlanEntitlement {
        if let Some(entitlement) = self.plans.get(plan_id.trim()) {
            return entitlement.clone();
        }
        let fallback = self
            .default_plan
            .as_deref()
            .and_then(|id| self.plans.get(id));
        warn!(
            plan = plan_id,
            default_plan = self.default_plan.as_deref().unwrap_or("-"),
            "unknown plan, falling back"
        );
        fallback
            .cloned()
            .unwrap_or_else(PlanEntitlement::essentials_only)
    }
}
