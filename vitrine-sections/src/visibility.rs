use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::normalize::SectionMap;
use crate::section::SectionKind;

/// Tenant visibility overrides. Absent keys are visible.
pub type VisibilityMap = BTreeMap<SectionKind, bool>;

/// Whether a section should render: not switched off by the tenant and not
/// empty by its own predicate.
pub fn is_visible(key: &SectionKind, visibility: &VisibilityMap, content: Option<&Value>) -> bool {
    if visibility.get(key) == Some(&false) {
        return false;
    }
    match content {
        Some(content) => !key.is_empty_content(content),
        None => key.is_essential(),
    }
}

/// Drop hidden and empty sections from `ordered`, keeping its order.
///
/// Essential sections are never dropped; their own verdict is still
/// available through [`is_visible`].
pub fn filter(
    ordered: &[SectionKind],
    visibility: &VisibilityMap,
    content: &SectionMap,
) -> Vec<SectionKind> {
    ordered
        .iter()
        .filter(|key| {
            if key.is_essential() {
                return true;
            }
            let keep = is_visible(key, visibility, content.get(*key));
            if !keep {
                debug!(key = %key, "section hidden");
            }
            keep
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn content() -> SectionMap {
        let mut map = SectionMap::new();
        map.insert(SectionKind::Header, json!({"title": "Studio Nova", "logo": ""}));
        map.insert(SectionKind::Contact, json!({"phone": "", "email": "", "address": ""}));
        map.insert(SectionKind::Gallery, json!({"images": ["/storage/a.png"]}));
        map.insert(SectionKind::Colors, json!({"primary": "#000000"}));
        map
    }

    #[test]
    fn test_absent_visibility_means_visible() {
        let order = vec![SectionKind::Header, SectionKind::Gallery];
        assert_eq!(filter(&order, &VisibilityMap::new(), &content()), order);
    }

    #[test]
    fn test_explicit_false_hides() {
        let order = vec![SectionKind::Header, SectionKind::Gallery];
        let mut visibility = VisibilityMap::new();
        visibility.insert(SectionKind::Gallery, false);
        visibility.insert(SectionKind::Header, true);
        assert_eq!(
            filter(&order, &visibility, &content()),
            vec![SectionKind::Header]
        );
    }

    #[test]
    fn test_empty_content_hides_even_when_marked_visible() {
        let order = vec![SectionKind::Header, SectionKind::Contact];
        let mut visibility = VisibilityMap::new();
        visibility.insert(SectionKind::Contact, true);
        assert_eq!(
            filter(&order, &visibility, &content()),
            vec![SectionKind::Header]
        );
    }

    #[test]
    fn test_essentials_are_never_dropped() {
        let order = vec![SectionKind::Colors, SectionKind::Pwa];
        let mut visibility = VisibilityMap::new();
        visibility.insert(SectionKind::Colors, false);
        assert_eq!(filter(&order, &visibility, &content()), order);
        assert!(!is_visible(&SectionKind::Colors, &visibility, None));
    }

    #[test]
    fn test_missing_content_is_dropped() {
        let order = vec![SectionKind::Faq];
        assert!(filter(&order, &VisibilityMap::new(), &content()).is_empty());
    }
}
