//! Fills gaps in a tenant's raw section data from the category defaults.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::schema::SectionSchema;
use crate::section::SectionKind;

/// Section content keyed by section kind.
pub type SectionMap = BTreeMap<SectionKind, Value>;

/// Raw tenant section data as stored: free-form keys, free-form content.
pub type RawSections = BTreeMap<String, Value>;

/// Merge `raw` over the schema defaults.
///
/// The output holds exactly the schema's keys. Raw keys the schema does not
/// declare are dropped.
pub fn normalize(raw: &RawSections, schema: &SectionSchema) -> SectionMap {
    let by_kind = index_raw(raw);

    for key in raw.keys() {
        if !schema.contains(&SectionKind::parse(key)) {
            debug!(category = %schema.category, key = %key, "dropping section unknown to schema");
        }
    }

    schema
        .entries
        .iter()
        .map(|entry| {
            let content = match by_kind.get(&entry.key) {
                Some(value) => merge_value(&entry.default_content, value),
                None => entry.default_content.clone(),
            };
            (entry.key.clone(), content)
        })
        .collect()
}

/// Map raw keys to section kinds. An exact key wins over a lenient spelling
/// of the same kind (`business_hours` over `Business-Hours`).
fn index_raw(raw: &RawSections) -> HashMap<SectionKind, &Value> {
    let mut exact: HashMap<SectionKind, &Value> = HashMap::new();
    let mut lenient: HashMap<SectionKind, &Value> = HashMap::new();
    for (key, value) in raw {
        let kind = SectionKind::parse(key);
        if kind.as_str() == key {
            exact.insert(kind, value);
        } else {
            lenient.entry(kind).or_insert(value);
        }
    }
    for (kind, value) in lenient {
        exact.entry(kind).or_insert(value);
    }
    exact
}

/// Deep-merge `raw` over `default`, leaf by leaf.
///
/// - objects merge key by key; raw-only keys are kept
/// - a raw sequence replaces the default sequence wholesale
/// - null or a type that doesn't match the default yields the default
pub fn merge_value(default: &Value, raw: &Value) -> Value {
    match (default, raw) {
        (_, Value::Null) => default.clone(),
        (Value::Null, _) => raw.clone(),
        (Value::Object(d), Value::Object(r)) => Value::Object(merge_objects(d, r)),
        (Value::Array(_), Value::Array(_))
        | (Value::String(_), Value::String(_))
        | (Value::Bool(_), Value::Bool(_))
        | (Value::Number(_), Value::Number(_)) => raw.clone(),
        _ => {
            debug!(
                expected = type_name(default),
                found = type_name(raw),
                "type mismatch in section content, using default"
            );
            default.clone()
        }
    }
}

fn merge_objects(default: &Map<String, Value>, raw: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, d) in default {
        let merged = match raw.get(key) {
            Some(r) => merge_value(d, r),
            None => d.clone(),
        };
        out.insert(key.clone(), merged);
    }
    for (key, r) in raw {
        if !default.contains_key(key) {
            out.insert(key.clone(), r.clone());
        }
    }
    out
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CategoryTheme, SectionSchema};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema() -> SectionSchema {
        SectionSchema::from_order(
            "test",
            "Test",
            &[SectionKind::Header, SectionKind::Services, SectionKind::Contact],
            CategoryTheme::default(),
        )
    }

    fn raw(value: Value) -> RawSections {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_merge_prefers_raw_leaves() {
        let merged = merge_value(
            &json!({"title": "About", "nested": {"a": 1, "b": 2}}),
            &json!({"nested": {"b": 3}}),
        );
        assert_eq!(merged, json!({"title": "About", "nested": {"a": 1, "b": 3}}));
    }

    #[test]
    fn test_merge_replaces_sequences_wholesale() {
        let merged = merge_value(&json!({"items": [1, 2, 3]}), &json!({"items": [9]}));
        assert_eq!(merged, json!({"items": [9]}));

        let merged = merge_value(&json!({"items": [1, 2, 3]}), &json!({}));
        assert_eq!(merged, json!({"items": [1, 2, 3]}));
    }

    #[test]
    fn test_merge_type_mismatch_falls_back() {
        let merged = merge_value(&json!({"items": [], "title": "x"}), &json!({"items": "oops", "title": 7}));
        assert_eq!(merged, json!({"items": [], "title": "x"}));
        assert_eq!(merge_value(&json!({"a": 1}), &json!("scalar")), json!({"a": 1}));
    }

    #[test]
    fn test_merge_keeps_raw_only_fields() {
        let merged = merge_value(&json!({"title": ""}), &json!({"subtitle": "Since 1990"}));
        assert_eq!(merged, json!({"title": "", "subtitle": "Since 1990"}));
    }

    #[test]
    fn test_normalize_contains_every_schema_key() {
        let schema = schema();
        let sections = normalize(&RawSections::new(), &schema);
        let keys: Vec<_> = sections.keys().cloned().collect();
        let mut expected = schema.default_order();
        expected.sort();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_normalize_drops_unknown_keys() {
        let sections = normalize(&raw(json!({"hero": {"title": "x"}, "menu": {}})), &schema());
        assert!(!sections.contains_key(&SectionKind::Custom("hero".to_string())));
        assert!(!sections.contains_key(&SectionKind::Menu));
    }

    #[test]
    fn test_normalize_contact_fills_fields() {
        let sections = normalize(&raw(json!({"contact": {"email": ""}})), &schema());
        let contact = &sections[&SectionKind::Contact];
        assert_eq!(contact["phone"], "");
        assert_eq!(contact["email"], "");
        assert_eq!(contact["address"], "");
    }

    #[test]
    fn test_exact_key_wins_over_lenient_spelling() {
        let sections = normalize(
            &raw(json!({
                "Contact": {"phone": "111"},
                "contact": {"phone": "222"},
            })),
            &schema(),
        );
        assert_eq!(sections[&SectionKind::Contact]["phone"], "222");
    }
}
