//! Final section ordering.
//!
//! Three sources feed the order and evolve independently: the tenant's saved
//! order, the category's canonical order, and the keys still available after
//! gating and filtering. The result always contains every available key
//! exactly once.

use std::collections::{BTreeSet, HashSet};

use crate::section::SectionKind;

/// Compute the final order.
///
/// 1. start from `tenant_order`, or `default_order` when the tenant has none
/// 2. drop keys that are not available
/// 3. append available keys the chosen order is missing, in `default_order`'s
///    relative position (so sections added to a schema after the tenant saved
///    their order still show up)
/// 4. append anything left (keys in neither order) in key order
///
/// Duplicates keep their first occurrence.
pub fn resolve(
    tenant_order: Option<&[SectionKind]>,
    default_order: &[SectionKind],
    available: &BTreeSet<SectionKind>,
) -> Vec<SectionKind> {
    let chosen = tenant_order.unwrap_or(default_order);

    let mut seen: HashSet<&SectionKind> = HashSet::with_capacity(available.len());
    let mut out = Vec::with_capacity(available.len());

    let candidates = chosen
        .iter()
        .chain(default_order.iter())
        .chain(available.iter());

    for key in candidates {
        if available.contains(key) && seen.insert(key) {
            out.push(key.clone());
        }
    }
    out
}
