//! Cascading Filter Engine.
//!
//! One pure pass over the normalized pair: each stage narrows the previous
//! stage's output, and each stage's selectable-option domain is computed
//! from the subset left by the stages upstream of it. Re-running the same
//! `FilterState` on the same pair yields identical output; there is no
//! hidden state anywhere.

use std::collections::BTreeSet;

use ahash::AHashSet;
use serde::Serialize;

use crate::normalize::NormalizedPair;
use crate::types::{RouteCode, StructureCode};

/// One upload session's worth of user selections, threaded through every
/// recomputation as a plain value.
///
/// An empty set (or `None`) means "no filtering at that stage", never
/// "select nothing". That is deliberate: a user who has picked nothing yet
/// sees everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Federative units (`uf` / `sg_uf`); narrows both tables.
    pub regions: BTreeSet<String>,
    /// Structure category (`tipo_obra`); structures only.
    pub category: Option<String>,
    /// Federal route; narrows both tables through the zero-padded code.
    pub route: Option<RouteCode>,
    /// Conflict tags (`tipo_conflito`); structures only.
    pub conflicts: BTreeSet<String>,
    /// Structure codes; segments follow through the link-code join.
    pub codes: BTreeSet<StructureCode>,
}

/// Selectable options per stage, each computed from the subset left by the
/// stages upstream of it: sorted lexicographically, deduplicated, empty
/// values dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub categories: Vec<String>,
    pub routes: Vec<String>,
    pub conflicts: Vec<String>,
    pub codes: Vec<String>,
}

/// Filtered views into a [`NormalizedPair`], plus the option domains for the
/// next round of selections. Row indices only; the normalized tables are
/// never copied or mutated.
#[derive(Debug)]
pub struct FilterOutcome<'a> {
    pub(crate) pair: &'a NormalizedPair,
    pub(crate) segment_rows: Vec<usize>,
    pub(crate) structure_rows: Vec<usize>,
    pub options: FilterOptions,
}

/// Run the full cascade. Stage order is fixed: region, category, route,
/// conflict tag, structure code.
pub fn apply<'a>(pair: &'a NormalizedPair, state: &FilterState) -> FilterOutcome<'a> {
    let mut structures: Vec<usize> = (0..pair.structures.len()).collect();
    let mut segments: Vec<usize> = (0..pair.segments.len()).collect();
    let mut options = FilterOptions::default();

    // Region: narrows both tables at once.
    options.regions = distinct(structures.iter().map(|&i| pair.structures[i].uf.as_str()));
    if !state.regions.is_empty() {
        structures.retain(|&i| state.regions.contains(&pair.structures[i].uf));
        segments.retain(|&i| state.regions.contains(&pair.segments[i].uf));
    }

    // Category: structures only; segments carry no category attribute.
    options.categories = distinct(
        structures
            .iter()
            .map(|&i| pair.structures[i].category.as_str()),
    );
    if let Some(category) = &state.category {
        structures.retain(|&i| pair.structures[i].category == *category);
    }

    // Route: the coarse join. Both tables narrow on the same padded code so
    // a route selection stays consistent across them.
    options.routes = distinct(
        structures
            .iter()
            .map(|&i| pair.structures[i].route.as_str()),
    );
    if let Some(route) = &state.route {
        structures.retain(|&i| pair.structures[i].route == *route);
        segments.retain(|&i| pair.segments[i].route == *route);
    }

    // Conflict tag: structures only. Untagged records never match a
    // non-empty selection.
    options.conflicts = distinct(
        structures
            .iter()
            .filter_map(|&i| pair.structures[i].conflict.as_deref()),
    );
    if !state.conflicts.is_empty() {
        structures.retain(|&i| {
            pair.structures[i]
                .conflict
                .as_ref()
                .is_some_and(|c| state.conflicts.contains(c))
        });
    }

    // Structure code: the fine join. The link-code union comes from the
    // structures that survived every stage above, so codes filtered out
    // upstream cannot resurrect their segments.
    options.codes = distinct(structures.iter().map(|&i| pair.structures[i].code.as_str()));
    if !state.codes.is_empty() {
        structures.retain(|&i| state.codes.contains(&pair.structures[i].code));
        let linked: AHashSet<&str> = structures
            .iter()
            .flat_map(|&i| pair.structures[i].link_codes.iter().map(String::as_str))
            .collect();
        segments.retain(|&i| {
            pair.segments[i]
                .link_code
                .as_deref()
                .is_some_and(|c| linked.contains(c))
        });
    }

    FilterOutcome {
        pair,
        segment_rows: segments,
        structure_rows: structures,
        options,
    }
}

/// Sorted, deduplicated, empties dropped.
fn distinct<'s>(values: impl Iterator<Item = &'s str>) -> Vec<String> {
    let set: BTreeSet<&str> = values.filter(|v| !v.is_empty()).collect();
    set.into_iter().map(String::from).collect()
}
